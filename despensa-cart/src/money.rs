//! Price derivation for cart lines
//!
//! All arithmetic runs on `Decimal` internally and is converted back to `f64`
//! for the wire models, rounded to 2 decimal places (half-up). Unit prices
//! are always quoted per base unit — per Kg, per L, or per package — so
//! buying in a sub-unit (g/ml) divides the quoted price by 1000.

use rust_decimal::prelude::*;
use shared::models::{CartLine, MeasureUnit};

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation; NaN/Infinity collapse to 0
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Parse a raw text-field value; malformed or non-finite input becomes 0
pub fn parse_money_input(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0))
        .unwrap_or(0.0)
}

/// Clamp a numeric edit to a finite, non-negative value
#[inline]
fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// A single cell edit on a cart line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEdit {
    PurchasedQuantity(f64),
    PurchasedUnit(MeasureUnit),
    UnitPrice(f64),
    TotalPrice(f64),
}

impl LineEdit {
    /// Write the raw edited value onto the line (numeric values sanitized);
    /// the dependent fields are recomputed afterwards by
    /// [`derive_line_prices`]
    pub fn apply_to(&self, line: &mut CartLine) {
        match *self {
            LineEdit::PurchasedQuantity(q) => line.purchased_quantity = sanitize(q),
            LineEdit::PurchasedUnit(u) => line.purchased_unit = u,
            LineEdit::UnitPrice(v) => line.unit_price = sanitize(v),
            LineEdit::TotalPrice(v) => line.total_price = sanitize(v),
        }
    }
}

/// Result of a price derivation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedPrices {
    pub unit_price: f64,
    pub total_price: f64,
}

/// Recompute the dependent price fields of a line after an edit
///
/// The relation between `unit_price` and `total_price` depends only on the
/// purchased unit and the product's stock unit:
///
/// - purchased per Kg/L: `total = unit_price * qty`
/// - purchased per g/ml: `total = unit_price / 1000 * qty`
/// - purchased per package of a Kg/L product: `total = per_package * qty * unit_price`
/// - purchased per package of a g/ml product: `total = per_package * qty / 1000 * unit_price`
/// - purchased per package of a package-stocked product: the total is the
///   shopper's direct input and `unit_price = total / qty` is back-derived
///   (qty 0 leaves the unit price untouched — no NaN/Infinity may ever reach
///   the line)
///
/// Both results are rounded to 2 decimal places. Pure and deterministic.
pub fn derive_line_prices(line: &CartLine) -> DerivedPrices {
    let q = to_decimal(line.purchased_quantity);
    let up = to_decimal(line.unit_price);
    let tp = to_decimal(line.total_price);
    // Amount of stock unit per purchasable package, 1 when unspecified
    let spq = to_decimal(line.system_product.quantity_per_unit.unwrap_or(1.0));

    match (line.purchased_unit, line.system_product.unit) {
        (MeasureUnit::Kilogram | MeasureUnit::Liter, _) => DerivedPrices {
            unit_price: to_f64(up),
            total_price: to_f64(up * q),
        },
        (MeasureUnit::Gram | MeasureUnit::Milliliter, _) => DerivedPrices {
            unit_price: to_f64(up),
            total_price: to_f64(up / Decimal::ONE_THOUSAND * q),
        },
        (MeasureUnit::Each, MeasureUnit::Kilogram | MeasureUnit::Liter) => DerivedPrices {
            unit_price: to_f64(up),
            total_price: to_f64(spq * q * up),
        },
        (MeasureUnit::Each, MeasureUnit::Gram | MeasureUnit::Milliliter) => DerivedPrices {
            unit_price: to_f64(up),
            total_price: to_f64(spq * q / Decimal::ONE_THOUSAND * up),
        },
        (MeasureUnit::Each, MeasureUnit::Each) => {
            // Total is the shopper's direct input here; the per-package price
            // is back-derived from it
            if q.is_zero() {
                DerivedPrices {
                    unit_price: line.unit_price,
                    total_price: to_f64(tp),
                }
            } else {
                DerivedPrices {
                    unit_price: to_f64(tp / q),
                    total_price: to_f64(tp),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::SystemProduct;

    fn line(
        purchased_unit: MeasureUnit,
        stock_unit: MeasureUnit,
        quantity_per_unit: Option<f64>,
        q: f64,
        up: f64,
        tp: f64,
    ) -> CartLine {
        CartLine {
            id: 1,
            system_product: SystemProduct {
                id: 10,
                name: "Produto".to_string(),
                unit: stock_unit,
                quantity_per_unit,
            },
            planned_quantity: None,
            planned_unit: None,
            purchased_quantity: q,
            purchased_unit,
            unit_price: up,
            total_price: tp,
        }
    }

    #[test]
    fn test_base_unit_total_is_unit_price_times_quantity() {
        let l = line(MeasureUnit::Kilogram, MeasureUnit::Kilogram, None, 2.5, 4.0, 0.0);
        let d = derive_line_prices(&l);
        assert_eq!(d.total_price, 10.0);
        assert_eq!(d.unit_price, 4.0);

        let l = line(MeasureUnit::Liter, MeasureUnit::Liter, None, 3.0, 1.99, 0.0);
        assert_eq!(derive_line_prices(&l).total_price, 5.97);
    }

    #[test]
    fn test_sub_unit_divides_quoted_price_by_thousand() {
        // 300 g at 12.00 per Kg
        let l = line(MeasureUnit::Gram, MeasureUnit::Kilogram, None, 300.0, 12.0, 0.0);
        assert_eq!(derive_line_prices(&l).total_price, 3.6);

        // 750 ml at 2.40 per L
        let l = line(MeasureUnit::Milliliter, MeasureUnit::Liter, None, 750.0, 2.4, 0.0);
        assert_eq!(derive_line_prices(&l).total_price, 1.8);
    }

    #[test]
    fn test_package_of_base_unit_product() {
        // 3 packages of 2 Kg at 10.00 per Kg -> 60.00
        let l = line(MeasureUnit::Each, MeasureUnit::Kilogram, Some(2.0), 3.0, 10.0, 0.0);
        assert_eq!(derive_line_prices(&l).total_price, 60.0);
    }

    #[test]
    fn test_package_of_sub_unit_product() {
        // 2 packages of 500 g at 4.00 per Kg -> 4.00
        let l = line(MeasureUnit::Each, MeasureUnit::Gram, Some(500.0), 2.0, 4.0, 0.0);
        assert_eq!(derive_line_prices(&l).total_price, 4.0);
    }

    #[test]
    fn test_package_of_package_back_derives_unit_price() {
        let l = line(MeasureUnit::Each, MeasureUnit::Each, None, 3.0, 0.0, 15.0);
        let d = derive_line_prices(&l);
        assert_eq!(d.unit_price, 5.0);
        assert_eq!(d.total_price, 15.0);
    }

    #[test]
    fn test_zero_quantity_leaves_unit_price_untouched() {
        let l = line(MeasureUnit::Each, MeasureUnit::Each, None, 0.0, 2.5, 15.0);
        let d = derive_line_prices(&l);
        assert_eq!(d.unit_price, 2.5);
        assert_eq!(d.total_price, 15.0);
        assert!(d.unit_price.is_finite());
    }

    #[test]
    fn test_quantity_per_unit_defaults_to_one() {
        let l = line(MeasureUnit::Each, MeasureUnit::Kilogram, None, 2.0, 3.0, 0.0);
        assert_eq!(derive_line_prices(&l).total_price, 6.0);
    }

    #[test]
    fn test_results_rounded_half_up() {
        // 3.333 * 3 = 9.999 -> 10.00
        let l = line(MeasureUnit::Kilogram, MeasureUnit::Kilogram, None, 3.0, 3.333, 0.0);
        assert_eq!(derive_line_prices(&l).total_price, 10.0);

        // Back-derivation rounds too: 10 / 3 -> 3.33
        let l = line(MeasureUnit::Each, MeasureUnit::Each, None, 3.0, 0.0, 10.0);
        assert_eq!(derive_line_prices(&l).unit_price, 3.33);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let mut l = line(MeasureUnit::Gram, MeasureUnit::Kilogram, None, 250.0, 7.96, 0.0);
        let first = derive_line_prices(&l);
        l.unit_price = first.unit_price;
        l.total_price = first.total_price;
        let second = derive_line_prices(&l);
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_finite_inputs_collapse_to_zero() {
        let l = line(MeasureUnit::Kilogram, MeasureUnit::Kilogram, None, f64::NAN, f64::INFINITY, 0.0);
        let d = derive_line_prices(&l);
        assert_eq!(d.total_price, 0.0);
        assert_eq!(d.unit_price, 0.0);
    }

    #[test]
    fn test_parse_money_input() {
        assert_eq!(parse_money_input("4.50"), 4.5);
        assert_eq!(parse_money_input("  12 "), 12.0);
        assert_eq!(parse_money_input("abc"), 0.0);
        assert_eq!(parse_money_input(""), 0.0);
        assert_eq!(parse_money_input("-3"), 0.0);
        assert_eq!(parse_money_input("inf"), 0.0);
        assert_eq!(parse_money_input("NaN"), 0.0);
    }

    #[test]
    fn test_line_edit_sanitizes_values() {
        let mut l = line(MeasureUnit::Kilogram, MeasureUnit::Kilogram, None, 1.0, 2.0, 2.0);
        LineEdit::PurchasedQuantity(-4.0).apply_to(&mut l);
        assert_eq!(l.purchased_quantity, 0.0);
        LineEdit::UnitPrice(f64::NAN).apply_to(&mut l);
        assert_eq!(l.unit_price, 0.0);
        LineEdit::TotalPrice(9.99).apply_to(&mut l);
        assert_eq!(l.total_price, 9.99);
        LineEdit::PurchasedUnit(MeasureUnit::Gram).apply_to(&mut l);
        assert_eq!(l.purchased_unit, MeasureUnit::Gram);
    }
}
