//! Purchase-unit selection
//!
//! A shopping-list line plans consumption in one unit; the shopper may buy in
//! any unit of the same family. Mass (g/Kg) and volume (ml/L) are symmetric
//! within their family and both admit `Unidade` (a packaged unit can be
//! weighed or measured); a planned `Unidade` admits everything.

use shared::models::{CartLine, MeasureUnit};

/// Full purchase-unit set, in display order
pub const ALL_UNITS: [MeasureUnit; 5] = [
    MeasureUnit::Each,
    MeasureUnit::Gram,
    MeasureUnit::Kilogram,
    MeasureUnit::Milliliter,
    MeasureUnit::Liter,
];

const MASS_UNITS: [MeasureUnit; 3] = [
    MeasureUnit::Gram,
    MeasureUnit::Kilogram,
    MeasureUnit::Each,
];

const VOLUME_UNITS: [MeasureUnit; 3] = [
    MeasureUnit::Milliliter,
    MeasureUnit::Liter,
    MeasureUnit::Each,
];

/// Purchase units a shopper may select for a planned unit
///
/// No planned unit (ad-hoc line) yields the full set.
pub fn purchase_units_for(planned: Option<MeasureUnit>) -> &'static [MeasureUnit] {
    match planned {
        None | Some(MeasureUnit::Each) => &ALL_UNITS,
        Some(u) if u.is_mass() => &MASS_UNITS,
        Some(_) => &VOLUME_UNITS,
    }
}

/// Purchase units for a concrete cart line
pub fn line_purchase_units(line: &CartLine) -> &'static [MeasureUnit] {
    purchase_units_for(line.planned_unit)
}

/// Whether `unit` is a legal purchase unit for `planned`
pub fn is_allowed_purchase_unit(planned: Option<MeasureUnit>, unit: MeasureUnit) -> bool {
    purchase_units_for(planned).contains(&unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_plan_yields_full_set() {
        assert_eq!(purchase_units_for(None), &ALL_UNITS);
    }

    #[test]
    fn test_each_yields_full_set() {
        assert_eq!(purchase_units_for(Some(MeasureUnit::Each)), &ALL_UNITS);
    }

    #[test]
    fn test_mass_family() {
        for planned in [MeasureUnit::Gram, MeasureUnit::Kilogram] {
            let units = purchase_units_for(Some(planned));
            assert_eq!(
                units,
                &[MeasureUnit::Gram, MeasureUnit::Kilogram, MeasureUnit::Each]
            );
        }
    }

    #[test]
    fn test_volume_family() {
        for planned in [MeasureUnit::Milliliter, MeasureUnit::Liter] {
            let units = purchase_units_for(Some(planned));
            assert_eq!(
                units,
                &[
                    MeasureUnit::Milliliter,
                    MeasureUnit::Liter,
                    MeasureUnit::Each
                ]
            );
        }
    }

    #[test]
    fn test_cross_family_not_allowed() {
        assert!(!is_allowed_purchase_unit(
            Some(MeasureUnit::Gram),
            MeasureUnit::Liter
        ));
        assert!(!is_allowed_purchase_unit(
            Some(MeasureUnit::Liter),
            MeasureUnit::Kilogram
        ));
        assert!(is_allowed_purchase_unit(
            Some(MeasureUnit::Gram),
            MeasureUnit::Each
        ));
        assert!(is_allowed_purchase_unit(None, MeasureUnit::Liter));
    }
}
