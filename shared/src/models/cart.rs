//! Shopping cart models
//!
//! A `Cart` is created server-side from a pantry's shopping list and mutated
//! through line-level operations until the purchase is finalized. The four
//! shopper-editable fields of a line travel back to the server either as a
//! single-line update or as a batched `CartBatchUpdate`.

use super::{MeasureUnit, SystemProduct};
use serde::{Deserialize, Serialize};

/// One product entry in a shopping cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Stable line identity across edits
    pub id: i64,
    pub system_product: SystemProduct,
    /// Demand signal from the shopping list (None for ad-hoc lines)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_unit: Option<MeasureUnit>,
    /// Actual quantity being bought, >= 0
    pub purchased_quantity: f64,
    /// Unit the shopper is buying in; must belong to the allowed set for
    /// `planned_unit` / the product's stock unit
    pub purchased_unit: MeasureUnit,
    /// Price per Kg/L/package as appropriate to `purchased_unit`
    pub unit_price: f64,
    /// Total cost for this line
    pub total_price: f64,
}

/// Shopping cart for a pantry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: i64,
    pub pantry_id: i64,
    /// Creation time (unix millis)
    pub created_at: i64,
    pub products: Vec<CartLine>,
}

impl Cart {
    /// Find a line by id
    pub fn line(&self, line_id: i64) -> Option<&CartLine> {
        self.products.iter().find(|l| l.id == line_id)
    }

    /// Find a line by id, mutable
    pub fn line_mut(&mut self, line_id: i64) -> Option<&mut CartLine> {
        self.products.iter_mut().find(|l| l.id == line_id)
    }
}

/// Partial update over the shopper-editable fields of a cart line
///
/// Merging is field-wise last-write-wins: the buffer records the desired end
/// state per field, not a change log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_unit: Option<MeasureUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}

impl CartLinePatch {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.purchased_quantity.is_none()
            && self.purchased_unit.is_none()
            && self.unit_price.is_none()
            && self.total_price.is_none()
    }

    /// Merge `newer` on top of this patch; fields present in `newer` win,
    /// fields absent from `newer` keep their current value
    pub fn merge(&mut self, newer: &CartLinePatch) {
        if newer.purchased_quantity.is_some() {
            self.purchased_quantity = newer.purchased_quantity;
        }
        if newer.purchased_unit.is_some() {
            self.purchased_unit = newer.purchased_unit;
        }
        if newer.unit_price.is_some() {
            self.unit_price = newer.unit_price;
        }
        if newer.total_price.is_some() {
            self.total_price = newer.total_price;
        }
    }

    /// Apply the present fields onto a line
    pub fn apply_to(&self, line: &mut CartLine) {
        if let Some(q) = self.purchased_quantity {
            line.purchased_quantity = q;
        }
        if let Some(u) = self.purchased_unit {
            line.purchased_unit = u;
        }
        if let Some(up) = self.unit_price {
            line.unit_price = up;
        }
        if let Some(tp) = self.total_price {
            line.total_price = tp;
        }
    }
}

/// Payload for adding ad-hoc products to a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartProduct {
    pub product_id: i64,
    pub cart_quantity: f64,
    pub price: f64,
}

/// Single-line update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdate {
    pub product: CartLine,
    pub is_advanced_mode: bool,
}

/// Batched line update payload — the flush target of the edit coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartBatchUpdate {
    pub products: Vec<CartLine>,
    pub is_advanced_mode: bool,
}
