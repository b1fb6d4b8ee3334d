//! Catalog product reference

use super::MeasureUnit;
use serde::{Deserialize, Serialize};

/// Catalog product as referenced from a cart line
///
/// `quantity_per_unit` is the amount of stock unit one purchasable package
/// holds (e.g. a package of 500 g). Absent means 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemProduct {
    pub id: i64,
    pub name: String,
    /// Stock unit of measure
    pub unit: MeasureUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_per_unit: Option<f64>,
}
