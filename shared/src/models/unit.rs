//! Units of measure
//!
//! The wire symbols are the ones the original storefront uses: `Unidade`
//! (a countable package), `g`/`Kg` for mass and `ml`/`L` for volume. Unit
//! prices are always quoted per base unit (Kg, L, or package).

use serde::{Deserialize, Serialize};

/// Unit of measure for stock and purchases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureUnit {
    /// Countable package ("Unidade")
    #[serde(rename = "Unidade")]
    Each,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "Kg")]
    Kilogram,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "L")]
    Liter,
}

impl MeasureUnit {
    /// Wire symbol as shown to the shopper
    pub fn symbol(&self) -> &'static str {
        match self {
            MeasureUnit::Each => "Unidade",
            MeasureUnit::Gram => "g",
            MeasureUnit::Kilogram => "Kg",
            MeasureUnit::Milliliter => "ml",
            MeasureUnit::Liter => "L",
        }
    }

    /// Mass family: g, Kg
    pub fn is_mass(&self) -> bool {
        matches!(self, MeasureUnit::Gram | MeasureUnit::Kilogram)
    }

    /// Volume family: ml, L
    pub fn is_volume(&self) -> bool {
        matches!(self, MeasureUnit::Milliliter | MeasureUnit::Liter)
    }

    /// Base unit of its family (Kg, L) — unit prices are quoted per base unit
    pub fn is_base_unit(&self) -> bool {
        matches!(self, MeasureUnit::Kilogram | MeasureUnit::Liter)
    }

    /// Sub-unit of its family (g, ml) — 1/1000 of the base unit
    pub fn is_sub_unit(&self) -> bool {
        matches!(self, MeasureUnit::Gram | MeasureUnit::Milliliter)
    }
}

impl std::fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
