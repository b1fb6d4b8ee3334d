//! Wire models for the pantry cart API

mod cart;
mod product;
mod unit;

pub use cart::{Cart, CartBatchUpdate, CartLine, CartLinePatch, CartLineUpdate, NewCartProduct};
pub use product::SystemProduct;
pub use unit::MeasureUnit;
