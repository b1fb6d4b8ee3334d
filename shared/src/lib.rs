//! Shared types for the Despensa pantry suite
//!
//! Wire models and response structures used by both the cart engine and the
//! HTTP client. The backend API speaks camelCase JSON; everything here is the
//! Rust-side mirror of that contract.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Cart, CartBatchUpdate, CartLine, CartLinePatch, MeasureUnit, NewCartProduct, SystemProduct,
};
pub use response::ApiResponse;
