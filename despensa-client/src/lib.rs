//! Despensa Client - HTTP client for the pantry backend
//!
//! Provides network-based HTTP calls to the pantry REST API, plus the
//! `CartTransport` seam the cart engine talks through.

pub mod cart;
pub mod config;
pub mod error;
pub mod http;

pub use cart::{CartApi, CartTransport};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::models::{Cart, CartBatchUpdate, CartLine, NewCartProduct};
