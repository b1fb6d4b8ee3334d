//! Cart API
//!
//! Typed methods over the cart endpoints, and the `CartTransport` trait the
//! edit coordinator depends on so tests can swap in an in-memory transport.

use crate::http::HttpClient;
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use shared::models::{Cart, CartBatchUpdate, CartLine, CartLineUpdate, NewCartProduct};

/// Transport seam between the cart engine and the backend
///
/// Every mutating call returns the full authoritative cart; the engine
/// overwrites its optimistic line values with whatever comes back.
#[async_trait]
pub trait CartTransport: Send + Sync {
    /// Load the pantry's cart, creating one from its shopping list if needed
    async fn load_cart(&self, pantry_id: i64) -> ClientResult<Cart>;

    /// Add ad-hoc products as new cart lines
    async fn add_products(
        &self,
        pantry_id: i64,
        products: Vec<NewCartProduct>,
    ) -> ClientResult<Cart>;

    /// Update a single line outside the batch path
    async fn update_line(
        &self,
        pantry_id: i64,
        line: CartLine,
        is_advanced_mode: bool,
    ) -> ClientResult<Cart>;

    /// Batched line update — the flush target of the edit coordinator
    async fn update_lines_batch(
        &self,
        pantry_id: i64,
        batch: CartBatchUpdate,
    ) -> ClientResult<Cart>;

    /// Remove a line from the cart
    async fn remove_line(&self, pantry_id: i64, line_id: i64) -> ClientResult<()>;

    /// Finalize the purchase; the server clears the cart
    async fn finalize(&self, pantry_id: i64, is_advanced_mode: bool) -> ClientResult<()>;
}

/// Network-backed cart API
#[derive(Debug, Clone)]
pub struct CartApi {
    http: HttpClient,
}

impl CartApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Build directly from configuration
    pub fn from_config(config: &crate::ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(HttpClient::new(config)?))
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FinalizePayload {
    is_advanced_mode: bool,
}

#[async_trait]
impl CartTransport for CartApi {
    async fn load_cart(&self, pantry_id: i64) -> ClientResult<Cart> {
        self.http
            .post_empty(&format!("api/pantries/{}/cart", pantry_id))
            .await
    }

    async fn add_products(
        &self,
        pantry_id: i64,
        products: Vec<NewCartProduct>,
    ) -> ClientResult<Cart> {
        self.http
            .post(&format!("api/pantries/{}/cart/products", pantry_id), &products)
            .await
    }

    async fn update_line(
        &self,
        pantry_id: i64,
        line: CartLine,
        is_advanced_mode: bool,
    ) -> ClientResult<Cart> {
        let line_id = line.id;
        let payload = CartLineUpdate {
            product: line,
            is_advanced_mode,
        };
        self.http
            .put(
                &format!("api/pantries/{}/cart/products/{}", pantry_id, line_id),
                &payload,
            )
            .await
    }

    async fn update_lines_batch(
        &self,
        pantry_id: i64,
        batch: CartBatchUpdate,
    ) -> ClientResult<Cart> {
        tracing::debug!(
            pantry_id,
            lines = batch.products.len(),
            "Pushing cart batch update"
        );
        self.http
            .put(&format!("api/pantries/{}/cart/products", pantry_id), &batch)
            .await
    }

    async fn remove_line(&self, pantry_id: i64, line_id: i64) -> ClientResult<()> {
        self.http
            .delete(&format!("api/pantries/{}/cart/products/{}", pantry_id, line_id))
            .await
    }

    async fn finalize(&self, pantry_id: i64, is_advanced_mode: bool) -> ClientResult<()> {
        self.http
            .post_unit(
                &format!("api/pantries/{}/cart/finalize", pantry_id),
                &FinalizePayload { is_advanced_mode },
            )
            .await
    }
}
