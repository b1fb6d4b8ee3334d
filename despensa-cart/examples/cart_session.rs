//! Drive a cart session against a running backend
//!
//! ```ignore
//! DESPENSA_API_URL=http://localhost:8080 DESPENSA_PANTRY_ID=1 \
//!     cargo run -p despensa-cart --example cart_session
//! ```

use despensa_cart::{CartEditCoordinator, CoordinatorConfig, LineEdit};
use despensa_client::{CartApi, ClientConfig};
use std::sync::Arc;
use tokio::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let pantry_id: i64 = std::env::var("DESPENSA_PANTRY_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, pantry_id, "Loading cart");
    let api = Arc::new(CartApi::from_config(&config)?);

    let coordinator = CartEditCoordinator::load(
        api,
        pantry_id,
        CoordinatorConfig::default().with_quiet_period(Duration::from_secs(2)),
    )
    .await?;

    let state = coordinator.state();
    tracing::info!(lines = state.cart.products.len(), "Cart loaded");
    for line in &state.cart.products {
        tracing::info!(
            "  #{} {} — {} {} @ {} = {}",
            line.id,
            line.system_product.name,
            line.purchased_quantity,
            line.purchased_unit,
            line.unit_price,
            line.total_price,
        );
    }

    if let Some(first) = state.cart.products.first() {
        let bumped = first.purchased_quantity + 1.0;
        tracing::info!(line_id = first.id, bumped, "Bumping quantity of the first line");
        coordinator.edit(first.id, LineEdit::PurchasedQuantity(bumped))?;
        coordinator.flush_now()?;

        // Give the flush a moment to round-trip
        tokio::time::sleep(Duration::from_secs(1)).await;
        let state = coordinator.state();
        if let Some(err) = &state.last_error {
            tracing::warn!("Cart sync reported: {err}");
        }
        if let Some(line) = state.cart.line(first.id) {
            tracing::info!(
                line_id = line.id,
                total = line.total_price,
                "Line after reconciliation"
            );
        }
    }

    coordinator.dispose().await;
    Ok(())
}
