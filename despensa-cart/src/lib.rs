//! Despensa Cart — shopping-cart unit reconciliation and pricing engine
//!
//! The shopper edits one cell of a cart line (quantity, unit, unit price or
//! total price); the engine recomputes the dependent price fields, reflects
//! the edit on screen immediately, and coalesces bursts of edits into a
//! single batched write to the backend after a quiet period.
//!
//! Modules, leaves first:
//! - [`units`] — which purchase units a shopper may pick for a line
//! - [`money`] — pure price derivation over `rust_decimal`
//! - [`buffer`] — pending-edit buffer merging rapid edits per line
//! - [`coordinator`] — the debounced flush worker and its owning handle

pub mod buffer;
pub mod coordinator;
pub mod money;
pub mod units;

pub use buffer::PendingEditBuffer;
pub use coordinator::{
    BATCH_QUIET_PERIOD, CartEditCoordinator, CartUiError, CartViewState, CoordinatorConfig,
    FIELD_QUIET_PERIOD,
};
pub use money::{DerivedPrices, LineEdit, derive_line_prices, parse_money_input};
pub use units::{line_purchase_units, purchase_units_for};
