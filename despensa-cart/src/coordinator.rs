//! Cart edit coordinator
//!
//! One coordinator per cart view. A single worker task owns the cart state,
//! the pending-edit buffer and the debounce deadline; UI events reach it
//! through an unbounded command channel and state flows back through a watch
//! channel, so edits are applied in arrival order and reflected on screen
//! immediately while network writes coalesce behind a quiet period.
//!
//! The quiet-period timer is a debounce, not a throttle: every edit re-arms
//! it, and the flush fires one quiet period after the last edit. A batch
//! request runs in a spawned task so edits keep flowing while it is in
//! flight; at most one batch is in flight at a time.

use despensa_client::{CartTransport, ClientError};
use shared::models::{Cart, CartBatchUpdate, CartLine, CartLinePatch, MeasureUnit, NewCartProduct};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::buffer::PendingEditBuffer;
use crate::money::{LineEdit, derive_line_prices};
use crate::units;

/// Quiet period for batched cart-line edits
pub const BATCH_QUIET_PERIOD: Duration = Duration::from_secs(10);
/// Quiet period for single-field edits elsewhere in the app
pub const FIELD_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Park duration while no deadline is armed
const IDLE_PARK: Duration = Duration::from_secs(3600);

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Debounce window between the last edit and the batch flush
    pub quiet_period: Duration,
    /// Forwarded to the backend on every mutating call
    pub is_advanced_mode: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            quiet_period: BATCH_QUIET_PERIOD,
            is_advanced_mode: false,
        }
    }
}

impl CoordinatorConfig {
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn with_advanced_mode(mut self, is_advanced_mode: bool) -> Self {
        self.is_advanced_mode = is_advanced_mode;
        self
    }
}

/// Typed error state surfaced to the UI; raw client errors never cross the
/// coordinator boundary
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartUiError {
    #[error("failed to sync cart changes: {0}")]
    FlushFailed(String),

    #[error("{op} failed: {message}")]
    OperationFailed { op: &'static str, message: String },

    #[error("cart line {0} not found")]
    LineNotFound(i64),

    #[error("unit {unit} is not allowed for cart line {line_id}")]
    UnitNotAllowed { line_id: i64, unit: MeasureUnit },

    #[error("cart view disposed")]
    Disposed,
}

impl CartUiError {
    fn operation(op: &'static str, err: ClientError) -> Self {
        CartUiError::OperationFailed {
            op,
            message: err.to_string(),
        }
    }
}

/// Snapshot of the cart view published after every state transition
#[derive(Debug, Clone)]
pub struct CartViewState {
    /// Optimistic cart — always reflects the latest edit
    pub cart: Cart,
    /// Buffered edits waiting for the quiet period
    pub dirty: bool,
    /// A batch request is in flight
    pub flushing: bool,
    /// Most recent error, cleared by the next successful flush
    pub last_error: Option<CartUiError>,
}

enum Command {
    Edit {
        line_id: i64,
        edit: LineEdit,
    },
    FlushNow,
    AddProducts {
        products: Vec<NewCartProduct>,
        reply: oneshot::Sender<Result<(), CartUiError>>,
    },
    RemoveLine {
        line_id: i64,
        reply: oneshot::Sender<Result<(), CartUiError>>,
    },
    Finalize {
        reply: oneshot::Sender<Result<(), CartUiError>>,
    },
}

struct FlushOutcome {
    drained: Vec<(i64, CartLinePatch)>,
    result: Result<Cart, ClientError>,
}

/// Handle owning one cart view's edit pipeline
///
/// Dropping the handle (or calling [`dispose`](Self::dispose)) stops the
/// worker after a best-effort flush of whatever is still buffered; no timer
/// callback outlives the view.
pub struct CartEditCoordinator {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<CartViewState>,
    shutdown: CancellationToken,
    worker: JoinHandle<()>,
}

impl CartEditCoordinator {
    /// Spawn a coordinator over an already loaded cart
    pub fn spawn(
        transport: Arc<dyn CartTransport>,
        pantry_id: i64,
        cart: Cart,
        config: CoordinatorConfig,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(CartViewState {
            cart: cart.clone(),
            dirty: false,
            flushing: false,
            last_error: None,
        });
        let shutdown = CancellationToken::new();

        let worker = CartWorker {
            transport,
            pantry_id,
            config,
            cart,
            buffer: PendingEditBuffer::new(),
            state_tx,
            last_error: None,
            deadline: None,
            in_flight: false,
            flush_due: false,
            pending_finalize: None,
            done_tx,
        };
        let handle = tokio::spawn(worker.run(cmd_rx, done_rx, shutdown.clone()));

        Self {
            cmd_tx,
            state_rx,
            shutdown,
            worker: handle,
        }
    }

    /// Load (or create) the pantry's cart and spawn a coordinator over it
    pub async fn load(
        transport: Arc<dyn CartTransport>,
        pantry_id: i64,
        config: CoordinatorConfig,
    ) -> Result<Self, CartUiError> {
        let cart = transport
            .load_cart(pantry_id)
            .await
            .map_err(|e| CartUiError::operation("load cart", e))?;
        Ok(Self::spawn(transport, pantry_id, cart, config))
    }

    /// Record a cell edit; the optimistic state updates immediately and the
    /// flush timer re-arms
    pub fn edit(&self, line_id: i64, edit: LineEdit) -> Result<(), CartUiError> {
        self.cmd_tx
            .send(Command::Edit { line_id, edit })
            .map_err(|_| CartUiError::Disposed)
    }

    /// Force an immediate flush cycle instead of waiting out the quiet period
    pub fn flush_now(&self) -> Result<(), CartUiError> {
        self.cmd_tx
            .send(Command::FlushNow)
            .map_err(|_| CartUiError::Disposed)
    }

    /// Add ad-hoc products as new cart lines
    pub async fn add_products(&self, products: Vec<NewCartProduct>) -> Result<(), CartUiError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::AddProducts { products, reply })
            .map_err(|_| CartUiError::Disposed)?;
        rx.await.map_err(|_| CartUiError::Disposed)?
    }

    /// Remove a line; its pending edits are dropped on success
    pub async fn remove_line(&self, line_id: i64) -> Result<(), CartUiError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::RemoveLine { line_id, reply })
            .map_err(|_| CartUiError::Disposed)?;
        rx.await.map_err(|_| CartUiError::Disposed)?
    }

    /// Flush buffered edits, then finalize the purchase (server clears the cart)
    pub async fn finalize(&self) -> Result<(), CartUiError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Finalize { reply })
            .map_err(|_| CartUiError::Disposed)?;
        rx.await.map_err(|_| CartUiError::Disposed)?
    }

    /// Watch the cart view state
    pub fn subscribe(&self) -> watch::Receiver<CartViewState> {
        self.state_rx.clone()
    }

    /// Current state snapshot
    pub fn state(&self) -> CartViewState {
        self.state_rx.borrow().clone()
    }

    /// Stop the worker: cancels any armed timer, pushes a best-effort final
    /// flush of buffered edits and waits for the task to exit
    pub async fn dispose(self) {
        self.shutdown.cancel();
        let _ = self.worker.await;
    }
}

// ============================================================================
// Worker
// ============================================================================

struct CartWorker {
    transport: Arc<dyn CartTransport>,
    pantry_id: i64,
    config: CoordinatorConfig,
    cart: Cart,
    buffer: PendingEditBuffer,
    state_tx: watch::Sender<CartViewState>,
    last_error: Option<CartUiError>,
    /// Armed quiet-period deadline; None while idle
    deadline: Option<Instant>,
    /// A batch request is in flight
    in_flight: bool,
    /// The deadline fired while a batch was in flight; flush once it resolves
    flush_due: bool,
    /// Finalize requested while a batch was in flight
    pending_finalize: Option<oneshot::Sender<Result<(), CartUiError>>>,
    done_tx: mpsc::UnboundedSender<FlushOutcome>,
}

impl CartWorker {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Command>,
        mut done_rx: mpsc::UnboundedReceiver<FlushOutcome>,
        shutdown: CancellationToken,
    ) {
        tracing::debug!(pantry_id = self.pantry_id, "Cart edit coordinator started");

        loop {
            let sleep_at = self.deadline.unwrap_or_else(|| Instant::now() + IDLE_PARK);

            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.final_flush().await;
                    break;
                }

                _ = sleep_until(sleep_at), if self.deadline.is_some() => {
                    self.deadline = None;
                    if self.in_flight {
                        self.flush_due = true;
                    } else {
                        self.start_flush();
                    }
                }

                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => {
                        // All handles dropped without dispose()
                        self.final_flush().await;
                        break;
                    }
                },

                Some(outcome) = done_rx.recv() => {
                    let flushed_ok = self.finish_flush(outcome);
                    let due = std::mem::take(&mut self.flush_due);
                    if let Some(reply) = self.pending_finalize.take() {
                        self.do_finalize(reply).await;
                    } else if flushed_ok && due {
                        self.start_flush();
                    }
                }
            }
        }

        tracing::debug!(pantry_id = self.pantry_id, "Cart edit coordinator stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Edit { line_id, edit } => self.apply_edit(line_id, edit),
            Command::FlushNow => {
                self.deadline = None;
                if self.in_flight {
                    self.flush_due = true;
                } else {
                    self.start_flush();
                }
            }
            Command::AddProducts { products, reply } => {
                let result = self.do_add(products).await;
                let _ = reply.send(result);
            }
            Command::RemoveLine { line_id, reply } => {
                let result = self.do_remove(line_id).await;
                let _ = reply.send(result);
            }
            Command::Finalize { reply } => {
                if self.in_flight {
                    if self.pending_finalize.is_some() {
                        let _ = reply.send(Err(CartUiError::OperationFailed {
                            op: "finalize",
                            message: "finalize already in progress".to_string(),
                        }));
                    } else {
                        self.pending_finalize = Some(reply);
                    }
                } else {
                    self.do_finalize(reply).await;
                }
            }
        }
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Apply an edit optimistically, derive the dependent prices, buffer the
    /// patch and re-arm the quiet-period timer
    fn apply_edit(&mut self, line_id: i64, edit: LineEdit) {
        if let LineEdit::PurchasedUnit(unit) = edit {
            let allowed = self
                .cart
                .line(line_id)
                .map(|l| units::is_allowed_purchase_unit(l.planned_unit, unit));
            if allowed == Some(false) {
                tracing::warn!(line_id, unit = %unit, "Rejected purchase unit outside allowed set");
                self.last_error = Some(CartUiError::UnitNotAllowed { line_id, unit });
                self.publish();
                return;
            }
        }

        let Some(line) = self.cart.line_mut(line_id) else {
            tracing::warn!(line_id, "Edit targets unknown cart line");
            self.last_error = Some(CartUiError::LineNotFound(line_id));
            self.publish();
            return;
        };

        edit.apply_to(line);
        let derived = derive_line_prices(line);
        line.unit_price = derived.unit_price;
        line.total_price = derived.total_price;

        let mut patch = CartLinePatch {
            unit_price: Some(derived.unit_price),
            total_price: Some(derived.total_price),
            ..Default::default()
        };
        match edit {
            LineEdit::PurchasedQuantity(_) => {
                patch.purchased_quantity = Some(line.purchased_quantity);
            }
            LineEdit::PurchasedUnit(unit) => patch.purchased_unit = Some(unit),
            LineEdit::UnitPrice(_) | LineEdit::TotalPrice(_) => {}
        }

        self.buffer.record_edit(line_id, patch);
        self.deadline = Some(Instant::now() + self.config.quiet_period);
        self.publish();
    }

    // ========================================================================
    // Batch flush
    // ========================================================================

    /// Drain the buffer and push one batch request in a spawned task
    fn start_flush(&mut self) {
        if self.in_flight || self.buffer.is_empty() {
            return;
        }

        let drained = self.buffer.drain();
        let products = self.dirty_lines(&drained);
        if products.is_empty() {
            // Every dirty line was removed in the meantime
            return;
        }

        let batch = CartBatchUpdate {
            products,
            is_advanced_mode: self.config.is_advanced_mode,
        };
        tracing::debug!(lines = batch.products.len(), "Flushing buffered cart edits");

        let transport = Arc::clone(&self.transport);
        let pantry_id = self.pantry_id;
        let done_tx = self.done_tx.clone();
        self.in_flight = true;
        tokio::spawn(async move {
            let result = transport.update_lines_batch(pantry_id, batch).await;
            let _ = done_tx.send(FlushOutcome { drained, result });
        });

        self.publish();
    }

    /// Handle a resolved batch request; returns true on success
    fn finish_flush(&mut self, outcome: FlushOutcome) -> bool {
        self.in_flight = false;
        let ok = match outcome.result {
            Ok(server_cart) => {
                self.reconcile(server_cart);
                self.last_error = None;
                true
            }
            Err(e) => {
                tracing::warn!("Cart batch update failed, keeping edits buffered: {e}");
                self.buffer.restore(outcome.drained);
                // Retry one quiet period from now (or sooner if the shopper
                // keeps editing)
                self.deadline = Some(Instant::now() + self.config.quiet_period);
                self.last_error = Some(CartUiError::FlushFailed(e.to_string()));
                false
            }
        };
        self.publish();
        ok
    }

    /// Replace local state with the authoritative server cart, then overlay
    /// patches still buffered (edits that accrued while the request was in
    /// flight) so the screen keeps reflecting the latest edit
    fn reconcile(&mut self, mut server_cart: Cart) {
        for (line_id, patch) in self.buffer.iter() {
            if let Some(line) = server_cart.line_mut(*line_id) {
                patch.apply_to(line);
            }
        }
        self.cart = server_cart;
    }

    /// Materialize full lines for the drained patch set from optimistic state
    fn dirty_lines(&self, drained: &[(i64, CartLinePatch)]) -> Vec<CartLine> {
        drained
            .iter()
            .filter_map(|(line_id, _)| self.cart.line(*line_id).cloned())
            .collect()
    }

    /// Best-effort flush on shutdown; failures are logged, not retried
    async fn final_flush(&mut self) {
        if self.in_flight || self.buffer.is_empty() {
            return;
        }
        let drained = self.buffer.drain();
        let products = self.dirty_lines(&drained);
        if products.is_empty() {
            return;
        }
        let batch = CartBatchUpdate {
            products,
            is_advanced_mode: self.config.is_advanced_mode,
        };
        match self
            .transport
            .update_lines_batch(self.pantry_id, batch)
            .await
        {
            Ok(_) => tracing::debug!("Final cart flush pushed"),
            Err(e) => tracing::warn!("Final cart flush failed, buffered edits dropped: {e}"),
        }
    }

    // ========================================================================
    // Single-line operations
    // ========================================================================

    async fn do_add(&mut self, products: Vec<NewCartProduct>) -> Result<(), CartUiError> {
        match self.transport.add_products(self.pantry_id, products).await {
            Ok(server_cart) => {
                self.reconcile(server_cart);
                self.publish();
                Ok(())
            }
            Err(e) => {
                let err = CartUiError::operation("add products", e);
                self.last_error = Some(err.clone());
                self.publish();
                Err(err)
            }
        }
    }

    async fn do_remove(&mut self, line_id: i64) -> Result<(), CartUiError> {
        match self.transport.remove_line(self.pantry_id, line_id).await {
            Ok(()) => {
                // Only now is the local mutation committed
                self.buffer.remove(line_id);
                self.cart.products.retain(|l| l.id != line_id);
                self.publish();
                Ok(())
            }
            Err(e) => {
                let err = CartUiError::operation("remove line", e);
                self.last_error = Some(err.clone());
                self.publish();
                Err(err)
            }
        }
    }

    /// Flush buffered edits inline, then finalize the purchase
    async fn do_finalize(&mut self, reply: oneshot::Sender<Result<(), CartUiError>>) {
        if !self.buffer.is_empty() {
            let drained = self.buffer.drain();
            let products = self.dirty_lines(&drained);
            if !products.is_empty() {
                let batch = CartBatchUpdate {
                    products,
                    is_advanced_mode: self.config.is_advanced_mode,
                };
                match self
                    .transport
                    .update_lines_batch(self.pantry_id, batch)
                    .await
                {
                    Ok(server_cart) => self.reconcile(server_cart),
                    Err(e) => {
                        self.buffer.restore(drained);
                        self.deadline = Some(Instant::now() + self.config.quiet_period);
                        let err = CartUiError::FlushFailed(e.to_string());
                        self.last_error = Some(err.clone());
                        self.publish();
                        let _ = reply.send(Err(err));
                        return;
                    }
                }
            }
            self.deadline = None;
        }

        match self
            .transport
            .finalize(self.pantry_id, self.config.is_advanced_mode)
            .await
        {
            Ok(()) => {
                self.cart.products.clear();
                self.last_error = None;
                self.publish();
                let _ = reply.send(Ok(()));
            }
            Err(e) => {
                let err = CartUiError::operation("finalize", e);
                self.last_error = Some(err.clone());
                self.publish();
                let _ = reply.send(Err(err));
            }
        }
    }

    fn publish(&self) {
        let _ = self.state_tx.send(CartViewState {
            cart: self.cart.clone(),
            dirty: !self.buffer.is_empty(),
            flushing: self.in_flight,
            last_error: self.last_error.clone(),
        });
    }
}
