//! In-memory cart transport for coordinator tests
//!
//! Keeps a server-side cart, records every request, and can inject failures
//! and virtual latency into the batch path.

use async_trait::async_trait;
use despensa_client::{CartTransport, ClientError, ClientResult};
use shared::models::{
    Cart, CartBatchUpdate, CartLine, MeasureUnit, NewCartProduct, SystemProduct,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use tokio::time::Duration;

pub struct MockTransport {
    cart: Mutex<Cart>,
    next_line_id: AtomicI64,
    /// Request payloads of every batch call, recorded at call entry
    pub batches: Mutex<Vec<CartBatchUpdate>>,
    /// Chronological operation log: "batch", "add", "remove", "finalize"
    pub ops: Mutex<Vec<&'static str>>,
    /// Number of upcoming batch calls to fail
    fail_batches: AtomicUsize,
    /// Virtual latency applied to batch calls
    batch_delay: Mutex<Duration>,
}

impl MockTransport {
    pub fn new(cart: Cart) -> Self {
        let next = cart.products.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        Self {
            cart: Mutex::new(cart),
            next_line_id: AtomicI64::new(next),
            batches: Mutex::new(Vec::new()),
            ops: Mutex::new(Vec::new()),
            fail_batches: AtomicUsize::new(0),
            batch_delay: Mutex::new(Duration::ZERO),
        }
    }

    /// Fail the next `n` batch calls with an internal error
    pub fn fail_next_batches(&self, n: usize) {
        self.fail_batches.store(n, Ordering::SeqCst);
    }

    /// Delay every batch call by `delay` (virtual time under a paused runtime)
    pub fn set_batch_delay(&self, delay: Duration) {
        *self.batch_delay.lock().unwrap() = delay;
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    pub fn server_cart(&self) -> Cart {
        self.cart.lock().unwrap().clone()
    }
}

#[async_trait]
impl CartTransport for MockTransport {
    async fn load_cart(&self, _pantry_id: i64) -> ClientResult<Cart> {
        Ok(self.cart.lock().unwrap().clone())
    }

    async fn add_products(
        &self,
        _pantry_id: i64,
        products: Vec<NewCartProduct>,
    ) -> ClientResult<Cart> {
        self.ops.lock().unwrap().push("add");
        let mut cart = self.cart.lock().unwrap();
        for p in products {
            let id = self.next_line_id.fetch_add(1, Ordering::SeqCst);
            cart.products.push(CartLine {
                id,
                system_product: SystemProduct {
                    id: p.product_id,
                    name: format!("produto-{}", p.product_id),
                    unit: MeasureUnit::Each,
                    quantity_per_unit: None,
                },
                planned_quantity: None,
                planned_unit: None,
                purchased_quantity: p.cart_quantity,
                purchased_unit: MeasureUnit::Each,
                unit_price: p.price,
                total_price: p.price * p.cart_quantity,
            });
        }
        Ok(cart.clone())
    }

    async fn update_line(
        &self,
        _pantry_id: i64,
        line: CartLine,
        _is_advanced_mode: bool,
    ) -> ClientResult<Cart> {
        let mut cart = self.cart.lock().unwrap();
        if let Some(existing) = cart.line_mut(line.id) {
            *existing = line;
        }
        Ok(cart.clone())
    }

    async fn update_lines_batch(
        &self,
        _pantry_id: i64,
        batch: CartBatchUpdate,
    ) -> ClientResult<Cart> {
        self.ops.lock().unwrap().push("batch");
        self.batches.lock().unwrap().push(batch.clone());

        let delay = *self.batch_delay.lock().unwrap();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }

        if self
            .fail_batches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ClientError::Internal("injected batch failure".to_string()));
        }

        let mut cart = self.cart.lock().unwrap();
        for line in batch.products {
            if let Some(existing) = cart.line_mut(line.id) {
                *existing = line;
            }
        }
        Ok(cart.clone())
    }

    async fn remove_line(&self, _pantry_id: i64, line_id: i64) -> ClientResult<()> {
        self.ops.lock().unwrap().push("remove");
        self.cart
            .lock()
            .unwrap()
            .products
            .retain(|l| l.id != line_id);
        Ok(())
    }

    async fn finalize(&self, _pantry_id: i64, _is_advanced_mode: bool) -> ClientResult<()> {
        self.ops.lock().unwrap().push("finalize");
        self.cart.lock().unwrap().products.clear();
        Ok(())
    }
}

/// Cart with one line per interesting unit combination
pub fn sample_cart() -> Cart {
    Cart {
        id: 1,
        pantry_id: 7,
        created_at: shared::util::now_millis(),
        products: vec![
            // Bought by weight, stocked by weight
            CartLine {
                id: 1,
                system_product: SystemProduct {
                    id: 101,
                    name: "Arroz".to_string(),
                    unit: MeasureUnit::Kilogram,
                    quantity_per_unit: None,
                },
                planned_quantity: Some(2.0),
                planned_unit: Some(MeasureUnit::Kilogram),
                purchased_quantity: 2.0,
                purchased_unit: MeasureUnit::Kilogram,
                unit_price: 4.5,
                total_price: 9.0,
            },
            // Bought by package, stocked in grams (500 g per package)
            CartLine {
                id: 2,
                system_product: SystemProduct {
                    id: 102,
                    name: "Feijão".to_string(),
                    unit: MeasureUnit::Gram,
                    quantity_per_unit: Some(500.0),
                },
                planned_quantity: Some(2.0),
                planned_unit: Some(MeasureUnit::Each),
                purchased_quantity: 2.0,
                purchased_unit: MeasureUnit::Each,
                unit_price: 4.0,
                total_price: 4.0,
            },
            // Bought by package, stocked by package
            CartLine {
                id: 3,
                system_product: SystemProduct {
                    id: 103,
                    name: "Ovos".to_string(),
                    unit: MeasureUnit::Each,
                    quantity_per_unit: None,
                },
                planned_quantity: None,
                planned_unit: None,
                purchased_quantity: 1.0,
                purchased_unit: MeasureUnit::Each,
                unit_price: 8.0,
                total_price: 8.0,
            },
        ],
    }
}
