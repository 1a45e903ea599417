use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Order, OrderState, PaymentRecord};

/// Errors surfaced by the persistence ports.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence port for local orders.
///
/// The merchant platform owns the real implementation; [`InMemoryOrderStore`]
/// covers tests and embedding without a database.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Look up an order by its public increment id.
    async fn get(&self, increment_id: &str) -> Result<Option<Order>, StoreError>;

    /// Insert or replace an order.
    async fn save(&self, order: Order) -> Result<(), StoreError>;

    /// Atomically move an order from `from` to `to`, applying the target
    /// state's default display status.
    ///
    /// Returns `Ok(false)` when the order is no longer in `from`, the same
    /// signal a guarded `UPDATE ... WHERE state = $1` gives through a zero
    /// row count. Callers treat that as a duplicate or out-of-order callback
    /// and move on.
    async fn transition(
        &self,
        increment_id: &str,
        from: OrderState,
        to: OrderState,
    ) -> Result<bool, StoreError>;
}

/// Persistence port for the payment record attached to an order.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn get(&self, order_increment_id: &str) -> Result<Option<PaymentRecord>, StoreError>;

    async fn save(&self, payment: PaymentRecord) -> Result<(), StoreError>;
}

/// A thread-safe in-memory order store.
///
/// Uses `Arc<RwLock<HashMap>>` for shared concurrent access; the write lock
/// held across the check-and-set in [`OrderStore::transition`] is what makes
/// concurrent duplicate callbacks resolve to exactly one applied transition.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
    status_defaults: HashMap<OrderState, String>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the display status applied when an order transitions into
    /// `state`. Without an override the state name itself is used, matching
    /// the platform default.
    pub fn with_status_default(mut self, state: OrderState, status: impl Into<String>) -> Self {
        self.status_defaults.insert(state, status.into());
        self
    }

    fn default_status_for(&self, state: OrderState) -> &str {
        self.status_defaults
            .get(&state)
            .map(String::as_str)
            .unwrap_or_else(|| state.as_str())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, increment_id: &str) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.get(increment_id).cloned())
    }

    async fn save(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.increment_id.clone(), order);
        Ok(())
    }

    async fn transition(
        &self,
        increment_id: &str,
        from: OrderState,
        to: OrderState,
    ) -> Result<bool, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(increment_id)
            .ok_or_else(|| StoreError::OrderNotFound(increment_id.to_string()))?;

        if order.state != from {
            return Ok(false);
        }

        order.state = to;
        order.status = self.default_status_for(to).to_string();
        Ok(true)
    }
}

/// A thread-safe in-memory payment store, keyed by order increment id.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, PaymentRecord>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn get(&self, order_increment_id: &str) -> Result<Option<PaymentRecord>, StoreError> {
        let payments = self.payments.read().await;
        Ok(payments.get(order_increment_id).cloned())
    }

    async fn save(&self, payment: PaymentRecord) -> Result<(), StoreError> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.order_increment_id.clone(), payment);
        Ok(())
    }
}
