//! # CoinGate Payment Reconciliation
//!
//! Bridges a merchant's orders with the CoinGate cryptocurrency payment
//! gateway: [`PaymentInitiator`] registers a payment order for a local sale,
//! and [`CallbackReconciler`] folds the gateway's asynchronous status
//! notifications back into the local order lifecycle.
//!
//! ## Flow
//!
//! - At checkout, [`PaymentInitiator::initiate`] mints a 32-character
//!   correlation token and persists it on the order's payment record before
//!   submitting the order to the gateway; the buyer is redirected to the
//!   returned order's `payment_url`.
//! - The gateway later calls the merchant's notification endpoint with the
//!   remote order id and the token from the callback URL. The endpoint
//!   resolves the local order and calls [`CallbackReconciler::reconcile`],
//!   which checks the token before fetching the current gateway status and
//!   applying a one-way transition: `paid` marks the order processing,
//!   terminal-negative statuses cancel it, anything else is a no-op.
//!   Transitions are compare-and-set, so duplicate or concurrent callbacks
//!   apply at most once.
//!
//! Neither entry point raises: failures are logged and collapse to a benign
//! return, keeping the checkout and notification endpoints available.
//!
//! Persistence sits behind the [`store::OrderStore`] and
//! [`store::PaymentStore`] ports. The merchant platform brings its own
//! implementations; the bundled in-memory ones cover tests and embedding.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use coingate_rs::{
//!     CallbackReconciler, CoinGateClient, CoinGateConfig, InMemoryOrderStore,
//!     InMemoryPaymentStore, Order, OrderItem, OrderStore, PaymentInitiator, StoreConfig,
//! };
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(CoinGateClient::new(CoinGateConfig::new("api-token", true))?);
//! let orders = Arc::new(InMemoryOrderStore::new());
//! let payments = Arc::new(InMemoryPaymentStore::new());
//! let config = StoreConfig::new("EUR", "Acme Outlet", "https://shop.example.com");
//!
//! let initiator = PaymentInitiator::new(gateway.clone(), payments.clone(), config);
//! let reconciler = CallbackReconciler::new(gateway, orders.clone(), payments.clone());
//!
//! // Checkout: register the order with the gateway and redirect the buyer.
//! let order = Order::new(
//!     "1000123",
//!     Decimal::new(4950, 2),
//!     "USD",
//!     vec![OrderItem::new(Decimal::from(2), "Widget")],
//! );
//! orders.save(order.clone()).await?;
//! let remote = initiator.initiate(&order).await.expect("payment unavailable");
//! println!(
//!     "redirect buyer to {}",
//!     remote.payment_url.as_deref().unwrap_or_default()
//! );
//!
//! // Later, the notification endpoint forwards the gateway's callback.
//! let token = remote.token.as_deref().unwrap_or_default();
//! let outcome = reconciler.reconcile("1000123", remote.id, token).await;
//! println!("reconciled: {:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod checkout;
pub mod coingate;
pub mod config;
pub mod models;
pub mod reconciler;
pub mod store;

pub use checkout::PaymentInitiator;
pub use coingate::error::CoinGateError;
pub use coingate::order::CreateOrderRequest;
pub use coingate::types::{CoinGateOrder, OrderStatus};
pub use coingate::{CoinGateClient, CoinGateConfig, OrderApi};
pub use config::StoreConfig;
pub use models::{Order, OrderItem, OrderState, PaymentRecord, ORDER_TOKEN_KEY};
pub use reconciler::{CallbackReconciler, ReconcileError, ReconcileOutcome};
pub use store::{InMemoryOrderStore, InMemoryPaymentStore, OrderStore, PaymentStore, StoreError};
