use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use uuid::Uuid;

use crate::coingate::error::CoinGateError;
use crate::coingate::order::CreateOrderRequest;
use crate::coingate::types::CoinGateOrder;
use crate::coingate::OrderApi;
use crate::config::StoreConfig;
use crate::models::{Order, OrderItem, PaymentRecord};
use crate::store::{PaymentStore, StoreError};

#[derive(Debug, Error)]
enum InitiateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] CoinGateError),
}

/// Starts a gateway payment for a local order.
///
/// Generates the correlation token and persists it on the order's payment
/// record before building and submitting the order creation request. The
/// caller redirects the buyer to the returned order's `payment_url`.
pub struct PaymentInitiator {
    gateway: Arc<dyn OrderApi>,
    payments: Arc<dyn PaymentStore>,
    config: StoreConfig,
}

impl PaymentInitiator {
    pub fn new(
        gateway: Arc<dyn OrderApi>,
        payments: Arc<dyn PaymentStore>,
        config: StoreConfig,
    ) -> Self {
        PaymentInitiator {
            gateway,
            payments,
            config,
        }
    }

    /// Register `order` with the gateway and return the created remote order.
    ///
    /// Never panics and never returns an error: any persistence or gateway
    /// failure is logged and collapses to `None`, so checkout degrades to
    /// "payment unavailable" instead of crashing.
    pub async fn initiate(&self, order: &Order) -> Option<CoinGateOrder> {
        match self.try_initiate(order).await {
            Ok(remote) => Some(remote),
            Err(e) => {
                tracing::error!(
                    order_id = %order.increment_id,
                    error = %e,
                    "Payment initiation failed"
                );
                None
            }
        }
    }

    async fn try_initiate(&self, order: &Order) -> Result<CoinGateOrder, InitiateError> {
        let mut payment = self
            .payments
            .get(&order.increment_id)
            .await?
            .unwrap_or_else(|| PaymentRecord::new(order.increment_id.as_str()));

        // One token per payment attempt: a retry of a failed creation reuses
        // the stored token instead of minting a new one.
        let token = match payment.gateway_token() {
            Some(existing) => existing.to_string(),
            None => generate_token(),
        };

        // The token must be durable before the gateway ever sees the
        // callback URL that carries it.
        payment.set_gateway_token(&token);
        self.payments.save(payment).await?;

        let request = CreateOrderRequest {
            order_id: order.increment_id.clone(),
            price_amount: format_price(order.grand_total),
            price_currency: order.currency.clone(),
            receive_currency: self.config.receive_currency.clone(),
            callback_url: self.config.callback_url(&token),
            cancel_url: self.config.cancel_url(),
            success_url: self.config.success_url(),
            title: self.config.store_name.clone(),
            description: build_description(&order.items),
            token,
        };

        let remote = self.gateway.create_order(&request).await?;

        tracing::info!(
            order_id = %order.increment_id,
            remote_id = remote.id,
            price_amount = %request.price_amount,
            price_currency = %request.price_currency,
            "Gateway order created"
        );

        Ok(remote)
    }
}

/// Mint a fresh 32-character correlation token from the OS random source.
fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Render an amount with exactly two fractional digits, `.` as the decimal
/// separator and no grouping. Midpoints round away from zero, so `19.995`
/// becomes `"20.00"`.
fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Render a quantity with no fractional digits. Fractional quantities are
/// legal on the order and round rather than error.
fn format_qty(qty: Decimal) -> String {
    let rounded = qty.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.0}", rounded)
}

/// Human-readable order summary for the hosted payment page, one
/// `"<qty> × <name>"` entry per line item.
fn build_description(items: &[OrderItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} × {}", format_qty(item.qty), item.name))
        .collect::<Vec<_>>()
        .join(", ")
}
