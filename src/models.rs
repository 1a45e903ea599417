use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Key under which the correlation token lives in a payment's
/// additional-information bag.
pub const ORDER_TOKEN_KEY: &str = "coingate_order_token";

/// Lifecycle states of a local order that payment reconciliation may touch.
///
/// Reconciliation only ever moves `Pending` orders; `Processing` and
/// `Canceled` are settled and stay put no matter what later callbacks claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Pending,
    Processing,
    Canceled,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "pending",
            OrderState::Processing => "processing",
            OrderState::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchasable line on an order, as much of it as checkout requests need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub qty: Decimal,
    pub name: String,
}

impl OrderItem {
    pub fn new(qty: Decimal, name: impl Into<String>) -> Self {
        OrderItem {
            qty,
            name: name.into(),
        }
    }
}

/// A merchant order at the moment payment begins.
///
/// `state` is the machine-readable lifecycle state; `status` is the
/// human-facing display status shown alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Public order number, e.g. `1000123`.
    pub increment_id: String,
    pub grand_total: Decimal,
    /// ISO currency code the buyer was charged in.
    pub currency: String,
    pub items: Vec<OrderItem>,
    pub state: OrderState,
    pub status: String,
}

impl Order {
    /// A fresh order awaiting payment.
    pub fn new(
        increment_id: impl Into<String>,
        grand_total: Decimal,
        currency: impl Into<String>,
        items: Vec<OrderItem>,
    ) -> Self {
        Order {
            increment_id: increment_id.into(),
            grand_total,
            currency: currency.into(),
            items,
            state: OrderState::Pending,
            status: OrderState::Pending.as_str().to_string(),
        }
    }
}

/// The payment attached to an order, holding gateway bookkeeping in a
/// free-form key/value bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub order_increment_id: String,
    pub additional_information: HashMap<String, String>,
}

impl PaymentRecord {
    pub fn new(order_increment_id: impl Into<String>) -> Self {
        PaymentRecord {
            order_increment_id: order_increment_id.into(),
            additional_information: HashMap::new(),
        }
    }

    /// The stored correlation token, if one was ever attached.
    pub fn gateway_token(&self) -> Option<&str> {
        self.additional_information
            .get(ORDER_TOKEN_KEY)
            .map(String::as_str)
    }

    pub fn set_gateway_token(&mut self, token: impl Into<String>) {
        self.additional_information
            .insert(ORDER_TOKEN_KEY.to_string(), token.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_start_pending() {
        let order = Order::new("1000123", Decimal::new(4950, 2), "USD", vec![]);
        assert_eq!(order.state, OrderState::Pending);
        assert_eq!(order.status, "pending");
    }

    #[test]
    fn payment_token_round_trips_through_the_information_bag() {
        let mut payment = PaymentRecord::new("1000123");
        assert!(payment.gateway_token().is_none());

        payment.set_gateway_token("0f8fad5bd9cb469fa165b0f5aae0a5c6");
        assert_eq!(
            payment.gateway_token(),
            Some("0f8fad5bd9cb469fa165b0f5aae0a5c6")
        );
        assert_eq!(
            payment
                .additional_information
                .get(ORDER_TOKEN_KEY)
                .map(String::as_str),
            Some("0f8fad5bd9cb469fa165b0f5aae0a5c6")
        );
    }

    #[test]
    fn order_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderState::Processing).unwrap(),
            "\"processing\""
        );
    }
}
