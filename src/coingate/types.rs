use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment statuses a CoinGate order moves through. The gateway reports
/// status as a plain string; [`OrderStatus::parse`] maps it case-sensitively
/// and folds anything unrecognized into [`OrderStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    Pending,
    Confirming,
    Paid,
    Invalid,
    Expired,
    Canceled,
    Refunded,
    Unknown,
}

impl OrderStatus {
    /// Map a wire status string to its known variant. Matching is exact and
    /// case-sensitive; `"Paid"` or a future gateway status parses as
    /// [`OrderStatus::Unknown`] rather than erroring.
    pub fn parse(status: &str) -> Self {
        match status {
            "new" => OrderStatus::New,
            "pending" => OrderStatus::Pending,
            "confirming" => OrderStatus::Confirming,
            "paid" => OrderStatus::Paid,
            "invalid" => OrderStatus::Invalid,
            "expired" => OrderStatus::Expired,
            "canceled" => OrderStatus::Canceled,
            "refunded" => OrderStatus::Refunded,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Pending => "pending",
            OrderStatus::Confirming => "confirming",
            OrderStatus::Paid => "paid",
            OrderStatus::Invalid => "invalid",
            OrderStatus::Expired => "expired",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Unknown => "unknown",
        }
    }

    /// Whether this status means the buyer paid and settlement can proceed.
    pub fn is_paid(&self) -> bool {
        matches!(self, OrderStatus::Paid)
    }

    /// Statuses after which the payment can no longer complete: the local
    /// order should be canceled.
    pub fn is_terminal_negative(&self) -> bool {
        matches!(
            self,
            OrderStatus::Invalid | OrderStatus::Expired | OrderStatus::Canceled | OrderStatus::Refunded
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment order as CoinGate reports it.
///
/// `order_id` echoes the merchant order identifier supplied at creation and
/// is authoritative when a callback must cancel a local order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinGateOrder {
    /// CoinGate-assigned numeric id.
    pub id: i64,
    pub status: String,
    /// Merchant order identifier echoed back by the gateway.
    pub order_id: String,
    pub price_amount: String,
    pub price_currency: String,
    pub receive_currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_amount: Option<String>,
    /// Hosted payment page the buyer is redirected to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CoinGateOrder {
    pub fn payment_status(&self) -> OrderStatus {
        OrderStatus::parse(&self.status)
    }
}
