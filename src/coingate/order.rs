use async_trait::async_trait;
use serde::Serialize;

use super::error::CoinGateError;
use super::types::CoinGateOrder;
use super::{CoinGateClient, OrderApi};

/// Body of `POST /v2/orders`. Field names are the gateway wire format;
/// amounts are preformatted decimal strings.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    /// Merchant order identifier, echoed back in callbacks.
    pub order_id: String,
    pub price_amount: String,
    pub price_currency: String,
    pub receive_currency: String,
    /// Where the gateway delivers payment status notifications. Carries the
    /// correlation token as a query parameter.
    pub callback_url: String,
    pub cancel_url: String,
    pub success_url: String,
    pub title: String,
    pub description: String,
    /// Correlation token the callback must present to be accepted.
    pub token: String,
}

impl CoinGateClient {
    /// Create a payment order
    pub async fn create_order(&self, params: &CreateOrderRequest) -> Result<CoinGateOrder, CoinGateError> {
        self.post("/v2/orders", params).await
    }

    /// Fetch an order by its CoinGate-assigned id. Returns `None` on 404
    /// rather than an error, so callers can tell "gateway does not know this
    /// order" apart from transport failures.
    pub async fn get_order(&self, id: i64) -> Result<Option<CoinGateOrder>, CoinGateError> {
        let path = format!("/v2/orders/{}", id);
        let response = self.get_raw(&path).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        self.handle_response(response).await.map(Some)
    }
}

#[async_trait]
impl OrderApi for CoinGateClient {
    async fn create_order(&self, params: &CreateOrderRequest) -> Result<CoinGateOrder, CoinGateError> {
        CoinGateClient::create_order(self, params).await
    }

    async fn get_order(&self, id: i64) -> Result<Option<CoinGateOrder>, CoinGateError> {
        CoinGateClient::get_order(self, id).await
    }
}
