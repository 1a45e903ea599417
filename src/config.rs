use std::env;

use serde::Deserialize;

use crate::coingate::error::CoinGateError;

/// Merchant-side settings for building checkout requests: where callbacks
/// and buyer redirects land, what the hosted payment page is titled, and
/// which currency the merchant settles in.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Currency the merchant receives, e.g. `EUR` or `BTC`.
    pub receive_currency: String,
    /// Website name, used as the payment page title.
    pub store_name: String,
    /// Absolute base URL of the storefront, without a trailing slash.
    pub base_url: String,
}

impl StoreConfig {
    pub fn new(
        receive_currency: impl Into<String>,
        store_name: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        StoreConfig {
            receive_currency: receive_currency.into(),
            store_name: store_name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, CoinGateError> {
        dotenvy::dotenv().ok();

        let receive_currency = env::var("COINGATE_RECEIVE_CURRENCY")
            .map_err(|_| CoinGateError::ConfigError("Missing COINGATE_RECEIVE_CURRENCY".to_string()))?;
        let store_name = env::var("STORE_NAME")
            .map_err(|_| CoinGateError::ConfigError("Missing STORE_NAME".to_string()))?;
        let base_url = env::var("STORE_BASE_URL")
            .map_err(|_| CoinGateError::ConfigError("Missing STORE_BASE_URL".to_string()))?;

        Ok(Self::new(receive_currency, store_name, base_url))
    }

    /// Notification endpoint the gateway calls back, with the correlation
    /// token embedded as a query parameter.
    pub fn callback_url(&self, token: &str) -> String {
        format!("{}/coingate/payment/callback?token={}", self.base_url, token)
    }

    /// Where the buyer lands after abandoning payment.
    pub fn cancel_url(&self) -> String {
        format!("{}/coingate/payment/cancelOrder", self.base_url)
    }

    /// Where the buyer lands after completing payment.
    pub fn success_url(&self) -> String {
        format!("{}/checkout/onepage/success", self.base_url)
    }
}
