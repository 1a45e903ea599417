pub mod error;
pub mod order;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use error::CoinGateError;
use order::CreateOrderRequest;
use types::CoinGateOrder;

pub const LIVE_BASE_PATH: &str = "https://api.coingate.com";
pub const SANDBOX_BASE_PATH: &str = "https://api-sandbox.coingate.com";

/// Configuration for the CoinGate API client
#[derive(Debug, Clone)]
pub struct CoinGateConfig {
    pub api_auth_token: String,
    pub sandbox: bool,
    pub base_path: String,
}

impl CoinGateConfig {
    /// Build a configuration for the given auth token, selecting the live or
    /// sandbox endpoint.
    pub fn new(api_auth_token: impl Into<String>, sandbox: bool) -> Self {
        let base_path = if sandbox {
            SANDBOX_BASE_PATH.to_string()
        } else {
            LIVE_BASE_PATH.to_string()
        };

        CoinGateConfig {
            api_auth_token: api_auth_token.into(),
            sandbox,
            base_path,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, CoinGateError> {
        dotenvy::dotenv().ok();

        let api_auth_token = std::env::var("COINGATE_API_AUTH_TOKEN")
            .map_err(|_| CoinGateError::ConfigError("Missing COINGATE_API_AUTH_TOKEN".to_string()))?;

        let sandbox = std::env::var("COINGATE_SANDBOX")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        Ok(Self::new(api_auth_token, sandbox))
    }
}

/// Order operations the payment flows need from the gateway.
///
/// [`CoinGateClient`] is the production implementation; tests substitute a
/// scriptable double.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Register a payment order with the gateway.
    async fn create_order(&self, params: &CreateOrderRequest) -> Result<CoinGateOrder, CoinGateError>;

    /// Fetch an order by its gateway-assigned id. `None` when the gateway
    /// does not know the id.
    async fn get_order(&self, id: i64) -> Result<Option<CoinGateOrder>, CoinGateError>;
}

/// Main CoinGate API client
#[derive(Clone)]
pub struct CoinGateClient {
    config: Arc<CoinGateConfig>,
    http_client: Client,
}

impl CoinGateClient {
    /// Create a new CoinGate client with the given configuration
    pub fn new(config: CoinGateConfig) -> Result<Self, CoinGateError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CoinGateError::HttpError(e.to_string()))?;

        Ok(CoinGateClient {
            config: Arc::new(config),
            http_client,
        })
    }

    /// Create a new CoinGate client from environment variables
    pub fn from_env() -> Result<Self, CoinGateError> {
        let config = CoinGateConfig::from_env()?;
        Self::new(config)
    }

    /// Make a GET request to the CoinGate API, returning the raw response so
    /// callers can special-case status codes before decoding.
    pub(crate) async fn get_raw(&self, path: &str) -> Result<reqwest::Response, CoinGateError> {
        let url = format!("{}{}", self.config.base_path, path);
        self.http_client
            .get(&url)
            .header("Authorization", format!("Token {}", self.config.api_auth_token))
            .send()
            .await
            .map_err(|e| CoinGateError::HttpError(e.to_string()))
    }

    /// Make a POST request to the CoinGate API
    pub(crate) async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CoinGateError> {
        let url = format!("{}{}", self.config.base_path, path);
        let response = self.http_client
            .post(&url)
            .header("Authorization", format!("Token {}", self.config.api_auth_token))
            .json(body)
            .send()
            .await
            .map_err(|e| CoinGateError::HttpError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle HTTP response and convert to appropriate type or error
    pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CoinGateError> {
        let status = response.status();

        if status.is_success() {
            response.json::<T>().await
                .map_err(|e| CoinGateError::ParseError(e.to_string()))
        } else {
            let error_body = response.text().await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            Err(CoinGateError::ApiError {
                status_code: status.as_u16(),
                message: api_error_message(&error_body),
            })
        }
    }

    pub fn config(&self) -> &CoinGateConfig {
        &self.config
    }
}

/// CoinGate error bodies are JSON of the form
/// `{"message": "...", "reason": "..."}`. Surface the structured message when
/// present, otherwise fall back to the raw body.
fn api_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    let message = value.get("message").and_then(|m| m.as_str());
    let reason = value.get("reason").and_then(|r| r.as_str());

    match (reason, message) {
        (Some(reason), Some(message)) => format!("{}: {}", reason, message),
        (None, Some(message)) => message.to_string(),
        _ => body.to_string(),
    }
}
