use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Query string for GET /coins/markets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketsQuery {
    pub vs_currency: String,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
    pub sparkline: bool,
}

impl Default for MarketsQuery {
    /// The fixed query the card issues: first 250 coins by market cap, priced in USD
    fn default() -> Self {
        Self {
            vs_currency: "USD".to_string(),
            order: "market_cap_desc".to_string(),
            per_page: 250,
            page: 1,
            sparkline: false,
        }
    }
}

/// Status block of a CoinGecko error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorStatus {
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

/// Error response from the API.
///
/// CoinGecko answers either `{"error": "..."}` or
/// `{"status": {"error_code": 429, "error_message": "..."}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub status: Option<ErrorStatus>,
}

impl ErrorResponse {
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| {
            self.status
                .as_ref()
                .and_then(|s| s.error_message.as_deref())
        })
    }
}

/// Errors returned by the CoinGecko client
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 429 Too Many Requests
    #[error("Rate Limited. Retry after {} s", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other non-2xx responses
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Body was not the expected JSON array
    #[error("Deserialization Error: {0}")]
    Deserialization(String),
}

fn retry_hint(secs: &Option<u64>) -> String {
    secs.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string())
}
