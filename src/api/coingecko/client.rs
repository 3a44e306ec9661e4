use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{ApiError, ErrorResponse, MarketsQuery};
use crate::api::MarketDataSource;
use crate::models::CoinMarketRecord;

/// CoinGecko public API client
pub struct CoinGeckoClient {
    http_client: HttpClient,
    base_url: String,
    query: MarketsQuery,
}

impl CoinGeckoClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com/api/v3";

    /// Create a client against the public endpoint
    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self::with_http_client(base_url, HttpClient::new())
    }

    /// Create a client around an already configured reqwest client
    pub fn with_http_client(base_url: String, http_client: HttpClient) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            query: MarketsQuery::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Map a non-2xx response onto an ApiError
    async fn handle_error_response(response: reqwest::Response) -> ApiError {
        let status_code = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());
        let body_text = response.text().await.unwrap_or_default();

        // Prefer the API's own message when the body is JSON
        let message = serde_json::from_str::<ErrorResponse>(&body_text)
            .ok()
            .and_then(|e| e.message().map(str::to_string))
            .unwrap_or(body_text);

        match status_code {
            429 => {
                warn!("CoinGecko rate limited us (retry after {:?} s): {}", retry_after_secs, message);
                ApiError::RateLimited { retry_after_secs }
            }
            500..=599 => {
                warn!("CoinGecko server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    /// GET /coins/markets
    ///
    /// Returns the records in the order the API sent them.
    pub async fn get_coin_markets(
        &self,
        query: &MarketsQuery,
    ) -> Result<Vec<CoinMarketRecord>, ApiError> {
        let url = format!("{}/coins/markets", self.base_url);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .headers(Self::create_headers())
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let records = response
            .json::<Vec<CoinMarketRecord>>()
            .await
            .map_err(|e| ApiError::Deserialization(format!("Failed to parse response: {}", e)))?;

        debug!("Received {} market records", records.len());
        Ok(records)
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn fetch_markets(&self) -> Result<Vec<CoinMarketRecord>, ApiError> {
        self.get_coin_markets(&self.query).await
    }
}
