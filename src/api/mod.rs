use async_trait::async_trait;

use crate::models::CoinMarketRecord;

pub mod coingecko;

pub use coingecko::{ApiError, CoinGeckoClient};

/// Anything the chart card can pull market records from
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_markets(&self) -> Result<Vec<CoinMarketRecord>, ApiError>;
}
