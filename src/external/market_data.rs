use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PricePoint, ProfileQuote};

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("ticker not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Profile and quote fields for `ticker`.
    ///
    /// `Ok(None)` means the provider answered but had nothing for the symbol.
    async fn fetch_profile(&self, ticker: &str) -> Result<Option<ProfileQuote>, MarketDataError>;

    /// Daily closes covering the trailing `days`, ascending by date.
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, MarketDataError>;
}
