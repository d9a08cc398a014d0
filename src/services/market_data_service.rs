use tracing::{error, info, warn};

use crate::domain::TickerSymbol;
use crate::errors::AppError;
use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{PriceSeries, ProfileQuote, StockProfile};

/// Profile plus trailing history for one ticker.
#[derive(Debug, Clone)]
pub struct StockData {
    pub profile: StockProfile,
    pub history: PriceSeries,
}

/// Fetches profile and history for `ticker`.
///
/// A profile without a display name is requested exactly once more. Any
/// provider failure, or a profile still missing after the retry, becomes
/// [`AppError::DataUnavailable`] for this ticker.
pub async fn fetch_stock(
    provider: &dyn MarketDataProvider,
    ticker: &TickerSymbol,
    history_days: u32,
) -> Result<StockData, AppError> {
    fetch_from_provider(provider, ticker, history_days)
        .await
        .map_err(|e| {
            error!("✗ Error with ticker {}: {}", ticker, e);
            AppError::DataUnavailable(ticker.to_string())
        })
}

async fn fetch_from_provider(
    provider: &dyn MarketDataProvider,
    ticker: &TickerSymbol,
    history_days: u32,
) -> Result<StockData, MarketDataError> {
    let quote = match fetch_usable_profile(provider, ticker).await? {
        Some(quote) => quote,
        None => {
            warn!("Retrying ticker: {}", ticker);
            fetch_usable_profile(provider, ticker)
                .await?
                .ok_or(MarketDataError::NotFound)?
        }
    };

    let profile = StockProfile::from_quote(ticker.clone(), quote);

    let points = provider
        .fetch_daily_history(ticker.as_str(), history_days)
        .await?;
    let history = PriceSeries::from_points(points);
    if history.is_empty() {
        warn!("No daily closes returned for {}", ticker);
    }

    info!(
        "✓ Fetched {} ({}) with {} daily closes",
        ticker,
        profile.display_name(),
        history.len()
    );

    Ok(StockData { profile, history })
}

async fn fetch_usable_profile(
    provider: &dyn MarketDataProvider,
    ticker: &TickerSymbol,
) -> Result<Option<ProfileQuote>, MarketDataError> {
    let quote = provider.fetch_profile(ticker.as_str()).await?;
    Ok(quote.filter(ProfileQuote::has_display_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::{FieldValue, PricePoint};

    /// Hands out queued profile responses in order, repeating the last one.
    struct ScriptedProvider {
        profiles: Mutex<VecDeque<Option<ProfileQuote>>>,
        profile_calls: AtomicUsize,
        history_calls: AtomicUsize,
        history_fails: bool,
    }

    impl ScriptedProvider {
        fn new(profiles: Vec<Option<ProfileQuote>>) -> Self {
            Self {
                profiles: Mutex::new(profiles.into()),
                profile_calls: AtomicUsize::new(0),
                history_calls: AtomicUsize::new(0),
                history_fails: false,
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for ScriptedProvider {
        async fn fetch_profile(&self, _ticker: &str) -> Result<Option<ProfileQuote>, MarketDataError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            let mut queue = self.profiles.lock();
            let next = if queue.len() > 1 {
                queue.pop_front().flatten()
            } else {
                queue.front().cloned().flatten()
            };
            Ok(next)
        }

        async fn fetch_daily_history(
            &self,
            _ticker: &str,
            _days: u32,
        ) -> Result<Vec<PricePoint>, MarketDataError> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            if self.history_fails {
                return Err(MarketDataError::Network("connection reset".into()));
            }
            Ok(vec![
                PricePoint { date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), close: 184.25 },
                PricePoint { date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), close: 185.64 },
            ])
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl MarketDataProvider for FailingProvider {
        async fn fetch_profile(&self, _ticker: &str) -> Result<Option<ProfileQuote>, MarketDataError> {
            Err(MarketDataError::RateLimited)
        }

        async fn fetch_daily_history(
            &self,
            _ticker: &str,
            _days: u32,
        ) -> Result<Vec<PricePoint>, MarketDataError> {
            Err(MarketDataError::RateLimited)
        }
    }

    fn named(name: &str) -> ProfileQuote {
        ProfileQuote {
            short_name: Some(name.to_string()),
            current_price: Some(189.84),
            ..Default::default()
        }
    }

    fn ticker(raw: &str) -> TickerSymbol {
        TickerSymbol::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_first_valid_profile_needs_no_retry() {
        let provider = ScriptedProvider::new(vec![Some(named("Apple Inc."))]);

        let data = fetch_stock(&provider, &ticker("AAPL"), 365).await.unwrap();

        assert_eq!(provider.profile_calls.load(Ordering::SeqCst), 1);
        assert_eq!(data.profile.name, FieldValue::Text("Apple Inc.".into()));
        assert_eq!(data.history.len(), 2);
        // history comes back ascending regardless of provider order
        assert_eq!(data.history.points()[0].close, 185.64);
    }

    #[tokio::test]
    async fn test_retry_returns_second_profile() {
        let nameless = ProfileQuote {
            current_price: Some(1.0),
            ..Default::default()
        };
        let provider = ScriptedProvider::new(vec![Some(nameless), Some(named("Apple Inc."))]);

        let data = fetch_stock(&provider, &ticker("AAPL"), 365).await.unwrap();

        assert_eq!(provider.profile_calls.load(Ordering::SeqCst), 2);
        assert_eq!(data.profile.ticker.as_str(), "AAPL");
        assert_eq!(data.profile.name, FieldValue::Text("Apple Inc.".into()));
        assert_eq!(data.profile.current_price, FieldValue::Number(189.84));
    }

    #[tokio::test]
    async fn test_empty_response_is_retried() {
        let provider = ScriptedProvider::new(vec![None, Some(named("Apple Inc."))]);

        assert!(fetch_stock(&provider, &ticker("AAPL"), 365).await.is_ok());
        assert_eq!(provider.profile_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_exactly_two_attempts() {
        let provider = ScriptedProvider::new(vec![Some(ProfileQuote::default())]);

        let err = fetch_stock(&provider, &ticker("ZZZZ"), 365).await.unwrap_err();

        assert!(matches!(err, AppError::DataUnavailable(ref t) if t == "ZZZZ"));
        assert_eq!(provider.profile_calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.history_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_history_failure_is_data_unavailable() {
        let mut provider = ScriptedProvider::new(vec![Some(named("Apple Inc."))]);
        provider.history_fails = true;

        let err = fetch_stock(&provider, &ticker("AAPL"), 365).await.unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(ref t) if t == "AAPL"));
    }

    #[tokio::test]
    async fn test_provider_error_is_data_unavailable() {
        let err = fetch_stock(&FailingProvider, &ticker("TSLA"), 365).await.unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(ref t) if t == "TSLA"));
    }
}
