use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{PricePoint, ProfileQuote};

const SECTORS: [(&str, &str); 4] = [
    ("Technology", "Software - Infrastructure"),
    ("Healthcare", "Drug Manufacturers - General"),
    ("Energy", "Oil & Gas Integrated"),
    ("Financial Services", "Banks - Diversified"),
];

/// Offline provider producing deterministic data per ticker.
///
/// The same ticker always yields the same profile and price walk, so pages
/// rendered against it are stable. Tickers registered with
/// [`MockProvider::with_unavailable`] report no data at all.
#[derive(Debug, Default, Clone)]
pub struct MockProvider {
    unavailable: HashSet<String>,
}

impl MockProvider {
    pub fn with_unavailable<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unavailable: tickers.into_iter().map(|t| t.into().to_uppercase()).collect(),
        }
    }

    fn rng_for(ticker: &str) -> StdRng {
        let mut hasher = DefaultHasher::new();
        ticker.hash(&mut hasher);
        StdRng::seed_from_u64(hasher.finish())
    }

    fn check_available(&self, ticker: &str) -> Result<(), MarketDataError> {
        if self.unavailable.contains(&ticker.to_uppercase()) {
            return Err(MarketDataError::NotFound);
        }
        Ok(())
    }

    fn price_walk(ticker: &str, today: NaiveDate, days: u32) -> Vec<PricePoint> {
        let mut rng = Self::rng_for(ticker);
        let mut current = rng.random_range(20.0..400.0_f64);
        let mut points = Vec::new();

        for offset in (0..days as i64).rev() {
            let date = today - Duration::days(offset);
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            current *= 1.0 + (rng.random::<f64>() - 0.5) * 0.04;
            points.push(PricePoint {
                date,
                close: (current * 100.0).round() / 100.0,
            });
        }

        points
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_profile(&self, ticker: &str) -> Result<Option<ProfileQuote>, MarketDataError> {
        if self.check_available(ticker).is_err() {
            return Ok(None);
        }

        let mut rng = Self::rng_for(ticker);
        let base = rng.random_range(20.0..400.0_f64);
        let round = |v: f64| (v * 100.0).round() / 100.0;
        let (sector, industry) = SECTORS[rng.random_range(0..SECTORS.len())];
        let pays_dividend = rng.random_bool(0.5);

        Ok(Some(ProfileQuote {
            short_name: Some(format!("{} Holdings Inc.", ticker)),
            current_price: Some(round(base)),
            previous_close: Some(round(base * 0.99)),
            sector: Some(sector.to_string()),
            industry: Some(industry.to_string()),
            country: Some("United States".to_string()),
            fifty_two_week_high: Some(round(base * 1.25)),
            fifty_two_week_low: Some(round(base * 0.7)),
            dividend_rate: pays_dividend.then(|| round(base * 0.01)),
            earnings_date: None,
            market_open: Some(round(base * 0.995)),
        }))
    }

    async fn fetch_daily_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        self.check_available(ticker)?;
        Ok(Self::price_walk(ticker, Utc::now().date_naive(), days))
    }
}
