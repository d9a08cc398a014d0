use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{PricePoint, ProfileQuote};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// Hitting this host hands out the session cookie the crumb endpoint wants.
const COOKIE_URL: &str = "https://fc.yahoo.com";
const QUOTE_MODULES: &str = "price,summaryDetail,assetProfile,financialData,calendarEvents";

/// Yahoo Finance provider - quoteSummary for profile fields, chart API for closes.
///
/// No API key required, but quoteSummary needs a cookie + crumb pair. The crumb
/// is fetched lazily and reused until Yahoo answers 401.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: Url,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, MarketDataError> {
        let base_url =
            Url::parse(base_url).map_err(|e| MarketDataError::InvalidUrl(format!("{}: {}", base_url, e)))?;


        let mut builder = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; StockTracker/0.1)")
            .cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            crumb: Mutex::new(None),
        })
    }

    /// Appends `segments` to the base URL path. Each segment is percent-encoded
    /// on its own, so a ticker can never add path levels, a query or a fragment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, MarketDataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MarketDataError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn crumb(&self) -> Result<String, MarketDataError> {
        let mut slot = self.crumb.lock().await;
        if let Some(crumb) = slot.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie host answers 404 but still sets the cookie.
        if let Err(e) = self.client.get(COOKIE_URL).send().await {
            warn!("Cookie request to {} failed: {}", COOKIE_URL, e);
        }

        let resp = self
            .client
            .get(self.endpoint(&["v1", "test", "getcrumb"])?)
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(MarketDataError::BadResponse(format!("crumb request returned HTTP {}", resp.status())));
        }

        let crumb = resp
            .text()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?
            .trim()
            .to_string();
        if crumb.is_empty() {
            return Err(MarketDataError::BadResponse("empty crumb".into()));
        }

        debug!("Obtained Yahoo crumb");
        *slot = Some(crumb.clone());
        Ok(crumb)
    }

    async fn forget_crumb(&self) {
        *self.crumb.lock().await = None;
    }

    async fn request_quote_summary(
        &self,
        ticker: &str,
        crumb: &str,
    ) -> Result<reqwest::Response, MarketDataError> {
        self.client
            .get(self.endpoint(&["v10", "finance", "quoteSummary", ticker])?)
            .query(&[("modules", QUOTE_MODULES), ("crumb", crumb)])
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// quoteSummary wire format (only what we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetail>,
    asset_profile: Option<AssetProfile>,
    financial_data: Option<FinancialData>,
    calendar_events: Option<CalendarEvents>,
}

// Yahoo wraps numbers as {"raw": 1.23, "fmt": "1.23"} and sends {} when absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNumber {
    raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDate {
    fmt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    short_name: Option<String>,
    regular_market_price: Option<RawNumber>,
    regular_market_previous_close: Option<RawNumber>,
    regular_market_open: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetail {
    previous_close: Option<RawNumber>,
    open: Option<RawNumber>,
    fifty_two_week_high: Option<RawNumber>,
    fifty_two_week_low: Option<RawNumber>,
    dividend_rate: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialData {
    current_price: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CalendarEvents {
    earnings: Option<Earnings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Earnings {
    earnings_date: Vec<RawDate>,
}

fn raw(value: Option<RawNumber>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn into_quote(result: QuoteSummaryResult) -> ProfileQuote {
    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    // Earnings are announced as a date or a date range.
    let earnings_date = result
        .calendar_events
        .and_then(|c| c.earnings)
        .map(|e| {
            e.earnings_date
                .into_iter()
                .filter_map(|d| d.fmt)
                .collect::<Vec<_>>()
                .join(" - ")
        })
        .filter(|s| !s.is_empty());

    ProfileQuote {
        short_name: non_blank(price.short_name),
        current_price: raw(financial.current_price).or(raw(price.regular_market_price)),
        previous_close: raw(price.regular_market_previous_close).or(raw(detail.previous_close)),
        sector: non_blank(profile.sector),
        industry: non_blank(profile.industry),
        country: non_blank(profile.country),
        fifty_two_week_high: raw(detail.fifty_two_week_high),
        fifty_two_week_low: raw(detail.fifty_two_week_low),
        dividend_rate: raw(detail.dividend_rate),
        earnings_date,
        market_open: raw(price.regular_market_open).or(raw(detail.open)),
    }
}

fn parse_quote_summary(body: QuoteSummaryResponse) -> Result<Option<ProfileQuote>, MarketDataError> {
    if let Some(error) = body.quote_summary.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Ok(None);
        }
        return Err(MarketDataError::BadResponse(format!("{}: {}", error.code, error.description)));
    }

    Ok(body
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .map(into_quote))
}

// ---------------------------------------------------------------------------
// chart wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

fn parse_chart(body: ChartResponse) -> Result<Vec<PricePoint>, MarketDataError> {
    if let Some(error) = body.chart.error {
        if error.description.contains("No data found") || error.code.eq_ignore_ascii_case("Not Found") {
            return Err(MarketDataError::NotFound);
        }
        return Err(MarketDataError::BadResponse(error.description));
    }

    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or(MarketDataError::NotFound)?;

    let closes = &result
        .indicators
        .quote
        .first()
        .ok_or_else(|| MarketDataError::BadResponse("No quote data in response".into()))?
        .close;

    if result.timestamp.len() != closes.len() {
        return Err(MarketDataError::Parse(
            "Timestamp and close price arrays have different lengths".into(),
        ));
    }

    let mut points = Vec::with_capacity(closes.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        // Null closes show up on market holidays.
        let Some(close) = *close else { continue };

        let date = DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| MarketDataError::Parse(format!("bad timestamp {}", ts)))?
            .date_naive();
        points.push(PricePoint { date, close });
    }

    points.sort_by_key(|p| p.date);
    Ok(points)
}

fn range_for_days(days: u32) -> &'static str {
    match days {
        0..=5 => "5d",
        6..=30 => "1mo",
        31..=90 => "3mo",
        91..=180 => "6mo",
        181..=365 => "1y",
        366..=730 => "2y",
        _ => "5y",
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_profile(&self, ticker: &str) -> Result<Option<ProfileQuote>, MarketDataError> {
        let crumb = self.crumb().await?;
        let mut resp = self.request_quote_summary(ticker, &crumb).await?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            info!("Yahoo rejected crumb while fetching {}, refreshing", ticker);
            self.forget_crumb().await;
            let crumb = self.crumb().await?;
            resp = self.request_quote_summary(ticker, &crumb).await?;
        }

        match resp.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(MarketDataError::RateLimited),
            reqwest::StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                return Err(MarketDataError::BadResponse(format!("HTTP {}", status)))
            }
            _ => {}
        }

        let body: QuoteSummaryResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        parse_quote_summary(body)
    }

    async fn fetch_daily_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let resp = self
            .client
            .get(self.endpoint(&["v8", "finance", "chart", ticker])?)
            .query(&[("interval", "1d"), ("range", range_for_days(days))])
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        match resp.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(MarketDataError::RateLimited),
            reqwest::StatusCode::NOT_FOUND => return Err(MarketDataError::NotFound),
            status if !status.is_success() => {
                return Err(MarketDataError::BadResponse(format!("HTTP {}", status)))
            }
            _ => {}
        }

        let body: ChartResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        parse_chart(body)
    }
}
