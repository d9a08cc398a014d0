use tracing::info;

use crate::domain::parse_tickers;
use crate::errors::AppError;
use crate::external::market_data::MarketDataProvider;
use crate::models::{ChartSpec, ReportBundle};
use crate::services::market_data_service::{fetch_stock, StockData};

/// Parses `raw`, fetches every ticker in order and builds the report.
///
/// Tickers are fetched one after another. The first ticker that fails aborts
/// the whole report and later tickers are never requested.
pub async fn generate_report(
    provider: &dyn MarketDataProvider,
    raw: Option<&str>,
    history_days: u32,
) -> Result<ReportBundle, AppError> {
    let tickers = parse_tickers(raw)?;
    info!("Ticker list: {:?}", tickers);

    let mut fetched = Vec::with_capacity(tickers.len());
    for ticker in &tickers {
        fetched.push(fetch_stock(provider, ticker, history_days).await?);
    }

    let report = build_report(fetched);
    info!(
        "Built report with {} rows and {} charts",
        report.rows.len(),
        report.charts.len()
    );
    Ok(report)
}

/// One row and one chart per input, in input order.
pub fn build_report(items: Vec<StockData>) -> ReportBundle {
    let mut rows = Vec::with_capacity(items.len());
    let mut charts = Vec::with_capacity(items.len());

    for StockData { profile, history } in items {
        charts.push(ChartSpec::for_profile(&profile, &history));
        rows.push(profile);
    }

    ReportBundle { rows, charts }
}
