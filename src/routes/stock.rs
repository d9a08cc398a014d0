use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tracing::{info, warn};

use super::{first_param, QueryPairs};
use crate::errors::AppError;
use crate::services;
use crate::state::AppState;
use crate::views;

pub fn router() -> Router<AppState> {
    Router::new().route("/stock", get(get_stock))
}

/// GET /stock?ticker=AAPL,MSFT
///
/// The export cache is only written once every ticker has been fetched.
pub async fn get_stock(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Html<String>, AppError> {
    let ticker = first_param(&params, "ticker");
    info!("GET /stock - Tickers received: {:?}", ticker);

    let report = services::report_service::generate_report(
        state.market_data.as_ref(),
        ticker.as_deref(),
        state.history_days,
    )
    .await
    .map_err(|e| {
        warn!("Stock lookup failed: {}", e);
        e
    })?;

    let report_id = state.export_cache.store(report.table());
    info!(
        "Stored report {} for export ({} cached)",
        report_id,
        state.export_cache.len()
    );

    Ok(Html(views::stock_page(&report, report_id)))
}
