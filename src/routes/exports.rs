use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http::header;
use tracing::{error, info};
use uuid::Uuid;

use super::{first_param, QueryPairs};
use crate::errors::AppError;
use crate::models::ReportTable;
use crate::services::export_service::{self, CSV_FILENAME, EXCEL_FILENAME};
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/download_excel", get(download_excel))
        .route("/download_csv", get(download_csv))
}

fn resolve_table(state: &AppState, report: Option<&str>) -> Result<ReportTable, AppError> {
    let id = report
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidReportId(raw.to_string()))
        })
        .transpose()?;

    let table = state.export_cache.retrieve(id)?;
    info!("Exporting report generated at {}", table.generated_at);
    Ok(table)
}

fn attachment(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /download_excel[?report=<id>]
///
/// Without a report id the most recent report is exported.
pub async fn download_excel(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Response, AppError> {
    let report = first_param(&params, "report");
    info!("GET /download_excel - report {:?}", report);

    let table = resolve_table(&state, report.as_deref())?;
    let bytes = export_service::to_xlsx(&table).map_err(|e| {
        error!("Error generating Excel file: {}", e);
        e
    })?;

    Ok(attachment(bytes, XLSX_CONTENT_TYPE, EXCEL_FILENAME))
}

/// GET /download_csv[?report=<id>]
pub async fn download_csv(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Response, AppError> {
    let report = first_param(&params, "report");
    info!("GET /download_csv - report {:?}", report);

    let table = resolve_table(&state, report.as_deref())?;
    let bytes = export_service::to_csv(&table).map_err(|e| {
        error!("Error generating CSV file: {}", e);
        e
    })?;

    Ok(attachment(bytes, CSV_CONTENT_TYPE, CSV_FILENAME))
}
