use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No valid tickers provided")]
    InvalidInput,
    #[error("Unable to fetch data for ticker {0}")]
    DataUnavailable(String),
    #[error("No stock data available to export. Look up some tickers first")]
    NoDataAvailable,
    #[error("Report {0} is no longer available. Please run the lookup again")]
    ReportNotFound(Uuid),
    #[error("'{0}' is not a valid report id")]
    InvalidReportId(String),
    #[error("Unable to generate export file: {0}")]
    Export(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput | AppError::InvalidReportId(_) => StatusCode::BAD_REQUEST,
            AppError::DataUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::NoDataAvailable | AppError::ReportNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = format!(
            "Error: {}. <br> <a href='/'>Back to Home</a>",
            crate::views::escape(&self.to_string())
        );
        (self.status(), Html(body)).into_response()
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(value.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        AppError::Export(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_unavailable_names_the_ticker() {
        let err = AppError::DataUnavailable("MSFT".to_string());
        assert_eq!(err.to_string(), "Unable to fetch data for ticker MSFT");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn error_response_links_back_home() {
        let response = AppError::InvalidInput.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.starts_with("Error: No valid tickers provided."));
        assert!(body.contains("<a href='/'>Back to Home</a>"));
    }
}
