use axum::http::StatusCode;
use axum::response::Html;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::routes::{exports, pages, stock};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .merge(pages::router())
        .merge(stock::router())
        .merge(exports::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::NOT_FOUND,
        Html("Error: Page not found. <br> <a href='/'>Back to Home</a>"),
    )
}
