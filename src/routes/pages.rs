use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::state::AppState;
use crate::views;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/health", get(health))
}

async fn home() -> Html<String> {
    info!("GET / - Home page");
    Html(views::home_page())
}

async fn about() -> Html<String> {
    info!("GET /about - About page");
    Html(views::about_page())
}

async fn health() -> &'static str {
    "OK"
}
