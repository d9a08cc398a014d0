mod app;
mod config;
mod domain;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;
mod views;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::{AppConfig, ProviderKind};
use crate::external::market_data::MarketDataProvider;
use crate::external::mock::MockProvider;
use crate::external::yahoo::YahooProvider;
use crate::logging::{init_logging, LoggingConfig};
use crate::services::export_cache::ExportCache;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    let logging = LoggingConfig::from_env().context("Invalid logging configuration")?;
    init_logging(&logging)?;

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let market_data: Arc<dyn MarketDataProvider> = match config.provider {
        ProviderKind::Yahoo => {
            tracing::info!("📊 Using market data provider: Yahoo Finance ({})", config.yahoo_base_url);
            Arc::new(
                YahooProvider::new(&config.yahoo_base_url, config.provider_timeout)
                    .context("Failed to create Yahoo Finance client")?,
            )
        }
        ProviderKind::Mock => {
            tracing::info!(
                "📊 Using market data provider: offline mock data (unavailable: {:?})",
                config.mock_unavailable_tickers
            );
            Arc::new(MockProvider::with_unavailable(
                config.mock_unavailable_tickers.iter().cloned(),
            ))
        }
    };

    let state = AppState {
        market_data,
        export_cache: ExportCache::new(config.export_cache_capacity),
        history_days: config.history_days,
    };
    let app = app::create_app(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Stock tracker running at http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
