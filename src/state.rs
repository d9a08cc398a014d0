use std::sync::Arc;

use crate::external::market_data::MarketDataProvider;
use crate::services::export_cache::ExportCache;

#[derive(Clone)]
pub struct AppState {
    pub market_data: Arc<dyn MarketDataProvider>,
    pub export_cache: ExportCache,
    pub history_days: u32,
}
