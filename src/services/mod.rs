pub mod export_cache;
pub mod export_service;
pub mod market_data_service;
pub mod report_service;
