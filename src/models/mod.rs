mod price_point;
mod report;
mod stock_profile;

pub use price_point::{PricePoint, PriceSeries};
pub use report::{ChartSpec, ReportBundle, ReportTable};
pub use stock_profile::{FieldValue, ProfileQuote, StockProfile, PROFILE_COLUMNS};
