use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::TickerSymbol;

/// Marker rendered in place of any field the provider did not return.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column headers of the summary table, in display and export order.
pub const PROFILE_COLUMNS: [&str; 12] = [
    "Ticker",
    "Name",
    "Current Price",
    "Previous Close",
    "Sector",
    "Industry",
    "Country",
    "52-Week High",
    "52-Week Low",
    "Dividend Rate",
    "Earnings Date",
    "Market Open",
];

/// Profile and quote fields exactly as the provider reported them.
///
/// Every field is optional here; [`StockProfile::from_quote`] is where a
/// missing field turns into [`FieldValue::NotAvailable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileQuote {
    pub short_name: Option<String>,
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub earnings_date: Option<String>,
    pub market_open: Option<f64>,
}

impl ProfileQuote {
    /// A quote is usable only when it carries a display name.
    pub fn has_display_name(&self) -> bool {
        self.short_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    NotAvailable,
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FieldValue::NotAvailable, FieldValue::Number)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::NotAvailable, FieldValue::Text)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct StockProfile {
    pub ticker: TickerSymbol,
    pub name: FieldValue,
    pub current_price: FieldValue,
    pub previous_close: FieldValue,
    pub sector: FieldValue,
    pub industry: FieldValue,
    pub country: FieldValue,
    pub fifty_two_week_high: FieldValue,
    pub fifty_two_week_low: FieldValue,
    pub dividend_rate: FieldValue,
    pub earnings_date: FieldValue,
    pub market_open: FieldValue,
}

impl StockProfile {
    pub fn from_quote(ticker: TickerSymbol, quote: ProfileQuote) -> Self {
        Self {
            ticker,
            name: quote.short_name.into(),
            current_price: quote.current_price.into(),
            previous_close: quote.previous_close.into(),
            sector: quote.sector.into(),
            industry: quote.industry.into(),
            country: quote.country.into(),
            fifty_two_week_high: quote.fifty_two_week_high.into(),
            fifty_two_week_low: quote.fifty_two_week_low.into(),
            dividend_rate: quote.dividend_rate.into(),
            earnings_date: quote.earnings_date.into(),
            market_open: quote.market_open.into(),
        }
    }

    pub fn display_name(&self) -> String {
        self.name.to_string()
    }

    /// Cells in [`PROFILE_COLUMNS`] order.
    pub fn cells(&self) -> [FieldValue; 12] {
        [
            FieldValue::Text(self.ticker.to_string()),
            self.name.clone(),
            self.current_price.clone(),
            self.previous_close.clone(),
            self.sector.clone(),
            self.industry.clone(),
            self.country.clone(),
            self.fifty_two_week_high.clone(),
            self.fifty_two_week_low.clone(),
            self.dividend_rate.clone(),
            self.earnings_date.clone(),
            self.market_open.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(raw: &str) -> TickerSymbol {
        TickerSymbol::parse(raw).unwrap()
    }

    #[test]
    fn test_missing_fields_become_not_available() {
        let quote = ProfileQuote {
            short_name: Some("Apple Inc.".to_string()),
            current_price: Some(189.84),
            ..Default::default()
        };

        let profile = StockProfile::from_quote(ticker("AAPL"), quote);
        let cells = profile.cells();

        assert_eq!(cells.len(), PROFILE_COLUMNS.len());
        assert_eq!(cells[0], FieldValue::Text("AAPL".to_string()));
        assert_eq!(cells[1], FieldValue::Text("Apple Inc.".to_string()));
        assert_eq!(cells[2], FieldValue::Number(189.84));
        for cell in &cells[3..] {
            assert_eq!(*cell, FieldValue::NotAvailable);
        }
    }

    #[test]
    fn test_numbers_pass_through_unrounded() {
        let quote = ProfileQuote {
            short_name: Some("Tiny Corp".to_string()),
            dividend_rate: Some(0.123456789),
            ..Default::default()
        };
        let profile = StockProfile::from_quote(ticker("tiny"), quote);
        assert_eq!(profile.dividend_rate.to_string(), "0.123456789");
        assert_eq!(profile.sector.to_string(), "N/A");
    }

    #[test]
    fn test_display_name_requirement() {
        assert!(!ProfileQuote::default().has_display_name());
        assert!(!ProfileQuote {
            short_name: Some("  ".to_string()),
            ..Default::default()
        }
        .has_display_name());
        assert!(ProfileQuote {
            short_name: Some("Microsoft Corporation".to_string()),
            ..Default::default()
        }
        .has_display_name());
    }
}
