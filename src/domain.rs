use std::fmt;

use serde::Serialize;

use crate::errors::AppError;

// A normalized ticker: trimmed, uppercased and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Normalizes a single token. Returns `None` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a comma-separated ticker string into normalized symbols.
///
/// Order is preserved and duplicates are kept, so `"aapl, AAPL"` yields two
/// entries. An absent, empty or all-blank input is rejected with
/// [`AppError::InvalidInput`].
pub fn parse_tickers(raw: Option<&str>) -> Result<Vec<TickerSymbol>, AppError> {
    let tickers: Vec<TickerSymbol> = raw
        .unwrap_or_default()
        .split(',')
        .filter_map(TickerSymbol::parse)
        .collect();

    if tickers.is_empty() {
        return Err(AppError::InvalidInput);
    }
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(raw: &str) -> Vec<String> {
        parse_tickers(Some(raw))
            .unwrap()
            .into_iter()
            .map(|t| t.to_string())
            .collect()
    }

    #[test]
    fn test_trims_and_uppercases_in_order() {
        assert_eq!(symbols(" aapl ,msft,  goog"), vec!["AAPL", "MSFT", "GOOG"]);
    }

    #[test]
    fn test_keeps_duplicates() {
        assert_eq!(symbols("aapl, AAPL ,msft"), vec!["AAPL", "AAPL", "MSFT"]);
    }

    #[test]
    fn test_drops_empty_tokens() {
        assert_eq!(symbols(",, tsla ,, ,nvda,"), vec!["TSLA", "NVDA"]);
    }

    #[test]
    fn test_single_symbol_with_suffix() {
        assert_eq!(symbols("ry.to"), vec!["RY.TO"]);
    }

    #[test]
    fn test_blank_input_is_invalid() {
        for raw in ["", "   ", ",", " , ,\t,"] {
            assert!(
                matches!(parse_tickers(Some(raw)), Err(AppError::InvalidInput)),
                "expected InvalidInput for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_missing_input_is_invalid() {
        assert!(matches!(parse_tickers(None), Err(AppError::InvalidInput)));
    }

    #[test]
    fn test_symbol_parse_rejects_whitespace() {
        assert!(TickerSymbol::parse(" \n ").is_none());
        assert_eq!(TickerSymbol::parse(" ibm ").unwrap().as_str(), "IBM");
    }
}
