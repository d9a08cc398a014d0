pub(crate) mod exports;
pub(crate) mod pages;
pub(crate) mod stock;

/// Raw query pairs in request order. Repeated keys are kept, so a handler
/// reads the first value instead of rejecting the request.
pub(crate) type QueryPairs = Vec<(String, String)>;

pub(crate) fn first_param(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_param_takes_first_repeated_value() {
        let query = pairs(&[("ticker", "AAPL"), ("other", "x"), ("ticker", "MSFT")]);
        assert_eq!(first_param(&query, "ticker").as_deref(), Some("AAPL"));
        assert_eq!(first_param(&query, "report"), None);
    }
}
