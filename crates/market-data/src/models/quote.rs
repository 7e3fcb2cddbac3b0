use chrono::{DateTime, Utc};
use serde::Serialize;

/// A resolved market quote.
///
/// Carries the current price together with the provider's raw response
/// body, so callers can inspect fields the resolver does not interpret.
#[derive(Clone, Debug, Serialize)]
pub struct Quote {
    /// Current price. Providers only emit finite, positive values.
    pub price: f64,

    /// Quote timestamp, when the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Source of the quote (FINNHUB, YAHOO_EOD)
    pub source: String,

    /// Raw provider response body.
    pub raw: serde_json::Value,
}

impl Quote {
    /// Create a quote with no timestamp and an empty raw body.
    pub fn new(price: f64, source: impl Into<String>) -> Self {
        Self {
            price,
            timestamp: None,
            source: source.into(),
            raw: serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new(150.25, "FINNHUB");
        assert_eq!(quote.price, 150.25);
        assert_eq!(quote.source, "FINNHUB");
        assert!(quote.timestamp.is_none());
        assert!(quote.raw.is_null());
    }
}
