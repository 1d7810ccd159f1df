//! Domain primitives: TimeMs, Symbol, Category, Side.

use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time in milliseconds.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// Instrument symbol (e.g., "BTCUSDT").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a Symbol from a string.
    pub fn new(symbol: String) -> Self {
        Symbol(symbol)
    }

    /// Get the symbol as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange market segment (e.g., "spot", "linear").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category(pub String);

impl Category {
    /// Create a Category from a string.
    pub fn new(category: String) -> Self {
        Category(category)
    }

    /// The spot market segment.
    pub fn spot() -> Self {
        Category("spot".to_string())
    }

    /// The linear futures market segment.
    pub fn linear() -> Self {
        Category("linear".to_string())
    }

    /// Get the category as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade side: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy side (acquires the asset).
    Buy,
    /// Sell side (disposes of the asset).
    Sell,
}

impl Side {
    /// Parse an exchange-supplied side string, normalizing casing.
    ///
    /// The exchange nominally sends "Buy"/"Sell" but casing has varied across
    /// API versions, so any casing of the two words is accepted.
    pub fn parse_exchange(s: &str) -> Option<Side> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parse_exchange_normalizes_casing() {
        assert_eq!(Side::parse_exchange("Buy"), Some(Side::Buy));
        assert_eq!(Side::parse_exchange("BUY"), Some(Side::Buy));
        assert_eq!(Side::parse_exchange("sell"), Some(Side::Sell));
        assert_eq!(Side::parse_exchange("SELL"), Some(Side::Sell));
        assert_eq!(Side::parse_exchange("hold"), None);
        assert_eq!(Side::parse_exchange(""), None);
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Buy.to_string(), "Buy");
        assert_eq!(Side::Sell.to_string(), "Sell");
    }

    #[test]
    fn test_symbol_display() {
        let symbol = Symbol::new("BTCUSDT".to_string());
        assert_eq!(symbol.to_string(), "BTCUSDT");
    }

    #[test]
    fn test_category_constructors() {
        assert_eq!(Category::spot().as_str(), "spot");
        assert_eq!(Category::linear().as_str(), "linear");
    }

    #[test]
    fn test_timems_ordering() {
        let t1 = TimeMs::new(1000);
        let t2 = TimeMs::new(2000);
        assert!(t1 < t2);
    }
}
