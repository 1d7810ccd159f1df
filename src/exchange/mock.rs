//! Mock market data for testing without network calls.

use super::{ExchangeError, MarketData};
use crate::domain::{Category, Decimal, Trade};
use async_trait::async_trait;
use std::collections::HashMap;

/// Mock market data returning predefined trades and prices.
///
/// Symbols without a configured price yield [`ExchangeError::NoPrice`], which
/// lets tests exercise the partial price-failure path.
#[derive(Debug, Clone, Default)]
pub struct MockMarketData {
    trades: HashMap<String, Vec<Trade>>,
    prices: HashMap<String, Decimal>,
    fail_trades: Option<String>,
    fail_prices: bool,
}

impl MockMarketData {
    /// Create a new mock with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add trades returned for a category.
    pub fn with_trades(mut self, category: &Category, trades: Vec<Trade>) -> Self {
        self.trades
            .entry(category.as_str().to_string())
            .or_default()
            .extend(trades);
        self
    }

    /// Set the price returned for a symbol.
    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    /// Make every `fetch_trades` call fail with a transport error.
    pub fn with_trades_failure(mut self, message: &str) -> Self {
        self.fail_trades = Some(message.to_string());
        self
    }

    /// Make every `fetch_price` call fail with a transport error.
    pub fn with_prices_failure(mut self) -> Self {
        self.fail_prices = true;
        self
    }
}

#[async_trait]
impl MarketData for MockMarketData {
    async fn fetch_trades(
        &self,
        category: &Category,
        limit: u32,
    ) -> Result<Vec<Trade>, ExchangeError> {
        if let Some(message) = &self.fail_trades {
            return Err(ExchangeError::Transport(message.clone()));
        }

        let mut trades = self
            .trades
            .get(category.as_str())
            .cloned()
            .unwrap_or_default();
        trades.truncate(limit as usize);
        Ok(trades)
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        if self.fail_prices {
            return Err(ExchangeError::Transport("mock transport failure".to_string()));
        }

        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| ExchangeError::NoPrice(symbol.to_string()))
    }
}
