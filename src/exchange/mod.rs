//! Exchange access: request signing, the market-data trait, and the Bybit client.

use crate::domain::{Category, Decimal, Trade};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod bybit;
pub mod mock;
pub mod sign;

pub use bybit::BybitClient;
pub use mock::MockMarketData;
pub use sign::{Credentials, Method, SignError, SignedRequest, Signer};

/// Market-data access needed by the sync and reporting paths.
///
/// Implementations perform network I/O only; no local state mutation and no
/// internal retries. The caller owns retry policy and cancellation: dropping
/// the future aborts the in-flight request.
#[async_trait]
pub trait MarketData: Send + Sync + fmt::Debug {
    /// Fetch one bounded page of recent trade executions for a market
    /// category, newest first as the exchange returns them.
    ///
    /// Pagination cursors are a non-goal; at most `limit` executions are
    /// returned and older history is never walked.
    async fn fetch_trades(
        &self,
        category: &Category,
        limit: u32,
    ) -> Result<Vec<Trade>, ExchangeError>;

    /// Fetch the current spot price for a symbol from the public ticker
    /// endpoint.
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;
}

/// Error taxonomy for exchange operations.
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    /// Request signing failed.
    #[error("signing error: {0}")]
    Signing(String),
    /// Network failure, timeout, or caller cancellation.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status from the exchange.
    #[error("http error: status {status}")]
    Http { status: u16 },
    /// The exchange envelope carried a non-zero retCode.
    #[error("exchange error {code}: {message}")]
    Api { code: i64, message: String },
    /// Response JSON did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// Ticker endpoint returned an empty result list for the symbol.
    #[error("no price available for {0}")]
    NoPrice(String),
}

impl From<SignError> for ExchangeError {
    fn from(err: SignError) -> Self {
        ExchangeError::Signing(err.to_string())
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::Transport(err.to_string())
    }
}
