//! Read-only position reporting, enriched with best-effort live prices.

use crate::db::{LedgerError, Repository};
use crate::domain::{Decimal, Position, Symbol};
use crate::exchange::MarketData;
use std::sync::Arc;
use tracing::warn;

/// An open position with its live price, when one could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionReport {
    pub symbol: Symbol,
    pub qty: Decimal,
    pub avg_price: Decimal,
    /// None when the price fetch failed for this symbol.
    pub current_price: Option<Decimal>,
}

/// Query facade over the ledger. Only reads; the ledger owns all mutation.
#[derive(Clone)]
pub struct Reporter {
    market: Arc<dyn MarketData>,
    repo: Arc<Repository>,
}

impl Reporter {
    pub fn new(market: Arc<dyn MarketData>, repo: Arc<Repository>) -> Self {
        Self { market, repo }
    }

    /// Describe all open positions.
    ///
    /// A failed price fetch for one symbol downgrades that entry to
    /// `current_price: None` rather than failing the whole call, so one bad
    /// symbol cannot block reporting on the rest.
    pub async fn describe_positions(&self) -> Result<Vec<PositionReport>, LedgerError> {
        let positions = self.repo.list_open_positions().await?;

        let mut reports = Vec::with_capacity(positions.len());
        for position in positions {
            let current_price = match self.market.fetch_price(position.symbol.as_str()).await {
                Ok(price) => Some(price),
                Err(e) => {
                    warn!(symbol = %position.symbol, error = %e, "live price unavailable");
                    None
                }
            };
            reports.push(report_for(position, current_price));
        }

        Ok(reports)
    }
}

fn report_for(position: Position, current_price: Option<Decimal>) -> PositionReport {
    PositionReport {
        symbol: position.symbol,
        qty: position.qty,
        avg_price: position.avg_price,
        current_price,
    }
}
