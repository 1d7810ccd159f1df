//! Pure computation engine for position reconciliation.
//!
//! The ledger applies trades to per-symbol state through this module; it has
//! no I/O and is deterministic, so the accounting laws can be tested in
//! isolation from storage.

use crate::domain::{Decimal, Side, Trade};
use thiserror::Error;

/// How to treat a Sell that would drive the net quantity negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversellPolicy {
    /// Let quantity go negative, matching the original accounting behavior.
    #[default]
    Allow,
    /// Reject the trade; the ledger rolls back the whole ingest call.
    Reject,
}

/// Current reconciled state of a position for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionState {
    /// Net open quantity.
    pub qty: Decimal,
    /// Volume-weighted average entry price (only meaningful when qty != 0).
    pub avg_price: Decimal,
}

impl PositionState {
    pub fn new(qty: Decimal, avg_price: Decimal) -> Self {
        Self { qty, avg_price }
    }

    pub fn flat() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.qty.is_zero()
    }

    /// Apply one trade to this state.
    ///
    /// Buy folds the execution into the volume-weighted average:
    /// `new_avg = (qty*avg + trade_qty*trade_price) / new_qty`, defined as
    /// `trade_price` when the position was flat. Sell reduces quantity and
    /// leaves the average untouched.
    pub fn apply(&mut self, trade: &Trade, policy: OversellPolicy) -> Result<(), OversellError> {
        match trade.side {
            Side::Buy => {
                let new_qty = self.qty + trade.qty;
                self.avg_price = if self.qty.is_zero() {
                    trade.price
                } else if new_qty.is_zero() {
                    // Buying back to exactly flat from a negative quantity;
                    // keep the last average rather than divide by zero.
                    self.avg_price
                } else {
                    (self.qty * self.avg_price + trade.qty * trade.price) / new_qty
                };
                self.qty = new_qty;
            }
            Side::Sell => {
                let new_qty = self.qty - trade.qty;
                if policy == OversellPolicy::Reject && new_qty.is_negative() {
                    return Err(OversellError {
                        symbol: trade.symbol.as_str().to_string(),
                        held: self.qty,
                        sold: trade.qty,
                    });
                }
                self.qty = new_qty;
            }
        }
        Ok(())
    }
}

/// A Sell exceeded the held quantity under [`OversellPolicy::Reject`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("oversell on {symbol}: held {held}, sold {sold}")]
pub struct OversellError {
    pub symbol: String,
    pub held: Decimal,
    pub sold: Decimal,
}
