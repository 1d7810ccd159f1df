//! Position type: the per-symbol aggregate derived from the trade log.

use crate::domain::{Decimal, Symbol};
use serde::{Deserialize, Serialize};

/// Net open position for a symbol.
///
/// Owned exclusively by the ledger; readers only observe it. A position with
/// zero quantity is considered closed but is kept on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument symbol (unique key).
    pub symbol: Symbol,
    /// Net open quantity. Positive = open, zero = closed. May go negative
    /// under the permissive oversell policy.
    pub qty: Decimal,
    /// Volume-weighted cost basis of the open quantity.
    pub avg_price: Decimal,
}

impl Position {
    /// A fresh, flat position for a symbol.
    pub fn flat(symbol: Symbol) -> Self {
        Position {
            symbol,
            qty: Decimal::zero(),
            avg_price: Decimal::zero(),
        }
    }

    /// Returns true if the position holds an open (positive) quantity.
    pub fn is_open(&self) -> bool {
        self.qty.is_positive()
    }
}
