//! Trade type representing a single exchange execution.

use crate::domain::{Category, Decimal, Side, Symbol, TimeMs};
use serde::{Deserialize, Serialize};

/// A single trade execution, as reported by the exchange.
///
/// Trades are append-only facts: created once per execution, persisted exactly
/// once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Stable unique identifier for this execution, used for deduplication.
    pub exec_key: String,
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Market segment the execution happened in.
    pub category: Category,
    /// Trade side (Buy or Sell).
    pub side: Side,
    /// Executed quantity.
    pub qty: Decimal,
    /// Execution price per unit.
    pub price: Decimal,
    /// Execution time in milliseconds since Unix epoch.
    pub exec_time_ms: TimeMs,
    /// Exchange-assigned execution ID, when the exchange provided one.
    pub exec_id: Option<String>,
}

impl Trade {
    /// Create a new Trade, computing its dedup key.
    pub fn new(
        symbol: Symbol,
        category: Category,
        side: Side,
        qty: Decimal,
        price: Decimal,
        exec_time_ms: TimeMs,
        exec_id: Option<String>,
    ) -> Self {
        let exec_key = Self::compute_exec_key(
            &symbol,
            &category,
            side,
            &qty,
            &price,
            exec_time_ms,
            exec_id.as_deref(),
        );
        Trade {
            exec_key,
            symbol,
            category,
            side,
            qty,
            price,
            exec_time_ms,
            exec_id,
        }
    }

    /// Generate a stable unique key for this execution.
    ///
    /// Priority: exchange `exec_id` (if present) > hash of deterministic fields.
    pub fn compute_exec_key(
        symbol: &Symbol,
        category: &Category,
        side: Side,
        qty: &Decimal,
        price: &Decimal,
        exec_time_ms: TimeMs,
        exec_id: Option<&str>,
    ) -> String {
        if let Some(exec_id) = exec_id {
            return format!("exec:{}", exec_id);
        }

        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(symbol.as_str());
        hasher.update(category.as_str());
        hasher.update(if side == Side::Buy { b"B" } else { b"S" });
        hasher.update(qty.to_canonical_string());
        hasher.update(price.to_canonical_string());
        hasher.update(exec_time_ms.as_i64().to_le_bytes());
        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    /// Borrow the precomputed dedup key.
    pub fn exec_key(&self) -> &str {
        &self.exec_key
    }
}
