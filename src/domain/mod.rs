//! Domain types for the trade ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Symbol, Category, Side
//! - Trade (append-only execution fact) with a stable dedup key
//! - Position (derived per-symbol aggregate)

pub mod decimal;
pub mod position;
pub mod primitives;
pub mod trade;

pub use decimal::Decimal;
pub use position::Position;
pub use primitives::{Category, Side, Symbol, TimeMs};
pub use trade::Trade;
