//! Repository layer: the reconciliation ledger over SQLite.
//!
//! All writes go through [`Repository::ingest`], which appends to the trade
//! log and updates derived positions inside one transaction. There is exactly
//! one logical writer path, so no locking beyond the transaction is needed.

use crate::domain::{Category, Decimal, Position, Side, Symbol, TimeMs, Trade};
use crate::engine::{OversellError, OversellPolicy, PositionState};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use thiserror::Error;
use tracing::warn;

/// Ledger failure taxonomy.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Persistence failure; the surrounding transaction is rolled back.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    /// A trade carried non-positive quantity or price.
    #[error("validation error: {0}")]
    Validation(String),
    /// A Sell exceeded held quantity under [`OversellPolicy::Reject`].
    #[error(transparent)]
    Oversell(#[from] OversellError),
}

/// Result of one ingest call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestOutcome {
    /// Trades offered to the ledger.
    pub total: usize,
    /// Trades newly appended (duplicates by exec_key are skipped).
    pub new: usize,
}

/// Repository for trade-log and position operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Ingest a batch of trades transactionally.
    ///
    /// Either every trade is appended and every position update applied, or
    /// nothing is: any failure rolls the whole call back. Trades already in
    /// the log (same exec_key) are skipped without touching positions, which
    /// makes re-ingesting an identical batch a no-op.
    ///
    /// Trades are applied in the order given; callers should supply them
    /// chronologically. No cross-call ordering guarantee is made.
    pub async fn ingest(
        &self,
        trades: &[Trade],
        policy: OversellPolicy,
    ) -> Result<IngestOutcome, LedgerError> {
        if trades.is_empty() {
            return Ok(IngestOutcome::default());
        }

        let now_ms = TimeMs::now().as_i64();
        let mut outcome = IngestOutcome {
            total: trades.len(),
            new: 0,
        };

        let mut tx = self.pool.begin().await.map_err(LedgerError::Storage)?;

        for trade in trades {
            validate_trade(trade)?;

            let result = sqlx::query(
                r#"
                INSERT INTO trades (
                    exec_key, symbol, category, side, qty, price, exec_time_ms, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(exec_key) DO NOTHING
                "#,
            )
            .bind(trade.exec_key.as_str())
            .bind(trade.symbol.as_str())
            .bind(trade.category.as_str())
            .bind(trade.side.to_string())
            .bind(trade.qty.to_canonical_string())
            .bind(trade.price.to_canonical_string())
            .bind(trade.exec_time_ms.as_i64())
            .bind(now_ms)
            .execute(&mut *tx)
            .await
            .map_err(LedgerError::Storage)?;

            if result.rows_affected() == 0 {
                // Already in the log; the position reflects it.
                continue;
            }
            outcome.new += 1;

            let row = sqlx::query("SELECT qty, avg_price FROM positions WHERE symbol = ?")
                .bind(trade.symbol.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(LedgerError::Storage)?;

            let mut state = match row {
                Some(row) => PositionState::new(
                    parse_stored_decimal(row.get::<String, _>("qty"))?,
                    parse_stored_decimal(row.get::<String, _>("avg_price"))?,
                ),
                None => PositionState::flat(),
            };

            state.apply(trade, policy)?;

            sqlx::query(
                r#"
                INSERT INTO positions (symbol, qty, avg_price, updated_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(symbol) DO UPDATE SET
                    qty = excluded.qty,
                    avg_price = excluded.avg_price,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(trade.symbol.as_str())
            .bind(state.qty.to_canonical_string())
            .bind(state.avg_price.to_canonical_string())
            .bind(now_ms)
            .execute(&mut *tx)
            .await
            .map_err(LedgerError::Storage)?;
        }

        tx.commit().await.map_err(LedgerError::Storage)?;
        Ok(outcome)
    }

    /// All positions with quantity > 0, sorted by symbol.
    pub async fn list_open_positions(&self) -> Result<Vec<Position>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, qty, avg_price
            FROM positions
            ORDER BY symbol ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // Quantities are stored as canonical decimal strings, so the open
        // filter happens here rather than in SQL.
        Ok(rows
            .iter()
            .map(position_from_row)
            .filter(|p| p.is_open())
            .collect())
    }

    /// Fetch a single position by symbol, open or not.
    pub async fn get_position(&self, symbol: &Symbol) -> Result<Option<Position>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT symbol, qty, avg_price
            FROM positions
            WHERE symbol = ?
            "#,
        )
        .bind(symbol.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(position_from_row))
    }

    /// Number of trades in the log.
    pub async fn count_trades(&self) -> Result<i64, LedgerError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM trades")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Query the trade log for a symbol, oldest first.
    pub async fn query_trades(&self, symbol: &Symbol) -> Result<Vec<Trade>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT exec_key, symbol, category, side, qty, price, exec_time_ms
            FROM trades
            WHERE symbol = ?
            ORDER BY exec_time_ms ASC, exec_key ASC
            "#,
        )
        .bind(symbol.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let exec_key: String = row.get("exec_key");
                let side_str: String = row.get("side");
                let side = Side::parse_exchange(&side_str).unwrap_or_else(|| {
                    warn!(exec_key = %exec_key, side = %side_str, "unrecognized stored side, defaulting to Buy");
                    Side::Buy
                });
                let exec_id = exec_key.strip_prefix("exec:").map(|s| s.to_string());

                Trade {
                    exec_key,
                    symbol: Symbol::new(row.get("symbol")),
                    category: Category::new(row.get("category")),
                    side,
                    qty: lenient_decimal(row.get("qty")),
                    price: lenient_decimal(row.get("price")),
                    exec_time_ms: TimeMs::new(row.get("exec_time_ms")),
                    exec_id,
                }
            })
            .collect())
    }
}

fn validate_trade(trade: &Trade) -> Result<(), LedgerError> {
    if !trade.qty.is_positive() {
        return Err(LedgerError::Validation(format!(
            "trade {} has non-positive qty {}",
            trade.exec_key, trade.qty
        )));
    }
    if !trade.price.is_positive() {
        return Err(LedgerError::Validation(format!(
            "trade {} has non-positive price {}",
            trade.exec_key, trade.price
        )));
    }
    Ok(())
}

/// Parse a decimal read back during ingest. Corruption here must abort the
/// transaction, not be papered over.
fn parse_stored_decimal(s: String) -> Result<Decimal, LedgerError> {
    Decimal::from_str_canonical(&s)
        .map_err(|e| LedgerError::Storage(sqlx::Error::Decode(Box::new(e))))
}

/// Parse a decimal on a read-only path, defaulting on corruption.
fn lenient_decimal(s: String) -> Decimal {
    Decimal::from_str_canonical(&s).unwrap_or_else(|e| {
        warn!(value = %s, error = %e, "failed to parse stored decimal, using default");
        Decimal::default()
    })
}

fn position_from_row(row: &sqlx::sqlite::SqliteRow) -> Position {
    Position {
        symbol: Symbol::new(row.get("symbol")),
        qty: lenient_decimal(row.get("qty")),
        avg_price: lenient_decimal(row.get("avg_price")),
    }
}
