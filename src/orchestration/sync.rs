//! Sync flow: fetch recent executions per category and feed the ledger.

use crate::db::{IngestOutcome, LedgerError, Repository};
use crate::domain::{Category, Trade};
use crate::engine::OversellPolicy;
use crate::exchange::{ExchangeError, MarketData};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Orchestrates one sync invocation: fetch each configured category, merge
/// chronologically, ingest atomically.
#[derive(Clone)]
pub struct Syncer {
    market: Arc<dyn MarketData>,
    repo: Arc<Repository>,
    categories: Vec<Category>,
    fetch_limit: u32,
    oversell_policy: OversellPolicy,
}

impl Syncer {
    pub fn new(
        market: Arc<dyn MarketData>,
        repo: Arc<Repository>,
        categories: Vec<Category>,
        fetch_limit: u32,
        oversell_policy: OversellPolicy,
    ) -> Self {
        Self {
            market,
            repo,
            categories,
            fetch_limit,
            oversell_policy,
        }
    }

    /// Run one sync pass.
    ///
    /// Exchange and ledger errors propagate unchanged; a failed ingest leaves
    /// no partial state behind. The exchange returns each category newest
    /// first, so the merged batch is sorted ascending by execution time
    /// before ingestion; ordering across categories with equal timestamps is
    /// a documented looseness.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let mut trades: Vec<Trade> = Vec::new();
        for category in &self.categories {
            let page = self.market.fetch_trades(category, self.fetch_limit).await?;
            info!(category = %category, fetched = page.len(), "fetched executions");
            trades.extend(page);
        }

        trades.sort_by_key(|t| t.exec_time_ms);

        let fetched = trades.len();
        let outcome = self.repo.ingest(&trades, self.oversell_policy).await?;

        info!(fetched, new = outcome.new, "sync complete");
        Ok(SyncReport { fetched, outcome })
    }
}

/// Result of one sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Executions fetched across all categories.
    pub fetched: usize,
    /// What the ledger did with them.
    pub outcome: IngestOutcome,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
