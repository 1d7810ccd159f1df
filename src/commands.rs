//! The two text entry points offered to the command front end.
//!
//! The front end itself (chat transport, authorization) lives outside this
//! crate; it calls these and relays the returned text verbatim. Errors are
//! rendered in place, prefixed with context, and never panic the caller.

use crate::orchestration::{Reporter, Syncer};

/// Facade bundling the sync and reporting entry points.
#[derive(Clone)]
pub struct Commands {
    syncer: Syncer,
    reporter: Reporter,
}

impl Commands {
    pub fn new(syncer: Syncer, reporter: Reporter) -> Self {
        Self { syncer, reporter }
    }

    /// Run a sync pass and describe the outcome.
    pub async fn sync(&self) -> String {
        match self.syncer.run().await {
            Ok(report) => format!(
                "history synced: {} fetched, {} new",
                report.fetched, report.outcome.new
            ),
            Err(e) => format!("sync error: {}", e),
        }
    }

    /// Render the open positions as a plain-text table.
    pub async fn list_assets(&self) -> String {
        let reports = match self.reporter.describe_positions().await {
            Ok(reports) => reports,
            Err(e) => return format!("assets error: {}", e),
        };

        if reports.is_empty() {
            return "no assets".to_string();
        }

        let mut text = String::new();
        for report in reports {
            let current = report
                .current_price
                .map(|p| p.to_canonical_string())
                .unwrap_or_else(|| "unavailable".to_string());
            text.push_str(&format!(
                "{} qty: {} avg: {} current: {}\n",
                report.symbol, report.qty, report.avg_price, current
            ));
        }
        text
    }
}
