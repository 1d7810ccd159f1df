//! Control flow over the exchange client and the ledger.

pub mod report;
pub mod sync;

pub use report::{PositionReport, Reporter};
pub use sync::{SyncError, SyncReport, Syncer};
