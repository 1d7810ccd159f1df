pub mod commands;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod exchange;
pub mod orchestration;

pub use commands::Commands;
pub use config::Config;
pub use db::{init_db, IngestOutcome, LedgerError, Repository};
pub use domain::{Category, Decimal, Position, Side, Symbol, TimeMs, Trade};
pub use engine::{OversellPolicy, PositionState};
pub use exchange::{
    BybitClient, Credentials, ExchangeError, MarketData, MockMarketData, Signer,
};
pub use orchestration::{PositionReport, Reporter, SyncError, SyncReport, Syncer};
