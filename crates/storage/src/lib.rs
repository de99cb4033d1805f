//! SQLite storage for the broker ledger
//!
//! Two tables live in one database file:
//! - `trades_q`: closed trades waiting to be settled
//! - `account_stats`: per-account trade count and cumulative profit
//!
//! Pool-level reads and writes go through [`TradeQueue`] and [`AccountLedger`].
//! The settlement path uses their connection-level functions inside a
//! transaction it owns.

pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod queue;

pub use db::Database;
pub use error::StorageError;
pub use ledger::AccountLedger;
pub use models::{QueuedTrade, TradeRow};
pub use queue::TradeQueue;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
