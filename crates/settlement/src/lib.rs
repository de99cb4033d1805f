//! Trade settlement for the broker ledger
//!
//! The [`SettlementWorker`] drains unprocessed rows from the trade queue,
//! computes each trade's profit and folds it into the account ledger. A cycle
//! runs in one transaction; every row is applied inside its own savepoint so a
//! bad row is skipped without touching the rest of the cycle.
//!
//! ```ignore
//! let worker = SettlementWorker::new(db, ProfitFormula::default());
//! let report = worker.run_cycle().await?;
//! ```

pub mod error;
pub mod profit;
pub mod report;
pub mod single_flight;
pub mod ticker;
pub mod worker;

pub use error::SettlementError;
pub use profit::{round_half_away, ProfitFormula, LOT_SIZE};
pub use report::{CycleReport, RowOutcome, SkipReason};
pub use single_flight::{OverlapPolicy, SingleFlight};
pub use ticker::{IntervalTicker, ManualTicker, TickHandle, Ticker};
pub use worker::SettlementWorker;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, SettlementError>;
