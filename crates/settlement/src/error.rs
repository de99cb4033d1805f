//! Settlement error types

use thiserror::Error;

/// Failures that abort a whole settlement cycle.
///
/// Problems with individual rows never surface here; they are reported as
/// skipped rows in the cycle report.
#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("Failed to begin settlement transaction: {0}")]
    Begin(String),

    #[error("Failed to read unprocessed trades: {0}")]
    Read(String),

    /// Nothing from the cycle was persisted
    #[error("Failed to commit settlement cycle: {0}")]
    Commit(String),
}
