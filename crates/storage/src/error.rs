//! Storage error types

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Could not open or reach the database
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema bootstrap failed
    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    /// Begin, savepoint or commit failed
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A stored row does not have the expected column types
    #[error("Row {id:?} could not be decoded: {message}")]
    Decode { id: Option<i64>, message: String },
}
