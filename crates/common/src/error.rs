//! Common error types for the broker ledger

use thiserror::Error;

/// Common error type used across broker ledger crates
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input was provided (rejected trade submission, bad symbol, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The bare message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(msg) | Self::Config(msg) | Self::Internal(msg) => msg,
        }
    }
}
