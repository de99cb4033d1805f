//! Common types and utilities for the broker ledger
//!
//! This crate provides shared types and validation used across
//! all broker ledger crates.
//!
//! # Modules
//!
//! - [`error`] - Common error types
//! - [`types`] - Shared domain types (TradeId, Side, CurrencyPair, ...)
//! - [`validation`] - Ingestion rules for submitted trades

pub mod error;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use types::*;
pub use validation::{validate_symbol, validate_trade, SYMBOL_PATTERN};
