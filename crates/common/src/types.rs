//! Common types used across the broker ledger
//!
//! This module provides the fundamental domain types shared by the
//! gateway, the storage layer and the settlement worker.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Surrogate key of a queued trade, assigned by storage on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub i64);

impl TradeId {
    /// Get the raw row id
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TradeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Trade side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Long position: profits when the price rises
    Buy,
    /// Short position: profits when the price falls
    Sell,
}

impl Side {
    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Sign applied to the raw price delta
    pub fn direction(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is exact: only `buy` and `sell` are accepted.
impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(Error::invalid_input(format!(
                "side must be either 'buy' or 'sell', got '{}'",
                other
            ))),
        }
    }
}

/// Six-letter currency pair symbol (e.g., "EURUSD", "USDJPY")
///
/// Unlike free-form text, a `CurrencyPair` can only be built from a string
/// that passed [`crate::validation::validate_symbol`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CurrencyPair(String);

impl CurrencyPair {
    /// Parse and validate a symbol
    pub fn parse(s: &str) -> crate::Result<Self> {
        crate::validation::validate_symbol(s)?;
        Ok(Self(s.to_string()))
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base currency (first three letters)
    pub fn base(&self) -> &str {
        &self.0[..3]
    }

    /// Quote currency (last three letters)
    pub fn quote(&self) -> &str {
        &self.0[3..]
    }

    /// True if either leg of the pair is the Japanese yen
    pub fn involves_jpy(&self) -> bool {
        self.base() == "JPY" || self.quote() == "JPY"
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyPair {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A trade as submitted to the ingestion endpoint
///
/// Fields are kept as received so that validation can report the exact
/// offending value; see [`TradeSubmission::validate`]. Missing fields decode
/// as empty or zero and are then rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeSubmission {
    pub account: String,
    pub symbol: String,
    pub volume: f64,
    pub open: f64,
    pub close: f64,
    pub side: String,
}

impl TradeSubmission {
    /// Validate the submission and convert it into a typed trade
    pub fn validate(self) -> crate::Result<ValidTrade> {
        crate::validation::validate_trade(&self)?;

        Ok(ValidTrade {
            account: self.account,
            symbol: CurrencyPair(self.symbol),
            volume: self.volume,
            open: self.open,
            close: self.close,
            side: self.side.parse()?,
        })
    }
}

/// A trade that passed ingestion validation and may be enqueued
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTrade {
    pub account: String,
    pub symbol: CurrencyPair,
    pub volume: f64,
    pub open: f64,
    pub close: f64,
    pub side: Side,
}

/// Aggregate settlement statistics for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStats {
    pub account: String,
    pub trades: i64,
    pub profit: f64,
}

impl AccountStats {
    /// Stats for an account with no settled trades
    pub fn empty(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            trades: 0,
            profit: 0.0,
        }
    }
}
