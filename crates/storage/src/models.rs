//! Row types read from `trades_q`

use crate::StorageError;
use common::TradeId;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// A `trades_q` row with every column decoded.
///
/// `side` is kept as stored; interpreting it is up to the settlement path.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedTrade {
    pub id: TradeId,
    pub account: String,
    pub symbol: String,
    pub volume: f64,
    pub open: f64,
    pub close: f64,
    pub side: String,
    pub processed: bool,
}

impl QueuedTrade {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, StorageError> {
        let id: i64 = row.try_get("id").map_err(|e| StorageError::Decode {
            id: None,
            message: e.to_string(),
        })?;
        let decode = |e: sqlx::Error| StorageError::Decode {
            id: Some(id),
            message: e.to_string(),
        };

        let processed: Option<i64> = row.try_get("processed").map_err(decode)?;

        Ok(Self {
            id: TradeId(id),
            account: row.try_get("account").map_err(decode)?,
            symbol: row.try_get("symbol").map_err(decode)?,
            volume: row.try_get("volume").map_err(decode)?,
            open: row.try_get("open").map_err(decode)?,
            close: row.try_get("close").map_err(decode)?,
            side: row.try_get("side").map_err(decode)?,
            processed: processed.unwrap_or(0) != 0,
        })
    }
}

/// One `trades_q` row, decoded as far as its columns allow.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeRow {
    Ready(QueuedTrade),
    /// The row exists but its columns could not be read
    Malformed { id: Option<TradeId>, reason: String },
}

impl TradeRow {
    pub(crate) fn from_row(row: &SqliteRow) -> Self {
        match QueuedTrade::from_row(row) {
            Ok(trade) => Self::Ready(trade),
            Err(StorageError::Decode { id, message }) => Self::Malformed {
                id: id.map(TradeId),
                reason: message,
            },
            Err(other) => Self::Malformed {
                id: None,
                reason: other.to_string(),
            },
        }
    }
}
