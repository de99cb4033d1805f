//! `trades_q`: closed trades waiting for settlement

use crate::models::TradeRow;
use crate::{Result, StorageError};
use common::{TradeId, ValidTrade};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, instrument};

/// Pool-backed access to the trade queue.
#[derive(Debug, Clone)]
pub struct TradeQueue {
    pool: SqlitePool,
}

impl TradeQueue {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a validated trade with `processed = 0`.
    #[instrument(skip(self, trade), fields(account = %trade.account, symbol = %trade.symbol))]
    pub async fn enqueue(&self, trade: &ValidTrade) -> Result<TradeId> {
        let result = sqlx::query(
            r#"
            INSERT INTO trades_q (account, symbol, volume, open, close, side, processed)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&trade.account)
        .bind(trade.symbol.as_str())
        .bind(trade.volume)
        .bind(trade.open)
        .bind(trade.close)
        .bind(trade.side.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Query(format!("Failed to enqueue trade: {}", e)))?;

        let id = TradeId(result.last_insert_rowid());
        debug!(%id, "Trade enqueued");
        Ok(id)
    }

    /// Look up one row, whether or not its columns decode.
    pub async fn get(&self, id: TradeId) -> Result<Option<TradeRow>> {
        let row = sqlx::query(
            "SELECT id, account, symbol, volume, open, close, side, processed FROM trades_q WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Query(format!("Failed to get trade {}: {}", id, e)))?;

        Ok(row.as_ref().map(TradeRow::from_row))
    }

    /// Settlement state of one row; `None` if it does not exist.
    pub async fn is_processed(&self, id: TradeId) -> Result<Option<bool>> {
        let processed = sqlx::query_scalar::<_, Option<i64>>("SELECT processed FROM trades_q WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("Failed to read state of trade {}: {}", id, e)))?;

        Ok(processed.map(|flag| flag.unwrap_or(0) != 0))
    }

    /// Number of rows with `processed = 0`.
    pub async fn pending_count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trades_q WHERE processed = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("Failed to count pending trades: {}", e)))
    }

    /// Read every unprocessed row on `conn`, ascending by id.
    ///
    /// A row whose columns cannot be decoded comes back as
    /// [`TradeRow::Malformed`] instead of failing the whole read.
    pub async fn fetch_unprocessed(conn: &mut SqliteConnection) -> Result<Vec<TradeRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account, symbol, volume, open, close, side, processed
            FROM trades_q
            WHERE processed = 0
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| StorageError::Query(format!("Failed to read unprocessed trades: {}", e)))?;

        Ok(rows.iter().map(TradeRow::from_row).collect())
    }

    /// Flip `processed` from 0 to 1 on `conn`.
    ///
    /// Returns `false` when the row was already processed or no longer exists.
    pub async fn mark_processed(conn: &mut SqliteConnection, id: TradeId) -> Result<bool> {
        let result = sqlx::query("UPDATE trades_q SET processed = 1 WHERE id = ? AND processed = 0")
            .bind(id.as_i64())
            .execute(&mut *conn)
            .await
            .map_err(|e| StorageError::Query(format!("Failed to mark trade {} processed: {}", id, e)))?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use assert_matches::assert_matches;
    use common::TradeSubmission;

    fn trade(account: &str, side: &str) -> ValidTrade {
        TradeSubmission {
            account: account.to_string(),
            symbol: "EURUSD".to_string(),
            volume: 1.5,
            open: 100.0,
            close: 110.0,
            side: side.to_string(),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_enqueue_and_get() {
        let db = Database::in_memory().await.unwrap();
        let queue = db.queue();

        let id = queue.enqueue(&trade("user1", "buy")).await.unwrap();
        let stored = queue.get(id).await.unwrap().unwrap();

        assert_matches!(stored, TradeRow::Ready(stored) => {
            assert_eq!(stored.id, id);
            assert_eq!(stored.account, "user1");
            assert_eq!(stored.symbol, "EURUSD");
            assert_eq!(stored.volume, 1.5);
            assert_eq!(stored.side, "buy");
            assert!(!stored.processed);
        });
        assert_eq!(queue.is_processed(id).await.unwrap(), Some(false));
        assert_eq!(queue.pending_count().await.unwrap(), 1);

        assert!(queue.get(TradeId(999)).await.unwrap().is_none());
        assert_eq!(queue.is_processed(TradeId(999)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_reports_undecodable_row() {
        let db = Database::in_memory().await.unwrap();
        let result = sqlx::query(
            "INSERT INTO trades_q (account, symbol, volume, open, close, side) \
             VALUES ('user1', 'EURUSD', 'lots', 1.0, 2.0, 'buy')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let id = TradeId(result.last_insert_rowid());

        let stored = db.queue().get(id).await.unwrap().unwrap();
        assert_matches!(stored, TradeRow::Malformed { id: Some(found), reason } => {
            assert_eq!(found, id);
            assert!(reason.contains("volume"));
        });
        assert_eq!(db.queue().is_processed(id).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_fetch_unprocessed_orders_by_id_and_flags_bad_rows() {
        let db = Database::in_memory().await.unwrap();
        let queue = db.queue();

        let first = queue.enqueue(&trade("user1", "buy")).await.unwrap();
        sqlx::query(
            "INSERT INTO trades_q (account, symbol, volume, open, close, side) \
             VALUES ('user2', 'EURUSD', 'lots', 1.0, 2.0, 'buy')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let third = queue.enqueue(&trade("user3", "sell")).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let rows = TradeQueue::fetch_unprocessed(&mut conn).await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_matches!(&rows[0], TradeRow::Ready(t) if t.id == first);
        assert_matches!(&rows[1], TradeRow::Malformed { id: Some(TradeId(2)), .. });
        assert_matches!(&rows[2], TradeRow::Ready(t) if t.id == third);
    }

    #[tokio::test]
    async fn test_mark_processed_only_once() {
        let db = Database::in_memory().await.unwrap();
        let id = db.queue().enqueue(&trade("user1", "buy")).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(TradeQueue::mark_processed(&mut conn, id).await.unwrap());
        assert!(!TradeQueue::mark_processed(&mut conn, id).await.unwrap());
        assert!(!TradeQueue::mark_processed(&mut conn, TradeId(42)).await.unwrap());
        drop(conn);

        assert_eq!(db.queue().pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_processed_flag_cannot_be_reset() {
        let db = Database::in_memory().await.unwrap();
        let id = db.queue().enqueue(&trade("user1", "buy")).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        TradeQueue::mark_processed(&mut conn, id).await.unwrap();

        let reset = sqlx::query("UPDATE trades_q SET processed = 0 WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *conn)
            .await;
        assert!(reset.is_err());
        drop(conn);

        assert_eq!(db.queue().is_processed(id).await.unwrap(), Some(true));
    }
}
