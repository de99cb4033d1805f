//! `account_stats`: per-account settled totals

use crate::{Result, StorageError};
use common::AccountStats;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

#[derive(Debug, Clone)]
pub struct AccountLedger {
    pool: SqlitePool,
}

impl AccountLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current totals for `account`; zeros if it has never been settled.
    pub async fn get(&self, account: &str) -> Result<AccountStats> {
        let row = sqlx::query("SELECT account, trades, profit FROM account_stats WHERE account = ?")
            .bind(account)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("Failed to get stats for {}: {}", account, e)))?;

        match row {
            Some(row) => stats_from_row(&row),
            None => Ok(AccountStats::empty(account)),
        }
    }

    /// Every ledger row, by account name.
    pub async fn list(&self) -> Result<Vec<AccountStats>> {
        let rows = sqlx::query("SELECT account, trades, profit FROM account_stats ORDER BY account")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("Failed to list account stats: {}", e)))?;

        rows.iter().map(stats_from_row).collect()
    }

    /// Add one trade and `profit` to `account` on `conn`, creating the row if absent.
    pub async fn apply(conn: &mut SqliteConnection, account: &str, profit: f64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO account_stats (account, trades, profit)
            VALUES (?, 1, ?)
            ON CONFLICT(account) DO UPDATE SET
                trades = trades + 1,
                profit = profit + excluded.profit
            "#,
        )
        .bind(account)
        .bind(profit)
        .execute(&mut *conn)
        .await
        .map_err(|e| StorageError::Query(format!("Failed to update stats for {}: {}", account, e)))?;

        Ok(())
    }
}

fn stats_from_row(row: &SqliteRow) -> Result<AccountStats> {
    let decode = |e: sqlx::Error| StorageError::Decode {
        id: None,
        message: e.to_string(),
    };

    let trades: Option<i64> = row.try_get("trades").map_err(decode)?;
    let profit: Option<f64> = row.try_get("profit").map_err(decode)?;

    Ok(AccountStats {
        account: row.try_get("account").map_err(decode)?,
        trades: trades.unwrap_or(0),
        profit: profit.unwrap_or(0.0),
    })
}
