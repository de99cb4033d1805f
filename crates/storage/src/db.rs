//! Connection pool and schema bootstrap

use crate::{AccountLedger, Result, StorageError, TradeQueue};
use config::{JournalMode, StorageConfig, SynchronousMode};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// Handle to the shared SQLite database.
///
/// Cloning is cheap; clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database described by `config`.
    ///
    /// Does not touch the schema; call [`Database::run_migrations`] afterwards.
    #[instrument(skip(config), fields(path = %config.path))]
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        if config.is_in_memory() {
            return Self::open_in_memory().await;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(journal_mode(config.journal_mode))
            .synchronous(synchronous(config.synchronous))
            .busy_timeout(config.busy_timeout());

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                StorageError::Connection(format!("Failed to open {}: {}", config.path, e))
            })?;

        info!(
            path = %config.path,
            journal_mode = ?config.journal_mode,
            max_connections = config.max_connections,
            "Connected to SQLite"
        );

        Ok(Self { pool })
    }

    /// Private in-memory database with the schema already applied.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::open_in_memory().await?;
        db.run_migrations().await?;
        Ok(db)
    }

    // Every connection to `:memory:` is a separate database, so the pool
    // holds exactly one connection for its whole lifetime.
    async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;

        debug!("Opened in-memory SQLite database");
        Ok(Self { pool })
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn queue(&self) -> TradeQueue {
        TradeQueue::new(self.pool.clone())
    }

    pub fn ledger(&self) -> AccountLedger {
        AccountLedger::new(self.pool.clone())
    }

    /// Create `trades_q`, `account_stats` and their index and trigger.
    ///
    /// Safe to run on every startup.
    pub async fn run_migrations(&self) -> Result<()> {
        let migration_sql = include_str!("../../../migrations/001_create_settlement_tables.sql");
        sqlx::raw_sql(migration_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(format!("Ping failed: {}", e)))?;
        Ok(())
    }

    /// Start a write transaction on a pooled connection.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock up front, waiting at most the
    /// busy timeout. Writers that arrive later queue behind the commit instead
    /// of invalidating this transaction's read snapshot.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| StorageError::Transaction(format!("Failed to begin transaction: {}", e)))
    }

    /// Close every connection; later operations fail.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

fn journal_mode(mode: JournalMode) -> SqliteJournalMode {
    match mode {
        JournalMode::Wal => SqliteJournalMode::Wal,
        JournalMode::Delete => SqliteJournalMode::Delete,
        JournalMode::Memory => SqliteJournalMode::Memory,
    }
}

fn synchronous(mode: SynchronousMode) -> SqliteSynchronous {
    match mode {
        SynchronousMode::Off => SqliteSynchronous::Off,
        SynchronousMode::Normal => SqliteSynchronous::Normal,
        SynchronousMode::Full => SqliteSynchronous::Full,
    }
}
