//! The settlement worker
//!
//! One cycle:
//! 1. begin a write transaction (`BEGIN IMMEDIATE`)
//! 2. read every `processed = 0` row, ascending by id
//! 3. per row, inside a savepoint: compute profit, upsert the ledger, flip
//!    `processed`; any failure rolls the savepoint back and skips the row
//! 4. commit
//!
//! A failed begin, read or commit aborts the cycle with nothing persisted.

use crate::profit::ProfitFormula;
use crate::report::{CycleReport, RowOutcome, SkipReason};
use crate::single_flight::{OverlapPolicy, SingleFlight};
use crate::ticker::Ticker;
use crate::{Result, SettlementError};
use common::Side;
use config::{SettlementConfig, WorkerConfig};
use observability::SettlementMetrics;
use sqlx::{Acquire, Sqlite, Transaction};
use std::time::Instant;
use storage::{AccountLedger, Database, QueuedTrade, TradeQueue, TradeRow};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub struct SettlementWorker {
    db: Database,
    formula: ProfitFormula,
    run_on_startup: bool,
    flight: SingleFlight,
    metrics: SettlementMetrics,
}

impl SettlementWorker {
    pub fn new(db: Database, formula: ProfitFormula) -> Self {
        Self {
            db,
            formula,
            run_on_startup: true,
            flight: SingleFlight::new(),
            metrics: SettlementMetrics::new(),
        }
    }

    pub fn from_config(db: Database, worker: &WorkerConfig, settlement: &SettlementConfig) -> Self {
        Self::new(db, ProfitFormula::from_config(settlement)).with_run_on_startup(worker.run_on_startup)
    }

    /// Whether [`SettlementWorker::run`] settles once before the first tick.
    pub fn with_run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = run_on_startup;
        self
    }

    pub fn formula(&self) -> ProfitFormula {
        self.formula
    }

    /// Run one cycle, waiting for any cycle already in progress.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        match self.flight.run(OverlapPolicy::Queue, || self.settle()).await {
            Some(result) => result,
            // Queue never drops
            None => Ok(CycleReport::default()),
        }
    }

    /// Run one cycle unless one is already in progress (`None`).
    pub async fn trigger(&self) -> Option<Result<CycleReport>> {
        let outcome = self.flight.run(OverlapPolicy::Drop, || self.settle()).await;
        if outcome.is_none() {
            self.metrics.cycle_dropped();
        }
        outcome
    }

    /// Drive cycles from `ticker` until it is exhausted or `shutdown` fires.
    pub async fn run<T: Ticker>(&self, mut ticker: T, shutdown: CancellationToken) {
        info!(
            formula = ?self.formula,
            run_on_startup = self.run_on_startup,
            "Starting settlement worker"
        );

        if self.run_on_startup {
            self.on_tick().await;
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Settlement worker shutting down");
                    return;
                }
                tick = ticker.tick() => match tick {
                    Some(()) => self.on_tick().await,
                    None => {
                        info!("Tick source exhausted, settlement worker stopping");
                        return;
                    }
                },
            }
        }
    }

    async fn on_tick(&self) {
        match self.trigger().await {
            Some(Ok(_)) => {}
            Some(Err(e)) => error!(error = %e, "Settlement cycle failed"),
            None => debug!("Settlement cycle already running, tick dropped"),
        }
    }

    #[instrument(skip(self))]
    async fn settle(&self) -> Result<CycleReport> {
        let started = Instant::now();

        match self.settle_and_commit().await {
            Ok(report) => {
                self.metrics
                    .cycle_committed(started.elapsed(), report.examined(), report.settled());
                for reason in report.skip_reasons() {
                    self.metrics.row_skipped(reason.label());
                }

                if report.is_empty() {
                    debug!("No unprocessed trades");
                } else {
                    info!(
                        examined = report.examined(),
                        settled = report.settled(),
                        skipped = report.skipped(),
                        total_profit = report.total_profit(),
                        "Settlement cycle committed"
                    );
                }
                Ok(report)
            }
            Err(e) => {
                self.metrics.cycle_failed(started.elapsed());
                Err(e)
            }
        }
    }

    async fn settle_and_commit(&self) -> Result<CycleReport> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| SettlementError::Begin(e.to_string()))?;

        let report = self.settle_pending(&mut tx).await?;

        tx.commit()
            .await
            .map_err(|e| SettlementError::Commit(e.to_string()))?;

        Ok(report)
    }

    /// Fold every unprocessed row into the ledger on `tx` without committing.
    pub(crate) async fn settle_pending(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<CycleReport> {
        let rows = TradeQueue::fetch_unprocessed(tx)
            .await
            .map_err(|e| SettlementError::Read(e.to_string()))?;

        let mut report = CycleReport::default();
        for row in rows {
            let outcome = match row {
                TradeRow::Ready(trade) => self.settle_trade(tx, trade).await,
                TradeRow::Malformed { id, reason } => RowOutcome::Skipped {
                    id,
                    reason: SkipReason::Malformed(reason),
                },
            };

            match &outcome {
                RowOutcome::Settled { id, account, profit } => {
                    debug!(trade_id = %id, account = %account, profit, "Trade settled");
                }
                RowOutcome::Skipped { id, reason } => {
                    warn!(trade_id = ?id.map(|id| id.as_i64()), reason = %reason, "Skipping trade");
                }
            }
            report.push(outcome);
        }

        Ok(report)
    }

    async fn settle_trade(&self, tx: &mut Transaction<'_, Sqlite>, trade: QueuedTrade) -> RowOutcome {
        let skip = |reason| RowOutcome::Skipped {
            id: Some(trade.id),
            reason,
        };

        let side: Side = match trade.side.parse() {
            Ok(side) => side,
            Err(_) => return skip(SkipReason::UnknownSide(trade.side.clone())),
        };

        let profit = self
            .formula
            .compute(&trade.symbol, side, trade.volume, trade.open, trade.close);
        if !profit.is_finite() {
            return skip(SkipReason::NonFiniteProfit);
        }

        let mut savepoint = match tx.begin().await {
            Ok(savepoint) => savepoint,
            Err(e) => return skip(SkipReason::Savepoint(e.to_string())),
        };

        if let Err(e) = AccountLedger::apply(&mut savepoint, &trade.account, profit).await {
            discard(savepoint).await;
            return skip(SkipReason::LedgerWrite(e.to_string()));
        }

        match TradeQueue::mark_processed(&mut savepoint, trade.id).await {
            Ok(true) => {}
            Ok(false) => {
                discard(savepoint).await;
                return skip(SkipReason::AlreadySettled);
            }
            Err(e) => {
                discard(savepoint).await;
                return skip(SkipReason::MarkProcessed(e.to_string()));
            }
        }

        if let Err(e) = savepoint.commit().await {
            return skip(SkipReason::Savepoint(e.to_string()));
        }

        RowOutcome::Settled {
            id: trade.id,
            account: trade.account,
            profit,
        }
    }
}

async fn discard(savepoint: Transaction<'_, Sqlite>) {
    if let Err(e) = savepoint.rollback().await {
        warn!(error = %e, "Failed to roll back row savepoint");
    }
}
