//! What a settlement cycle did with each row

use common::TradeId;
use std::fmt;

/// Why a row was left unprocessed. The row is retried next cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Columns could not be decoded
    Malformed(String),
    /// `side` is neither `buy` nor `sell`
    UnknownSide(String),
    NonFiniteProfit,
    /// The ledger upsert failed
    LedgerWrite(String),
    /// The processed-flag update failed
    MarkProcessed(String),
    /// Another writer already flipped the flag
    AlreadySettled,
    /// The per-row savepoint could not be opened or released
    Savepoint(String),
}

impl SkipReason {
    /// Stable label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed_row",
            Self::UnknownSide(_) => "unknown_side",
            Self::NonFiniteProfit => "non_finite_profit",
            Self::LedgerWrite(_) => "ledger_write_failed",
            Self::MarkProcessed(_) => "mark_processed_failed",
            Self::AlreadySettled => "already_settled",
            Self::Savepoint(_) => "savepoint_failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed row: {}", msg),
            Self::UnknownSide(side) => write!(f, "unknown side '{}'", side),
            Self::NonFiniteProfit => write!(f, "profit is not a finite number"),
            Self::LedgerWrite(msg) => write!(f, "ledger update failed: {}", msg),
            Self::MarkProcessed(msg) => write!(f, "marking processed failed: {}", msg),
            Self::AlreadySettled => write!(f, "already settled"),
            Self::Savepoint(msg) => write!(f, "savepoint failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Settled {
        id: TradeId,
        account: String,
        profit: f64,
    },
    Skipped {
        /// `None` when not even the id could be read
        id: Option<TradeId>,
        reason: SkipReason,
    },
}

impl RowOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }
}

/// Per-row outcomes of one cycle, in visiting order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub outcomes: Vec<RowOutcome>,
}

impl CycleReport {
    pub fn push(&mut self, outcome: RowOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn examined(&self) -> usize {
        self.outcomes.len()
    }

    pub fn settled(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_settled()).count()
    }

    pub fn skipped(&self) -> usize {
        self.examined() - self.settled()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Sum of settled profits
    pub fn total_profit(&self) -> f64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                RowOutcome::Settled { profit, .. } => *profit,
                RowOutcome::Skipped { .. } => 0.0,
            })
            .sum()
    }

    pub fn settled_ids(&self) -> Vec<TradeId> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RowOutcome::Settled { id, .. } => Some(*id),
                RowOutcome::Skipped { .. } => None,
            })
            .collect()
    }

    pub fn skip_reasons(&self) -> impl Iterator<Item = &SkipReason> {
        self.outcomes.iter().filter_map(|o| match o {
            RowOutcome::Skipped { reason, .. } => Some(reason),
            RowOutcome::Settled { .. } => None,
        })
    }
}
