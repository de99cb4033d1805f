//! Per-trade profit

use common::{CurrencyPair, Side};
use config::{ProfitFormulaKind, SettlementConfig};

/// Standard lot: 100,000 units
pub const LOT_SIZE: f64 = 100_000.0;

const PIP_MULTIPLIER_JPY: f64 = 100.0;
const PIP_MULTIPLIER: f64 = 10_000.0;

/// Round to `decimals` places, halves away from zero.
pub fn round_half_away(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// How a closed trade's price movement becomes ledger profit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFormula {
    /// `(close - open) * direction * volume * lot_size`, one decimal
    LotSize { lot_size: f64 },
    /// `(close - open) * direction * volume * multiplier`, two decimals,
    /// where the multiplier is 100 for JPY pairs and 10,000 otherwise
    PipMultiplier,
}

impl Default for ProfitFormula {
    fn default() -> Self {
        Self::LotSize { lot_size: LOT_SIZE }
    }
}

impl ProfitFormula {
    pub fn from_config(config: &SettlementConfig) -> Self {
        match config.formula {
            ProfitFormulaKind::LotSize => Self::LotSize {
                lot_size: config.lot_size,
            },
            ProfitFormulaKind::PipMultiplier => Self::PipMultiplier,
        }
    }

    /// Rounded profit of one trade. May be non-finite for non-finite inputs.
    pub fn compute(&self, symbol: &str, side: Side, volume: f64, open: f64, close: f64) -> f64 {
        let points = (close - open) * side.direction();

        match *self {
            Self::LotSize { lot_size } => round_half_away(points * volume * lot_size, 1),
            Self::PipMultiplier => {
                let multiplier = match CurrencyPair::parse(symbol) {
                    Ok(pair) if pair.involves_jpy() => PIP_MULTIPLIER_JPY,
                    _ => PIP_MULTIPLIER,
                };
                round_half_away(points * volume * multiplier, 2)
            }
        }
    }
}
