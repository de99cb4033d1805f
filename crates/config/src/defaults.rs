use crate::{JournalMode, ProfitFormulaKind, SynchronousMode};

pub fn default_enabled() -> bool {
    true
}

pub fn default_service_name() -> String {
    "brokerd".to_string()
}

pub fn default_storage_path() -> String {
    "data.db".to_string()
}

pub fn default_busy_timeout_ms() -> u64 {
    5000
}

pub fn default_max_connections() -> u32 {
    8
}

pub fn default_journal_mode() -> JournalMode {
    JournalMode::Wal
}

pub fn default_synchronous() -> SynchronousMode {
    SynchronousMode::Normal
}

pub fn default_poll_interval_ms() -> u64 {
    100
}

pub fn default_run_on_startup() -> bool {
    true
}

pub fn default_profit_formula() -> ProfitFormulaKind {
    ProfitFormulaKind::LotSize
}

/// Standard lot: 100,000 units of the quote currency
pub fn default_lot_size() -> f64 {
    100_000.0
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_gateway_port() -> u16 {
    8080
}

pub fn default_request_timeout_seconds() -> u64 {
    10
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
