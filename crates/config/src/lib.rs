use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Root of the broker ledger configuration file.
///
/// Every section is optional in YAML; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

/// SQLite journal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    Wal,
    Delete,
    Memory,
}

/// SQLite `synchronous` pragma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynchronousMode {
    Off,
    Normal,
    Full,
}

/// Location and tuning of the SQLite database shared by the gateway and the worker
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Database file path, or `:memory:`
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// How long a statement waits for a competing write lock
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_journal_mode")]
    pub journal_mode: JournalMode,
    #[serde(default = "default_synchronous")]
    pub synchronous: SynchronousMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            max_connections: default_max_connections(),
            journal_mode: default_journal_mode(),
            synchronous: default_synchronous(),
        }
    }
}

impl StorageConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// Settlement worker schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Whether the worker runs in this process
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Interval between settlement cycles in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Whether to run a cycle immediately on startup
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_ms: default_poll_interval_ms(),
            run_on_startup: default_run_on_startup(),
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Which per-trade profit formula the worker applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitFormulaKind {
    /// `delta * volume * lot_size`, rounded to one decimal
    LotSize,
    /// `delta * volume * (100 for JPY pairs, 10_000 otherwise)`, rounded to cents
    PipMultiplier,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettlementConfig {
    #[serde(default = "default_profit_formula")]
    pub formula: ProfitFormulaKind,
    /// Contract size used by the `lot_size` formula
    #[serde(default = "default_lot_size")]
    pub lot_size: f64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            formula: default_profit_formula(),
            lot_size: default_lot_size(),
        }
    }
}

/// Ingestion and stats HTTP endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            host: default_host(),
            port: default_gateway_port(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl GatewayConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Fallback filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shipped_config() {
        let yaml = include_str!("../../../master_config/broker.yaml");

        let config: BrokerConfig =
            serde_yaml::from_str(yaml).expect("shipped broker.yaml should parse");

        assert_eq!(config.service.name, "brokerd");
        assert_eq!(config.storage.path, "data.db");
        assert_eq!(config.storage.busy_timeout_ms, 5000);
        assert_eq!(config.storage.journal_mode, JournalMode::Wal);
        assert_eq!(config.worker.poll_interval_ms, 100);
        assert_eq!(config.settlement.formula, ProfitFormulaKind::LotSize);
        assert_eq!(config.settlement.lot_size, 100_000.0);
        assert_eq!(config.gateway.port, 8080);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: BrokerConfig = serde_yaml::from_str("{}").expect("Failed to parse YAML");

        assert_eq!(config.storage.path, "data.db");
        assert_eq!(config.worker.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.storage.busy_timeout(), Duration::from_secs(5));
        assert!(config.worker.enabled);
        assert!(config.worker.run_on_startup);
        assert!(config.gateway.enabled);
        assert_eq!(config.gateway.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
storage:
  path: "/var/lib/broker/ledger.db"
worker:
  poll_interval_ms: 250
settlement:
  formula: pip_multiplier
"#;

        let config: BrokerConfig = serde_yaml::from_str(yaml).expect("Failed to parse YAML");

        assert_eq!(config.storage.path, "/var/lib/broker/ledger.db");
        assert_eq!(config.storage.busy_timeout_ms, 5000);
        assert_eq!(config.worker.poll_interval_ms, 250);
        assert!(config.worker.run_on_startup);
        assert_eq!(config.settlement.formula, ProfitFormulaKind::PipMultiplier);
        assert_eq!(config.settlement.lot_size, 100_000.0);
    }

    #[test]
    fn test_unknown_formula_rejected() {
        let yaml = "settlement:\n  formula: bankers\n";
        assert!(serde_yaml::from_str::<BrokerConfig>(yaml).is_err());
    }
}
