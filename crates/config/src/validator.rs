use crate::*;
use thiserror::Error;

/// Lowest poll interval accepted without a warning
const MIN_RECOMMENDED_POLL_MS: u64 = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("Storage: {message}")]
    InvalidStorage { message: String },

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("{field} must be a positive float")]
    InvalidPositiveFloat { field: String },

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Invalid gateway host: {0}")]
    InvalidHost(String),

    #[error("Port {port} is used by both {first} and {second}")]
    PortConflict { port: u16, first: String, second: String },

    #[error("Neither the gateway nor the worker is enabled")]
    NothingEnabled,

    #[error("Environment variable '{var}' is missing or invalid: {message}")]
    InvalidEnvVar { var: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &BrokerConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.service.name.trim().is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    }

    validate_storage(&config.storage, &mut report);
    validate_worker(&config.worker, &mut report);
    validate_settlement(&config.settlement, &mut report);
    validate_gateway(&config.gateway, &mut report);
    validate_observability(config, &mut report);

    if !config.worker.enabled && !config.gateway.enabled {
        report.add_error(ValidationError::NothingEnabled);
    }

    report
}

fn validate_storage(storage: &StorageConfig, report: &mut ValidationReport) {
    if storage.path.trim().is_empty() {
        report.add_error(ValidationError::InvalidStorage {
            message: "path must not be empty".to_string(),
        });
    } else if has_unresolved_env_vars(&storage.path) {
        report.add_error(ValidationError::InvalidEnvVar {
            var: storage.path.clone(),
            message: "storage.path references an unset environment variable".to_string(),
        });
    }

    if storage.busy_timeout_ms == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "storage.busy_timeout_ms".to_string(),
        });
    }

    if storage.max_connections == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "storage.max_connections".to_string(),
        });
    }

    if storage.is_in_memory() {
        report.add_warning(
            "storage.path",
            "In-memory storage is lost on restart and is not shared between processes",
        );
    }

    if storage.journal_mode != JournalMode::Wal {
        report.add_warning(
            "storage.journal_mode",
            "Without WAL, ingestion writes block while a settlement cycle is open",
        );
    }
}

fn validate_worker(worker: &WorkerConfig, report: &mut ValidationReport) {
    if worker.poll_interval_ms == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "worker.poll_interval_ms".to_string(),
        });
    } else if worker.poll_interval_ms < MIN_RECOMMENDED_POLL_MS {
        report.add_warning(
            "worker.poll_interval_ms",
            "Poll intervals below 10ms keep the database write lock busy",
        );
    }
}

fn validate_settlement(settlement: &SettlementConfig, report: &mut ValidationReport) {
    match settlement.formula {
        ProfitFormulaKind::LotSize => {
            if !settlement.lot_size.is_finite() || settlement.lot_size <= 0.0 {
                report.add_error(ValidationError::InvalidPositiveFloat {
                    field: "settlement.lot_size".to_string(),
                });
            } else if settlement.lot_size != default_lot_size() {
                report.add_warning(
                    "settlement.lot_size",
                    "Non-standard lot size; ledger profits are not comparable with the default",
                );
            }
        }
        ProfitFormulaKind::PipMultiplier => {
            report.add_warning(
                "settlement.formula",
                "pip_multiplier diverges materially from lot_size on JPY pairs; confirm the business rule",
            );
        }
    }
}

fn validate_gateway(gateway: &GatewayConfig, report: &mut ValidationReport) {
    if !gateway.enabled {
        return;
    }

    if gateway.host.parse::<std::net::IpAddr>().is_err() && gateway.host != "localhost" {
        report.add_error(ValidationError::InvalidHost(gateway.host.clone()));
    }

    if gateway.request_timeout_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "gateway.request_timeout_seconds".to_string(),
        });
    }
}

fn validate_observability(config: &BrokerConfig, report: &mut ValidationReport) {
    if !matches!(
        config.logging.format.to_lowercase().as_str(),
        "pretty" | "json" | "compact"
    ) {
        report.add_error(ValidationError::InvalidLogFormat(config.logging.format.clone()));
    }

    if config.metrics.enabled
        && config.gateway.enabled
        && config.metrics.port == config.gateway.port
    {
        report.add_error(ValidationError::PortConflict {
            port: config.metrics.port,
            first: "gateway".to_string(),
            second: "metrics".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let report = validate_config(&BrokerConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_zero_poll_interval() {
        let mut config = BrokerConfig::default();
        config.worker.poll_interval_ms = 0;

        let report = validate_config(&config);
        assert!(report.errors.contains(&ValidationError::InvalidPositiveInteger {
            field: "worker.poll_interval_ms".to_string(),
        }));
    }

    #[test]
    fn test_pip_multiplier_warns() {
        let mut config = BrokerConfig::default();
        config.settlement.formula = ProfitFormulaKind::PipMultiplier;

        let report = validate_config(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "settlement.formula");
    }

    #[test]
    fn test_invalid_lot_size() {
        let mut config = BrokerConfig::default();
        config.settlement.lot_size = -1.0;

        let report = validate_config(&config);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_nothing_enabled() {
        let mut config = BrokerConfig::default();
        config.worker.enabled = false;
        config.gateway.enabled = false;

        let report = validate_config(&config);
        assert!(report.errors.contains(&ValidationError::NothingEnabled));
    }

    #[test]
    fn test_metrics_port_conflict() {
        let mut config = BrokerConfig::default();
        config.metrics.enabled = true;
        config.metrics.port = config.gateway.port;

        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::PortConflict { .. })));
    }

    #[test]
    fn test_unresolved_storage_path() {
        let mut config = BrokerConfig::default();
        config.storage.path = "${BROKER_VALIDATOR_UNSET}".to_string();

        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_in_memory_warns() {
        let mut config = BrokerConfig::default();
        config.storage.path = ":memory:".to_string();

        let report = validate_config(&config);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.field == "storage.path"));
    }
}
