//! Observability for the broker ledger services
//!
//! - Structured logging via tracing
//! - Prometheus exporter and settlement metric handles
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("brokerd", LogFormat::Pretty, "info")?;
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use crate::metrics::{init_metrics, SettlementMetrics};
