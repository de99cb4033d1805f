//! Prometheus exporter and settlement metric handles

use metrics::{counter, gauge, histogram, Counter, Gauge, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter; metrics are served at `/metrics`.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Metrics emitted by the settlement worker.
///
/// * `settlement_cycles_total{outcome}` - cycles by `committed`, `failed` or `dropped`
/// * `settlement_rows_settled_total` - rows folded into the ledger
/// * `settlement_rows_skipped_total{reason}` - rows left for a later cycle
/// * `settlement_cycle_duration_seconds` - wall time of committed and failed cycles
/// * `settlement_last_cycle_rows` - rows examined by the most recent cycle
///
/// Without an installed recorder every handle is a no-op.
#[derive(Clone)]
pub struct SettlementMetrics {
    rows_settled: Counter,
    cycle_duration: Histogram,
    last_cycle_rows: Gauge,
}

impl SettlementMetrics {
    pub fn new() -> Self {
        Self {
            rows_settled: counter!("settlement_rows_settled_total"),
            cycle_duration: histogram!("settlement_cycle_duration_seconds"),
            last_cycle_rows: gauge!("settlement_last_cycle_rows"),
        }
    }

    pub fn cycle_committed(&self, duration: Duration, examined: usize, settled: usize) {
        counter!("settlement_cycles_total", "outcome" => "committed").increment(1);
        self.cycle_duration.record(duration.as_secs_f64());
        self.last_cycle_rows.set(examined as f64);
        self.rows_settled.increment(settled as u64);
    }

    pub fn cycle_failed(&self, duration: Duration) {
        counter!("settlement_cycles_total", "outcome" => "failed").increment(1);
        self.cycle_duration.record(duration.as_secs_f64());
    }

    /// A trigger arrived while a cycle was already running.
    pub fn cycle_dropped(&self) {
        counter!("settlement_cycles_total", "outcome" => "dropped").increment(1);
    }

    pub fn row_skipped(&self, reason: &'static str) {
        counter!("settlement_rows_skipped_total", "reason" => reason).increment(1);
    }
}

impl Default for SettlementMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_without_recorder() {
        let metrics = SettlementMetrics::new();
        metrics.cycle_committed(Duration::from_millis(3), 4, 3);
        metrics.row_skipped("malformed_side");
        metrics.cycle_failed(Duration::from_millis(1));
        metrics.cycle_dropped();
    }
}
