//! Prometheus metrics for the signal engine.
//!
//! Counters for signal intake, order placement, gateway retries and
//! lifecycle outcomes.
//!
//! # Example
//!
//! ```ignore
//! use signal_engine::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config)?;
//!
//! record_order_placement("entry", "placed");
//! ```

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::domain::order_execution::value_objects::LifecycleState;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub const fn with_addr(addr: SocketAddr) -> Self {
        Self { listen_addr: addr }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Signal Intake Metrics
// ============================================================================

/// Record a signal delivered to the intake.
pub fn record_signal_received() {
    counter!("signals_received_total").increment(1);
}

/// Record a signal that did not start a lifecycle.
///
/// # Arguments
///
/// * `reason` - Skip reason (e.g., `"parse_error"`, `"duplicate"`)
pub fn record_signal_skipped(reason: &str) {
    counter!(
        "signals_skipped_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

// ============================================================================
// Order Metrics
// ============================================================================

/// Record an order placement attempt after retries are exhausted or it succeeds.
///
/// # Arguments
///
/// * `kind` - Order kind (`"entry"`, `"take_profit"`, `"stop"`)
/// * `outcome` - `"placed"` or `"failed"`
pub fn record_order_placement(kind: &str, outcome: &str) {
    counter!(
        "order_placements_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a retried gateway call.
///
/// # Arguments
///
/// * `operation` - Gateway operation (e.g., `"place_order"`)
pub fn record_gateway_retry(operation: &str) {
    counter!(
        "gateway_retries_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

// ============================================================================
// Lifecycle Metrics
// ============================================================================

/// Record a lifecycle reaching its terminal state.
pub fn record_lifecycle_finished(state: LifecycleState) {
    counter!(
        "lifecycles_finished_total",
        "state" => state.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), 9090);
    }

    #[test]
    fn test_config_with_addr() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let config = MetricsConfig::with_addr(addr);
        assert_eq!(config.listen_addr.port(), 8080);
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed; calls must be no-ops
        record_signal_received();
        record_signal_skipped("duplicate");
        record_order_placement("entry", "placed");
        record_gateway_retry("place_order");
        record_lifecycle_finished(LifecycleState::Complete);
    }
}
