//! Observability module for metrics.
//!
//! Prometheus counters for the intake and the order sequencer. Tracing setup
//! lives in [`crate::telemetry`].

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_gateway_retry, record_lifecycle_finished,
    record_order_placement, record_signal_received, record_signal_skipped,
};
