//! Tracing, logging, metrics (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Counters and exporters.
pub mod metrics;

pub use self::metrics::{
    CounterRegistry, InMemoryRegistry, Label, MetricsRegistry, TelemetryError,
    install_prometheus_recorder,
};
pub use self::tracing::{LogFormat, init_with};
