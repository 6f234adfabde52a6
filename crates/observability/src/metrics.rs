//! Counter port.
//!
//! Components receive an `Arc<dyn CounterRegistry>` explicitly instead of
//! reaching for the global `metrics` recorder, so tests can count in memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// A counter dimension: name and value.
pub type Label = (&'static str, String);

/// Process-wide counter store. Increments must never be lost under concurrency.
pub trait CounterRegistry: Send + Sync {
    fn increment(&self, name: &'static str, labels: &[Label]);
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install metrics recorder: {0}")]
    Recorder(#[from] BuildError),
}

/// Install the Prometheus recorder behind the `metrics` facade.
///
/// Must be called at most once per process, before any counter is emitted.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, TelemetryError> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Forwards increments to whatever recorder is installed in the `metrics` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsRegistry;

impl CounterRegistry for MetricsRegistry {
    fn increment(&self, name: &'static str, labels: &[Label]) {
        let labels: Vec<::metrics::Label> = labels
            .iter()
            .map(|(key, value)| ::metrics::Label::new(*key, value.clone()))
            .collect();

        ::metrics::counter!(name, labels).increment(1);
    }
}

/// Identity of a counter: its name plus dimensions sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterKey {
    pub name: String,
    pub labels: Vec<(String, String)>,
}

impl CounterKey {
    fn new<'a>(name: &str, labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut labels: Vec<(String, String)> = labels
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        labels.sort();

        Self {
            name: name.to_string(),
            labels,
        }
    }
}

/// In-memory registry for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    counters: RwLock<HashMap<CounterKey, AtomicU64>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the counter with exactly these dimensions (order-insensitive).
    pub fn count(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let key = CounterKey::new(name, labels.iter().copied());
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Sum of every counter named `name`, across all dimension values.
    pub fn total(&self, name: &str) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(key, _)| key.name == name)
            .map(|(_, c)| c.load(Ordering::Relaxed))
            .sum()
    }

    /// All counters, sorted by key.
    pub fn snapshot(&self) -> Vec<(CounterKey, u64)> {
        let mut all: Vec<(CounterKey, u64)> = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, c)| (key.clone(), c.load(Ordering::Relaxed)))
            .collect();
        all.sort();
        all
    }
}

impl CounterRegistry for InMemoryRegistry {
    fn increment(&self, name: &'static str, labels: &[Label]) {
        let key = CounterKey::new(name, labels.iter().map(|(k, v)| (*k, v.as_str())));

        {
            let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(counter) = counters.get(&key) {
                counter.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counts_are_keyed_by_name_and_dimensions() {
        let registry = InMemoryRegistry::new();

        registry.increment("authorization", &[("descriptionClass", "A".into()), ("success", "true".into())]);
        registry.increment("authorization", &[("success", "true".into()), ("descriptionClass", "A".into())]);
        registry.increment("authorization", &[("descriptionClass", "A".into()), ("success", "false".into())]);

        assert_eq!(registry.count("authorization", &[("descriptionClass", "A"), ("success", "true")]), 2);
        assert_eq!(registry.count("authorization", &[("success", "false"), ("descriptionClass", "A")]), 1);
        assert_eq!(registry.count("authorization", &[("descriptionClass", "B")]), 0);
        assert_eq!(registry.total("authorization"), 3);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let registry = Arc::new(InMemoryRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        registry.increment("authorization", &[("success", "true".into())]);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.count("authorization", &[("success", "true")]), 8_000);
    }

    #[test]
    fn metrics_registry_without_recorder_is_a_no_op() {
        MetricsRegistry.increment("authorization", &[("success", "true".into())]);
    }
}
