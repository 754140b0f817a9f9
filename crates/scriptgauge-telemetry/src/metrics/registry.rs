// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Registry of observable gauges.

use crate::metrics::report::{CollectionReport, GaugeSnapshot};
use crate::storage::{backend::MetricsBackend, memory_backend::InMemoryBackend};
use scriptgauge_core::telemetry::{
    GaugeCallback, GaugeDescriptor, GaugeObserver, Meter, MetricId, MetricsError, MetricsResult,
    Observation,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Instant;

/// A registered gauge and the callback that samples it.
struct ObservableGauge {
    id: MetricId,
    descriptor: GaugeDescriptor,
    callback: GaugeCallback,
}

impl ObservableGauge {
    fn sample(&self) -> Option<i64> {
        let mut observer = LastValue::default();
        (self.callback)(&mut observer);
        if observer.count > 1 {
            log::debug!(
                "Gauge '{}' reported {} values in one cycle; keeping the last",
                self.id,
                observer.count
            );
        }
        observer.value
    }
}

impl fmt::Debug for ObservableGauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableGauge")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct LastValue {
    value: Option<i64>,
    count: usize,
}

impl GaugeObserver for LastValue {
    fn observe(&mut self, value: i64) {
        self.value = Some(value);
        self.count += 1;
    }
}

/// Central registry for observable gauges.
///
/// The registry is the meter handle the exporter registers against. It owns
/// no timer: a host calls [`MetricsRegistry::collect`] whenever it wants a
/// fresh set of values, and every registered callback is invoked once, on its
/// own thread, so a slow or panicking callback only costs its own series.
#[derive(Debug)]
pub struct MetricsRegistry {
    namespace: String,
    backend: Arc<dyn MetricsBackend>,
    gauges: RwLock<Vec<Arc<ObservableGauge>>>,
    cycle: Mutex<()>,
    shut_down: AtomicBool,
}

impl MetricsRegistry {
    /// Create a new registry with the default in-memory backend
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_backend(namespace, Arc::new(InMemoryBackend::new()))
    }

    /// Create a new registry with a custom backend
    pub fn with_backend(namespace: impl Into<String>, backend: Arc<dyn MetricsBackend>) -> Self {
        Self {
            namespace: namespace.into(),
            backend,
            gauges: RwLock::new(Vec::new()),
            cycle: Mutex::new(()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// The namespace every series of this registry lives in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of registered gauges.
    pub fn gauge_count(&self) -> usize {
        self.gauges.read().map(|gauges| gauges.len()).unwrap_or(0)
    }

    /// Whether [`MetricsRegistry::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Runs one collection cycle and records every observation as its
    /// series' last known value.
    pub fn collect(&self) -> MetricsResult<CollectionReport> {
        if self.is_shut_down() {
            return Err(MetricsError::ShutDown);
        }
        self.run_cycle()
    }

    /// Last known state of every gauge, sorted by series ID.
    pub fn snapshot(&self) -> Vec<GaugeSnapshot> {
        let mut snapshots = self.backend.list_all_snapshots();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    /// Last known state of a single gauge.
    pub fn get_snapshot(&self, id: &MetricId) -> MetricsResult<GaugeSnapshot> {
        self.backend.get_snapshot(id)
    }

    /// Flushes a final cycle and stops accepting registrations and collections.
    ///
    /// Only the first call flushes; later calls return `Ok(None)`.
    pub fn shutdown(&self) -> MetricsResult<Option<CollectionReport>> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        log::info!("Shutting down meter '{}'", self.namespace);
        self.run_cycle().map(Some)
    }

    fn run_cycle(&self) -> MetricsResult<CollectionReport> {
        let _cycle = self
            .cycle
            .lock()
            .map_err(|_| MetricsError::CollectionFailed("collection lock poisoned".to_string()))?;
        let gauges = self
            .gauges
            .read()
            .map_err(|_| MetricsError::CollectionFailed("gauge list poisoned".to_string()))?
            .clone();

        let started = Instant::now();
        let outcomes: Vec<(&Arc<ObservableGauge>, Option<i64>)> = thread::scope(|scope| {
            let handles: Vec<_> = gauges
                .iter()
                .map(|gauge| (gauge, scope.spawn(move || gauge.sample())))
                .collect();

            handles
                .into_iter()
                .map(|(gauge, handle)| match handle.join() {
                    Ok(value) => (gauge, value),
                    Err(_) => {
                        log::error!("Callback of gauge '{}' panicked; skipping it", gauge.id);
                        (gauge, None)
                    }
                })
                .collect()
        });

        let mut report = CollectionReport::default();
        for (gauge, value) in outcomes {
            match value {
                Some(value) => {
                    let observation = Observation::now(gauge.id.clone(), value);
                    if let Err(e) = self.backend.record_observation(&observation) {
                        log::error!("Failed to store value of '{}': {}", gauge.id, e);
                    }
                    report.observations.push(observation);
                }
                None => report.skipped.push(gauge.id.clone()),
            }
        }
        report.duration = started.elapsed();

        log::debug!(
            "Collected {} gauge(s), skipped {} in {:.2?}",
            report.observations.len(),
            report.skipped.len(),
            report.duration
        );
        Ok(report)
    }
}

impl Meter for MetricsRegistry {
    fn register_int_gauge(
        &self,
        descriptor: GaugeDescriptor,
        callback: GaugeCallback,
    ) -> MetricsResult<MetricId> {
        if self.is_shut_down() {
            return Err(MetricsError::ShutDown);
        }
        if descriptor.name.trim().is_empty() {
            return Err(MetricsError::InvalidName(descriptor.name));
        }

        let mut gauges = self
            .gauges
            .write()
            .map_err(|_| MetricsError::StorageError("gauge list poisoned".to_string()))?;
        if gauges.iter().any(|g| g.descriptor.name == descriptor.name) {
            return Err(MetricsError::DuplicateMetric(descriptor.name));
        }

        let id = MetricId::new(self.namespace.clone(), descriptor.name.clone());
        self.backend
            .put_snapshot(GaugeSnapshot::new(id.clone(), descriptor.clone()))?;
        gauges.push(Arc::new(ObservableGauge {
            id: id.clone(),
            descriptor,
            callback,
        }));
        log::info!("Registered observable gauge: {}", id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn constant(value: i64) -> GaugeCallback {
        Arc::new(move |observer: &mut dyn GaugeObserver| observer.observe(value))
    }

    /// Stores everything except observations of one series.
    #[derive(Debug)]
    struct RefusingBackend {
        inner: InMemoryBackend,
        refused: &'static str,
    }

    impl MetricsBackend for RefusingBackend {
        fn put_snapshot(&self, snapshot: GaugeSnapshot) -> MetricsResult<()> {
            if snapshot.id.name == self.refused && snapshot.value.is_some() {
                return Err(MetricsError::StorageError("disk full".to_string()));
            }
            self.inner.put_snapshot(snapshot)
        }

        fn get_snapshot(&self, id: &MetricId) -> MetricsResult<GaugeSnapshot> {
            self.inner.get_snapshot(id)
        }

        fn list_all_snapshots(&self) -> Vec<GaugeSnapshot> {
            self.inner.list_all_snapshots()
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new("scriptgauge");
        assert_eq!(registry.gauge_count(), 0);
        assert_eq!(registry.namespace(), "scriptgauge");
        assert!(registry.collect().unwrap().observations.is_empty());
    }

    #[test]
    fn test_gauge_registration_and_collection() {
        let registry = MetricsRegistry::new("scriptgauge");
        let id = registry
            .register_int_gauge(
                GaugeDescriptor::new("load")
                    .with_description("System load")
                    .with_unit("percent"),
                constant(42),
            )
            .unwrap();

        assert_eq!(id.to_string(), "scriptgauge:load");
        assert_eq!(registry.get_snapshot(&id).unwrap().value, None);

        let report = registry.collect().unwrap();
        assert_eq!(report.value_of("load"), Some(42));

        let snapshot = registry.get_snapshot(&id).unwrap();
        assert_eq!(snapshot.value, Some(42));
        assert_eq!(snapshot.descriptor.unit, "percent");
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let registry = MetricsRegistry::new("scriptgauge");
        registry
            .register_int_gauge(GaugeDescriptor::new("load"), constant(1))
            .unwrap();

        assert_eq!(
            registry.register_int_gauge(GaugeDescriptor::new("load"), constant(2)),
            Err(MetricsError::DuplicateMetric("load".to_string()))
        );
        assert_eq!(
            registry.register_int_gauge(GaugeDescriptor::new("  "), constant(2)),
            Err(MetricsError::InvalidName("  ".to_string()))
        );
        assert_eq!(registry.gauge_count(), 1);
    }

    #[test]
    fn test_silent_callback_is_skipped_and_keeps_last_value() {
        let registry = MetricsRegistry::new("scriptgauge");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = registry
            .register_int_gauge(
                GaugeDescriptor::new("flaky"),
                Arc::new(move |observer: &mut dyn GaugeObserver| {
                    // Report only on the first call.
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        observer.observe(5);
                    }
                }),
            )
            .unwrap();

        assert_eq!(registry.collect().unwrap().value_of("flaky"), Some(5));

        let second = registry.collect().unwrap();
        assert!(second.was_skipped("flaky"));
        assert_eq!(registry.get_snapshot(&id).unwrap().value, Some(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_callback_is_isolated() {
        let registry = MetricsRegistry::new("scriptgauge");
        registry
            .register_int_gauge(
                GaugeDescriptor::new("broken"),
                Arc::new(|_: &mut dyn GaugeObserver| panic!("sampling blew up")),
            )
            .unwrap();
        registry
            .register_int_gauge(GaugeDescriptor::new("healthy"), constant(9))
            .unwrap();

        let report = registry.collect().unwrap();
        assert_eq!(report.value_of("healthy"), Some(9));
        assert!(report.was_skipped("broken"));
    }

    #[test]
    fn test_storage_failure_does_not_drop_the_cycle() {
        let backend = Arc::new(RefusingBackend {
            inner: InMemoryBackend::new(),
            refused: "broken",
        });
        let registry = MetricsRegistry::with_backend("scriptgauge", backend);
        let healthy = registry
            .register_int_gauge(GaugeDescriptor::new("healthy"), constant(7))
            .unwrap();
        registry
            .register_int_gauge(GaugeDescriptor::new("broken"), constant(8))
            .unwrap();

        let report = registry.collect().unwrap();

        assert_eq!(report.value_of("healthy"), Some(7));
        assert_eq!(report.value_of("broken"), Some(8));
        assert_eq!(registry.get_snapshot(&healthy).unwrap().value, Some(7));
    }

    #[test]
    fn test_callbacks_run_concurrently() {
        let registry = MetricsRegistry::new("scriptgauge");
        for name in ["a", "b", "c", "d"] {
            registry
                .register_int_gauge(
                    GaugeDescriptor::new(name),
                    Arc::new(|observer: &mut dyn GaugeObserver| {
                        thread::sleep(Duration::from_millis(200));
                        observer.observe(1);
                    }),
                )
                .unwrap();
        }

        let report = registry.collect().unwrap();
        assert_eq!(report.observations.len(), 4);
        assert!(report.duration < Duration::from_millis(700));
    }

    #[test]
    fn test_multiple_observations_keep_last() {
        let registry = MetricsRegistry::new("scriptgauge");
        registry
            .register_int_gauge(
                GaugeDescriptor::new("chatty"),
                Arc::new(|observer: &mut dyn GaugeObserver| {
                    observer.observe(1);
                    observer.observe(2);
                }),
            )
            .unwrap();

        let report = registry.collect().unwrap();
        assert_eq!(report.observations.len(), 1);
        assert_eq!(report.value_of("chatty"), Some(2));
    }

    #[test]
    fn test_shutdown_flushes_once() {
        let registry = MetricsRegistry::new("scriptgauge");
        registry
            .register_int_gauge(GaugeDescriptor::new("load"), constant(3))
            .unwrap();

        let flushed = registry.shutdown().unwrap().expect("first shutdown flushes");
        assert_eq!(flushed.value_of("load"), Some(3));
        assert!(registry.shutdown().unwrap().is_none());

        assert_eq!(registry.collect().unwrap_err(), MetricsError::ShutDown);
        assert_eq!(
            registry.register_int_gauge(GaugeDescriptor::new("late"), constant(1)),
            Err(MetricsError::ShutDown)
        );
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let registry = MetricsRegistry::new("scriptgauge");
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register_int_gauge(GaugeDescriptor::new(name), constant(0))
                .unwrap();
        }

        let names: Vec<_> = registry
            .snapshot()
            .into_iter()
            .map(|s| s.id.name)
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
