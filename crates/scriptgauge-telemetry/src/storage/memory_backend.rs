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

use crate::metrics::report::GaugeSnapshot;
use crate::storage::backend::MetricsBackend;
use scriptgauge_core::telemetry::{MetricId, MetricsError, MetricsResult};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory gauge backend using RwLock<HashMap>
///
/// Reads (snapshots, exports) can proceed concurrently; each collection
/// cycle takes the write lock once per recorded observation.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    storage: RwLock<HashMap<MetricId, GaugeSnapshot>>,
}

impl InMemoryBackend {
    /// Create a new in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> MetricsResult<RwLockReadGuard<'_, HashMap<MetricId, GaugeSnapshot>>> {
        self.storage
            .read()
            .map_err(|_| MetricsError::StorageError("Failed to acquire read lock".to_string()))
    }

    fn write(&self) -> MetricsResult<RwLockWriteGuard<'_, HashMap<MetricId, GaugeSnapshot>>> {
        self.storage
            .write()
            .map_err(|_| MetricsError::StorageError("Failed to acquire write lock".to_string()))
    }
}

impl MetricsBackend for InMemoryBackend {
    fn put_snapshot(&self, snapshot: GaugeSnapshot) -> MetricsResult<()> {
        self.write()?.insert(snapshot.id.clone(), snapshot);
        Ok(())
    }

    fn get_snapshot(&self, id: &MetricId) -> MetricsResult<GaugeSnapshot> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
    }

    fn list_all_snapshots(&self) -> Vec<GaugeSnapshot> {
        self.read()
            .map(|storage| storage.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptgauge_core::telemetry::{GaugeDescriptor, Observation};
    use std::sync::Arc;
    use std::thread;

    fn snapshot(name: &str) -> GaugeSnapshot {
        GaugeSnapshot::new(
            MetricId::new("scriptgauge", name),
            GaugeDescriptor::new(name).with_unit("percent"),
        )
    }

    fn observed(backend: &InMemoryBackend) -> usize {
        backend
            .list_all_snapshots()
            .iter()
            .filter(|s| s.value.is_some())
            .count()
    }

    #[test]
    fn test_put_and_get() {
        let backend = InMemoryBackend::new();
        let load = snapshot("load");
        let id = load.id.clone();

        backend.put_snapshot(load).unwrap();
        assert_eq!(backend.get_snapshot(&id).unwrap().value, None);
        assert!(matches!(
            backend.get_snapshot(&MetricId::new("scriptgauge", "absent")),
            Err(MetricsError::MetricNotFound(_))
        ));
    }

    #[test]
    fn test_record_observation_keeps_last_value() {
        let backend = InMemoryBackend::new();
        let load = snapshot("load");
        let id = load.id.clone();
        backend.put_snapshot(load).unwrap();

        backend
            .record_observation(&Observation::now(id.clone(), 10))
            .unwrap();
        backend
            .record_observation(&Observation::now(id.clone(), 12))
            .unwrap();

        let stored = backend.get_snapshot(&id).unwrap();
        assert_eq!(stored.value, Some(12));
        assert!(stored.last_observed.is_some());
        assert_eq!(observed(&backend), 1);
    }

    #[test]
    fn test_list_all_snapshots() {
        let backend = InMemoryBackend::new();
        backend.put_snapshot(snapshot("a")).unwrap();
        backend.put_snapshot(snapshot("b")).unwrap();

        let mut names: Vec<_> = backend
            .list_all_snapshots()
            .into_iter()
            .map(|s| s.id.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(observed(&backend), 0);
    }

    #[test]
    fn test_concurrent_recording() {
        let backend = Arc::new(InMemoryBackend::new());
        for i in 0..8 {
            backend.put_snapshot(snapshot(&format!("g{i}"))).unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let backend = Arc::clone(&backend);
                thread::spawn(move || {
                    let id = MetricId::new("scriptgauge", format!("g{i}"));
                    backend
                        .record_observation(&Observation::now(id, i as i64))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(observed(&backend), 8);
        let g3 = backend
            .get_snapshot(&MetricId::new("scriptgauge", "g3"))
            .unwrap();
        assert_eq!(g3.value, Some(3));
    }
}
