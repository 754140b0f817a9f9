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
use scriptgauge_core::telemetry::{MetricId, MetricsResult, Observation};
use std::fmt::Debug;

/// Trait defining the interface for gauge storage backends
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Store or replace a gauge snapshot
    fn put_snapshot(&self, snapshot: GaugeSnapshot) -> MetricsResult<()>;

    /// Retrieve a gauge snapshot by ID
    fn get_snapshot(&self, id: &MetricId) -> MetricsResult<GaugeSnapshot>;

    /// Get all snapshots (potentially expensive operation)
    fn list_all_snapshots(&self) -> Vec<GaugeSnapshot>;

    /// Record an observation as the series' last known value
    fn record_observation(&self, observation: &Observation) -> MetricsResult<()> {
        let mut snapshot = self.get_snapshot(&observation.id)?;
        snapshot.record(observation);
        self.put_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptgauge_core::telemetry::MetricsError;

    // Mock backend for testing
    #[derive(Debug)]
    struct MockBackend;

    impl MetricsBackend for MockBackend {
        fn put_snapshot(&self, _snapshot: GaugeSnapshot) -> MetricsResult<()> {
            Ok(())
        }

        fn get_snapshot(&self, id: &MetricId) -> MetricsResult<GaugeSnapshot> {
            Err(MetricsError::MetricNotFound(id.clone()))
        }

        fn list_all_snapshots(&self) -> Vec<GaugeSnapshot> {
            Vec::new()
        }
    }

    #[test]
    fn test_record_on_unknown_metric_fails() {
        let backend = MockBackend;
        let id = MetricId::new("scriptgauge", "load");
        let result = backend.record_observation(&Observation::now(id.clone(), 1));

        assert_eq!(result, Err(MetricsError::MetricNotFound(id)));
        assert!(backend.list_all_snapshots().is_empty());
    }
}
