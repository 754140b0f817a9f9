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

//! Results handed back to the host after a collection cycle.

use scriptgauge_core::telemetry::{GaugeDescriptor, MetricId, Observation};
use serde::Serialize;
use std::time::{Duration, SystemTime};

/// The last known state of one registered gauge.
///
/// A gauge keeps its previous value when a cycle skips it; `last_observed`
/// tells how fresh that value is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSnapshot {
    /// The series identifier.
    pub id: MetricId,
    /// The metadata the gauge was registered with.
    pub descriptor: GaugeDescriptor,
    /// The last observed value, `None` until the first successful sample.
    pub value: Option<i64>,
    /// When `value` was observed.
    pub last_observed: Option<SystemTime>,
}

impl GaugeSnapshot {
    /// Creates a snapshot for a freshly registered gauge with no value yet.
    pub fn new(id: MetricId, descriptor: GaugeDescriptor) -> Self {
        Self {
            id,
            descriptor,
            value: None,
            last_observed: None,
        }
    }

    /// Applies an observation to the snapshot.
    pub fn record(&mut self, observation: &Observation) {
        self.value = Some(observation.value);
        self.last_observed = Some(observation.observed_at);
    }
}

/// What a single collection cycle produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionReport {
    /// One entry per gauge whose callback reported a value.
    pub observations: Vec<Observation>,
    /// Gauges whose callback reported nothing (or panicked) this cycle.
    pub skipped: Vec<MetricId>,
    /// Wall time spent invoking the callbacks.
    pub duration: Duration,
}

impl CollectionReport {
    /// Returns the value observed for the named gauge in this cycle.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.observations
            .iter()
            .find(|observation| observation.id.name == name)
            .map(|observation| observation.value)
    }

    /// Returns `true` if the named gauge was skipped in this cycle.
    pub fn was_skipped(&self, name: &str) -> bool {
        self.skipped.iter().any(|id| id.name == name)
    }
}
