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

//! The registration contract between the exporter and a meter.
//!
//! Gauges are *observable*: the exporter never pushes values. It registers a
//! callback once, and the meter invokes it each time it decides to collect.

use crate::telemetry::metrics::{GaugeDescriptor, MetricId, MetricsResult};
use std::fmt::Debug;
use std::sync::Arc;

/// Receives the values reported by a gauge callback during one collection cycle.
pub trait GaugeObserver {
    /// Reports a value for the gauge being collected.
    fn observe(&mut self, value: i64);
}

/// A sampling function invoked by the meter on every collection cycle.
///
/// A callback reports zero or one value through the observer it is given.
/// Meters may invoke callbacks of different gauges concurrently.
pub type GaugeCallback = Arc<dyn Fn(&mut dyn GaugeObserver) + Send + Sync>;

/// The core trait for a meter that hosts observable gauges.
///
/// A `Meter` is an explicitly constructed handle, typically a
/// `MetricsRegistry` from `scriptgauge-telemetry`, that owns the collection
/// schedule. Registrants only provide callbacks.
pub trait Meter: Send + Sync + Debug {
    /// Registers an integer-valued observable gauge and returns its series ID.
    fn register_int_gauge(
        &self,
        descriptor: GaugeDescriptor,
        callback: GaugeCallback,
    ) -> MetricsResult<MetricId>;
}
