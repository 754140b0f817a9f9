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

//! Provides the foundational traits and data structures for exporter telemetry.
//!
//! This module defines the "common language" between the exporter and the
//! meter that collects from it. `scriptgauge` registers observable gauges
//! through the [`Meter`] trait, while `scriptgauge-telemetry` provides the
//! concrete meter that invokes their callbacks on each collection cycle.

pub mod meter;
pub mod metrics;

pub use self::meter::{GaugeCallback, GaugeObserver, Meter};
pub use self::metrics::{GaugeDescriptor, MetricId, MetricsError, MetricsResult, Observation};
