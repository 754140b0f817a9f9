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

//! # Scriptgauge Telemetry
//!
//! The meter side of the exporter: a registry of observable gauges that runs
//! collection cycles on demand, a storage backend for the last known value of
//! every series, and a service that drives collection on an interval.

pub mod metrics;
pub mod service;
pub mod storage;

pub use metrics::registry::MetricsRegistry;
pub use metrics::report::{CollectionReport, GaugeSnapshot};
pub use service::TelemetryService;
pub use storage::{backend::MetricsBackend, memory_backend::InMemoryBackend};
