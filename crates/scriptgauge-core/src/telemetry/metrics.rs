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

//! Abstract definitions for exported metrics.

use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::time::SystemTime;

/// A unique, structured identifier for a metric series.
///
/// The namespace is the name of the meter that owns the series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetricId {
    /// The meter the metric belongs to (e.g., "scriptgauge").
    pub namespace: String,
    /// The specific name of the metric (e.g., "load", "disk_free").
    pub name: String,
}

impl MetricId {
    /// Creates a new `MetricId` with a namespace and a name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Descriptive, static metadata of an observable gauge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GaugeDescriptor {
    /// The name the gauge is registered under.
    pub name: String,
    /// A human-readable description of what the gauge measures.
    pub description: String,
    /// The unit of measurement (e.g., "percent", "bytes").
    pub unit: String,
}

impl GaugeDescriptor {
    /// Creates a descriptor with an empty description and unit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

/// A single value reported by a gauge callback during one collection cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// The series the value belongs to.
    pub id: MetricId,
    /// The observed value.
    pub value: i64,
    /// Wall-clock time at which the value was handed to the meter.
    pub observed_at: SystemTime,
}

impl Observation {
    /// Creates an observation stamped with the current time.
    pub fn now(id: MetricId, value: i64) -> Self {
        Self {
            id,
            value,
            observed_at: SystemTime::now(),
        }
    }
}

/// A specialized `Result` type for metric-related operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// An error that can occur within the metrics system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// The requested metric was not found in the registry.
    MetricNotFound(MetricId),
    /// A metric with the same name is already registered with the meter.
    DuplicateMetric(String),
    /// The metric name cannot be used for registration.
    InvalidName(String),
    /// The meter has been shut down and no longer accepts work.
    ShutDown,
    /// A collection cycle could not be carried out.
    CollectionFailed(String),
    /// An error originating from the backend storage layer.
    StorageError(String),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::MetricNotFound(id) => write!(f, "Metric not found: {id}"),
            MetricsError::DuplicateMetric(name) => {
                write!(f, "Metric already registered: {name}")
            }
            MetricsError::InvalidName(name) => write!(f, "Invalid metric name: {name:?}"),
            MetricsError::ShutDown => write!(f, "Meter has been shut down"),
            MetricsError::CollectionFailed(msg) => write!(f, "Collection failed: {msg}"),
            MetricsError::StorageError(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for MetricsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_id_formatting() {
        let id = MetricId::new("scriptgauge", "load");
        assert_eq!(id.namespace, "scriptgauge");
        assert_eq!(id.name, "load");
        assert_eq!(id.to_string(), "scriptgauge:load");
    }

    #[test]
    fn test_metric_id_orders_by_namespace_then_name() {
        let mut ids = vec![
            MetricId::new("scriptgauge", "temp"),
            MetricId::new("other", "zzz"),
            MetricId::new("scriptgauge", "load"),
        ];
        ids.sort();

        let names: Vec<_> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["other:zzz", "scriptgauge:load", "scriptgauge:temp"]);
    }

    #[test]
    fn test_descriptor_builder() {
        let descriptor = GaugeDescriptor::new("load")
            .with_description("System load")
            .with_unit("percent");

        assert_eq!(descriptor.name, "load");
        assert_eq!(descriptor.description, "System load");
        assert_eq!(descriptor.unit, "percent");
    }

    #[test]
    fn test_observation_serializes_id_and_value() {
        let observation = Observation::now(MetricId::new("scriptgauge", "load"), 42);
        let json = serde_json::to_value(&observation).unwrap();

        assert_eq!(json["id"]["name"], "load");
        assert_eq!(json["value"], 42);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            MetricsError::DuplicateMetric("load".into()).to_string(),
            "Metric already registered: load"
        );
        assert_eq!(
            MetricsError::MetricNotFound(MetricId::new("scriptgauge", "load")).to_string(),
            "Metric not found: scriptgauge:load"
        );
    }
}
