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

//! Metric definitions and the on-disk file that holds them.

use crate::error::ValidationError;
use scriptgauge_core::telemetry::GaugeDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The kinds of metric a definition may declare.
///
/// Only gauges are supported: a script's output is a point-in-time value
/// sampled on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A value that can go up or down, sampled on every collection.
    Gauge,
}

impl MetricKind {
    /// The string stored under the `type` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gauge" => Ok(MetricKind::Gauge),
            other => Err(ValidationError::UnsupportedKind(other.to_string())),
        }
    }
}

/// A metric bound to the script that produces its value.
///
/// The kind is kept as the raw string from the file so an unsupported kind
/// can be reported as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "script_name")]
    pub script_path: PathBuf,
    pub unit: String,
}

impl MetricDefinition {
    /// Creates a gauge definition.
    pub fn gauge(
        name: impl Into<String>,
        description: impl Into<String>,
        script_path: impl Into<PathBuf>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: MetricKind::Gauge.to_string(),
            script_path: script_path.into(),
            unit: unit.into(),
        }
    }

    /// The descriptor this definition is registered with.
    pub fn descriptor(&self) -> GaugeDescriptor {
        GaugeDescriptor::new(self.name.clone())
            .with_description(self.description.clone())
            .with_unit(self.unit.clone())
    }
}

/// Root object of the definitions file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(default)]
    pub metrics: Vec<MetricDefinition>,
}
