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

//! Turns metric definitions into observable gauge callbacks.

use crate::definition::MetricDefinition;
use crate::error::{ExporterError, Result};
use crate::executor::ScriptExecutor;
use scriptgauge_core::telemetry::{GaugeCallback, GaugeObserver, Meter, MetricId};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything one gauge callback needs to take a sample.
///
/// Each registered callback owns its own `ScriptGauge`, so callbacks share no
/// state and can be invoked concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptGauge {
    name: String,
    script_path: PathBuf,
    executor: ScriptExecutor,
}

impl ScriptGauge {
    /// Binds a gauge to the script of `definition`.
    pub fn new(definition: &MetricDefinition, executor: ScriptExecutor) -> Self {
        Self {
            name: definition.name.clone(),
            script_path: definition.script_path.clone(),
            executor,
        }
    }

    /// The metric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The script run on every sample.
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    /// Runs the script once. Fractional output is truncated toward zero.
    ///
    /// Failures, including values too large for an `i64`, are logged and
    /// yield `None`; they never reach the caller.
    pub fn sample(&self) -> Option<i64> {
        match self.executor.execute_truncated(&self.script_path) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Skipping metric '{}' this cycle: {}", self.name, e);
                None
            }
        }
    }

    /// Wraps the gauge into a callback reporting at most one value per call.
    pub fn into_callback(self: Arc<Self>) -> GaugeCallback {
        Arc::new(move |observer: &mut dyn GaugeObserver| {
            if let Some(value) = self.sample() {
                observer.observe(value);
            }
        })
    }
}

/// Registers one observable gauge per definition with `meter`.
///
/// Stops at the first registration the meter refuses.
pub fn register_definitions(
    meter: &dyn Meter,
    definitions: &[MetricDefinition],
    executor: ScriptExecutor,
) -> Result<Vec<MetricId>> {
    definitions
        .iter()
        .map(|definition| {
            let gauge = Arc::new(ScriptGauge::new(definition, executor));
            meter
                .register_int_gauge(definition.descriptor(), gauge.into_callback())
                .map_err(|source| ExporterError::Registration {
                    name: definition.name.clone(),
                    source,
                })
        })
        .collect()
}
