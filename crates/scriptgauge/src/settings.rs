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

//! Runtime settings of the exporter.

use crate::executor::{ScriptExecutor, DEFAULT_SCRIPT_TIMEOUT};
use crate::store::DefinitionStore;
use std::path::PathBuf;
use std::time::Duration;

/// Definitions file used when none is given.
pub const DEFAULT_DEFINITIONS_FILE: &str = "scriptgauge.json";

/// Interval between collection cycles of `scriptgauge run`.
pub const DEFAULT_COLLECT_INTERVAL: Duration = Duration::from_secs(15);

/// Namespace of every exported series.
pub const METER_NAMESPACE: &str = "scriptgauge";

/// Where definitions live and how scripts are run and collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// The definitions file.
    pub definitions_path: PathBuf,
    /// Execution deadline for each script run, `None` for no deadline.
    pub script_timeout: Option<Duration>,
    /// Interval between collection cycles.
    pub collect_interval: Duration,
    /// Namespace of the meter the gauges are registered with.
    pub namespace: String,
}

impl Settings {
    /// Settings for the given definitions file, everything else defaulted.
    pub fn new(definitions_path: impl Into<PathBuf>) -> Self {
        Self {
            definitions_path: definitions_path.into(),
            ..Self::default()
        }
    }

    /// Sets the script deadline from whole seconds; `0` disables it.
    pub fn with_script_timeout_secs(mut self, secs: u64) -> Self {
        self.script_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    /// Sets the script deadline.
    pub fn with_script_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// Sets the collection interval.
    pub fn with_collect_interval(mut self, interval: Duration) -> Self {
        self.collect_interval = interval;
        self
    }

    /// The executor scripts are run with.
    pub fn executor(&self) -> ScriptExecutor {
        ScriptExecutor::new(self.script_timeout)
    }

    /// The store backed by the definitions file.
    pub fn store(&self) -> DefinitionStore {
        DefinitionStore::new(self.definitions_path.clone())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            definitions_path: PathBuf::from(DEFAULT_DEFINITIONS_FILE),
            script_timeout: Some(DEFAULT_SCRIPT_TIMEOUT),
            collect_interval: DEFAULT_COLLECT_INTERVAL,
            namespace: METER_NAMESPACE.to_string(),
        }
    }
}
