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

//! # Scriptgauge
//!
//! Exposes the numeric output of external scripts as observable gauges.
//!
//! Metric definitions are admitted into a [`DefinitionStore`] after a
//! [`Validator`] has run their script once. At start-up every stored
//! definition becomes one gauge callback registered with a meter; the meter
//! samples each callback on its own schedule, and a script that fails only
//! costs its own series for that cycle.

pub mod definition;
pub mod error;
pub mod executor;
pub mod exporter;
pub mod prompt;
pub mod sampler;
pub mod settings;
pub mod store;
pub mod validator;

#[cfg(all(test, unix))]
mod test_support;

pub use definition::{DefinitionFile, MetricDefinition, MetricKind};
pub use error::{ConfigError, ExecutionError, ExporterError, Result, ValidationError};
pub use executor::ScriptExecutor;
pub use exporter::Exporter;
pub use sampler::{register_definitions, ScriptGauge};
pub use settings::Settings;
pub use store::DefinitionStore;
pub use validator::Validator;
