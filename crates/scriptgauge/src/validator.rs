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

//! Admission checks for new metric definitions.

use crate::definition::{MetricDefinition, MetricKind};
use crate::error::ValidationError;
use crate::executor::ScriptExecutor;
use std::fs;

/// Gates admission of a definition into the store.
///
/// Checks run once, when a definition is added. A script that breaks later
/// is only noticed by the sampling path, which skips it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    executor: ScriptExecutor,
}

impl Validator {
    /// Creates a validator that runs trial executions with `executor`.
    pub fn new(executor: ScriptExecutor) -> Self {
        Self { executor }
    }

    /// Checks the kind, the name, that the script exists, and that one trial
    /// run prints an integer.
    pub fn validate(&self, definition: &MetricDefinition) -> Result<(), ValidationError> {
        definition.kind.parse::<MetricKind>()?;

        if definition.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        fs::metadata(&definition.script_path).map_err(|source| {
            ValidationError::ScriptMissing {
                path: definition.script_path.clone(),
                source,
            }
        })?;

        let value = self.executor.execute(&definition.script_path)?;
        log::debug!(
            "Trial run of {} for '{}' returned {}",
            definition.script_path.display(),
            definition.name,
            value
        );
        Ok(())
    }

    /// Rejects a definition whose name is already taken.
    pub fn check_unique(
        existing: &[MetricDefinition],
        definition: &MetricDefinition,
    ) -> Result<(), ValidationError> {
        if existing.iter().any(|d| d.name == definition.name) {
            return Err(ValidationError::DuplicateName(definition.name.clone()));
        }
        Ok(())
    }
}
