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

//! The persisted, ordered list of metric definitions.

use crate::definition::{DefinitionFile, MetricDefinition};
use crate::error::{ConfigError, ExporterError, Result};
use crate::validator::Validator;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A JSON file holding every admitted metric definition, in insertion order.
///
/// Definitions read back from the file are trusted: they were validated when
/// they were added. The store is the only writer of its file, and every write
/// replaces the file atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionStore {
    path: PathBuf,
}

impl DefinitionStore {
    /// Creates a store backed by the file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every definition from the file.
    pub fn load(&self) -> Result<Vec<MetricDefinition>, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let file: DefinitionFile =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;
        log::debug!(
            "Loaded {} metric definition(s) from {}",
            file.metrics.len(),
            self.path.display()
        );
        Ok(file.metrics)
    }

    /// Like [`DefinitionStore::load`], but a missing file is an empty store.
    pub fn load_or_default(&self) -> Result<Vec<MetricDefinition>, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound { .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Validates `definition`, appends it, and rewrites the file.
    ///
    /// Nothing is written unless the existing file loads, the definition
    /// passes validation, and its name is not taken.
    pub fn add(&self, definition: MetricDefinition, validator: &Validator) -> Result<()> {
        let mut metrics = self.load_or_default()?;

        validator.validate(&definition)?;
        Validator::check_unique(&metrics, &definition)?;

        log::info!(
            "Admitting metric '{}' backed by {}",
            definition.name,
            definition.script_path.display()
        );
        metrics.push(definition);
        self.save(&DefinitionFile { metrics })
    }

    fn save(&self, file: &DefinitionFile) -> Result<()> {
        let mut contents = serde_json::to_vec_pretty(file).map_err(ExporterError::Encode)?;
        contents.push(b'\n');

        let io_err = |source: io::Error| ExporterError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let permissions = fs::metadata(&self.path)
            .map(|meta| meta.permissions())
            .ok();

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&contents).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        set_permissions(tmp.path(), permissions).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        log::debug!(
            "Wrote {} metric definition(s) to {}",
            file.metrics.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Keeps the mode of the file being replaced; new files get 0644.
#[cfg(unix)]
fn set_permissions(path: &Path, existing: Option<fs::Permissions>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = existing.unwrap_or_else(|| fs::Permissions::from_mode(0o644));
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn set_permissions(path: &Path, existing: Option<fs::Permissions>) -> io::Result<()> {
    match existing {
        Some(permissions) => fs::set_permissions(path, permissions),
        None => Ok(()),
    }
}
