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

//! Error taxonomy of the exporter.
//!
//! Configuration and validation errors abort the operation that raised them.
//! Execution errors abort an admission but are only logged when they happen
//! while sampling.

use scriptgauge_core::telemetry::MetricsError;
use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// A specialized `Result` type for exporter operations.
pub type Result<T, E = ExporterError> = std::result::Result<T, E>;

/// Failure to run a script or to read a number from its output.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to start {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} exited with {status}{}", .path.display(), stderr_suffix(.stderr))]
    Exit {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{} did not finish within {timeout:?} and was killed", .path.display())]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("failed waiting for {}: {source}", .path.display())]
    Wait {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("output of {} is not an integer: {output:?}", .path.display())]
    ParseInt {
        path: PathBuf,
        output: String,
        #[source]
        source: ParseIntError,
    },

    #[error("output of {} is not a finite number: {output:?}", .path.display())]
    ParseFloat { path: PathBuf, output: String },

    #[error("output of {} does not fit a 64-bit gauge: {output:?}", .path.display())]
    OutOfRange { path: PathBuf, output: String },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Failure to read the definitions file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("definitions file {} does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read definitions file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed definitions file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A metric definition refused at admission.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("metric name must not be empty")]
    EmptyName,

    #[error("invalid type: {0}, only 'gauge' is allowed")]
    UnsupportedKind(String),

    #[error("script file {} does not exist: {source}", .path.display())]
    ScriptMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("script execution failed: {0}")]
    ScriptFailed(#[from] ExecutionError),

    #[error("a metric named '{0}' already exists")]
    DuplicateName(String),
}

/// Top-level error of exporter operations.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid metric definition: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to write definitions file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode definitions: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to read metric fields: {0}")]
    Prompt(#[source] io::Error),

    #[error("failed to register gauge '{name}': {source}")]
    Registration {
        name: String,
        #[source]
        source: MetricsError,
    },

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}
