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

//! The exporter handle: definitions registered with an explicitly owned meter.

use crate::definition::MetricDefinition;
use crate::error::{ExporterError, Result};
use crate::sampler::register_definitions;
use crate::settings::Settings;
use scriptgauge_core::telemetry::{MetricId, MetricsError};
use scriptgauge_telemetry::{CollectionReport, GaugeSnapshot, MetricsRegistry, TelemetryService};
use std::sync::Arc;

/// A running exporter.
///
/// Owns the meter its gauges are registered with. The meter lives as long as
/// the exporter and is flushed by [`Exporter::shutdown`].
#[derive(Debug)]
pub struct Exporter {
    settings: Settings,
    definitions: Vec<MetricDefinition>,
    ids: Vec<MetricId>,
    registry: Arc<MetricsRegistry>,
}

impl Exporter {
    /// Loads the definitions file and registers one gauge per definition.
    ///
    /// A missing definitions file is an error here: there is nothing to export.
    pub fn start(settings: Settings) -> Result<Self> {
        let definitions = settings.store().load()?;
        Self::with_definitions(settings, definitions)
    }

    /// Registers the given definitions without reading the store.
    pub fn with_definitions(settings: Settings, definitions: Vec<MetricDefinition>) -> Result<Self> {
        let registry = Arc::new(MetricsRegistry::new(settings.namespace.clone()));
        let ids = register_definitions(registry.as_ref(), &definitions, settings.executor())?;
        log::info!(
            "Exporting {} metric(s) from {}",
            ids.len(),
            settings.definitions_path.display()
        );

        Ok(Self {
            settings,
            definitions,
            ids,
            registry,
        })
    }

    /// The definitions being exported, in file order.
    pub fn definitions(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    /// Series IDs of the registered gauges, in file order.
    pub fn metric_ids(&self) -> &[MetricId] {
        &self.ids
    }

    /// The meter the gauges are registered with.
    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Samples every gauge once.
    pub fn collect_now(&self) -> Result<CollectionReport> {
        Ok(self.registry.collect()?)
    }

    /// Samples every gauge exactly once and closes the meter.
    ///
    /// The sample is the meter's final flush, so nothing runs a second time.
    pub fn collect_once(&self) -> Result<CollectionReport> {
        self.registry
            .shutdown()?
            .ok_or(ExporterError::Metrics(MetricsError::ShutDown))
    }

    /// Last known value of every gauge.
    pub fn snapshot(&self) -> Vec<GaugeSnapshot> {
        self.registry.snapshot()
    }

    /// A service collecting this exporter's meter on the configured interval.
    pub fn service(&self) -> TelemetryService {
        TelemetryService::new(Arc::clone(&self.registry), self.settings.collect_interval)
    }

    /// Flushes a final cycle and closes the meter. Idempotent.
    pub fn shutdown(&self) -> Result<Option<CollectionReport>> {
        Ok(self.registry.shutdown()?)
    }
}
