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

//! Service that drives periodic collection of a metrics registry.

use crate::metrics::registry::MetricsRegistry;
use crate::metrics::report::CollectionReport;
use scriptgauge_core::telemetry::{MetricsError, MetricsResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Service for collecting a registry on a fixed interval.
///
/// This is the pull side of the meter: it decides *when* to collect, while
/// the registry decides *how*. Collection itself is blocking, so each cycle
/// runs on tokio's blocking pool.
#[derive(Debug)]
pub struct TelemetryService {
    registry: Arc<MetricsRegistry>,
    update_interval: Duration,
}

impl TelemetryService {
    /// Creates a new telemetry service with the given update interval.
    pub fn new(registry: Arc<MetricsRegistry>, update_interval: Duration) -> Self {
        Self {
            registry,
            update_interval,
        }
    }

    /// Returns a reference to the metrics registry.
    pub fn metrics_registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Returns the collection interval.
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Collects once right away, then every interval, handing each report to
    /// `on_report`, until `shutdown` resolves. The registry is then shut
    /// down, and the report of its final flush is returned.
    ///
    /// A cycle that fails is logged and does not stop the loop.
    pub async fn run_until<F, R>(
        self,
        shutdown: F,
        mut on_report: R,
    ) -> MetricsResult<Option<CollectionReport>>
    where
        F: Future<Output = ()>,
        R: FnMut(&CollectionReport),
    {
        let mut interval = tokio::time::interval(self.update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        log::info!(
            "Collecting {} gauge(s) every {:?}",
            self.registry.gauge_count(),
            self.update_interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    let registry = Arc::clone(&self.registry);
                    match blocking(move || registry.collect()).await {
                        Ok(report) => on_report(&report),
                        Err(e) => log::error!("Collection cycle failed: {}", e),
                    }
                }
            }
        }

        log::trace!("Shutdown requested, flushing final cycle");
        let registry = Arc::clone(&self.registry);
        blocking(move || registry.shutdown()).await
    }
}

async fn blocking<T, F>(work: F) -> MetricsResult<T>
where
    F: FnOnce() -> MetricsResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MetricsError::CollectionFailed(format!("collection task failed: {e}")))?
}
