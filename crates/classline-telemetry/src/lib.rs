// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side latency telemetry for the Classline realtime client.
//!
//! - [`TimerStore`] correlates the start and end of asynchronous operations.
//! - [`MetricsBuffer`] keeps a bounded, persisted history of [`Metric`]s and
//!   computes nearest-rank percentile statistics per [`MetricType`].
//! - Durations above a per-type threshold raise advisory [`LatencyAlert`]s.
//!
//! Telemetry is best-effort: nothing in this crate returns an error to the
//! business logic that feeds it.
//!
//! [`Metric`]: classline_core::Metric
//! [`MetricType`]: classline_core::MetricType

pub mod buffer;
pub mod export;
pub mod persistence;
pub mod stats;
pub mod thresholds;
pub mod timer;

use std::path::Path;
use std::sync::Arc;

use classline_config::model::TelemetryConfig;
use classline_core::{Clock, MetricsPersistence, SystemClock};

pub use buffer::{MetricsBuffer, MAX_METRICS_STORED};
pub use persistence::{JsonFileStore, MemoryStore};
pub use stats::MetricStats;
pub use thresholds::{alert_threshold_ms, LatencyAlert};
pub use timer::{EndOptions, TimerStore};

/// Handle bundling the metrics buffer and the timer store that feeds it.
///
/// Construct once per process and share by cloning; clones refer to the
/// same buffer and timers.
#[derive(Clone)]
pub struct TelemetryService {
    buffer: Arc<MetricsBuffer>,
    timers: Arc<TimerStore>,
}

impl TelemetryService {
    pub fn new(
        capacity: usize,
        store: Arc<dyn MetricsPersistence>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let buffer = Arc::new(MetricsBuffer::open(capacity, store, clock.clone()));
        let timers = Arc::new(TimerStore::new(buffer.clone(), clock));
        Self { buffer, timers }
    }

    /// Builds the service described by `config`, persisting to
    /// `<data_dir>/<storage_key>.json` unless persistence is disabled.
    pub fn from_config(config: &TelemetryConfig) -> Self {
        let store: Arc<dyn MetricsPersistence> = if config.persist {
            Arc::new(JsonFileStore::new(
                Path::new(&config.data_dir),
                &config.storage_key,
            ))
        } else {
            Arc::new(MemoryStore::new())
        };
        Self::new(config.max_metrics_stored, store, Arc::new(SystemClock))
    }

    /// An unpersisted service with the default capacity.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(MAX_METRICS_STORED, Arc::new(MemoryStore::new()), clock)
    }

    pub fn buffer(&self) -> &Arc<MetricsBuffer> {
        &self.buffer
    }

    pub fn timers(&self) -> &Arc<TimerStore> {
        &self.timers
    }
}

#[cfg(test)]
mod tests {
    use classline_core::{ManualClock, MetricType, OperationId};

    use super::*;

    #[test]
    fn default_capacity_matches_config_default() {
        assert_eq!(TelemetryConfig::default().max_metrics_stored, MAX_METRICS_STORED);
    }

    #[test]
    fn clones_share_state() {
        let clock = Arc::new(ManualClock::new(0));
        let telemetry = TelemetryService::in_memory(clock.clone());
        let other = telemetry.clone();

        let id = OperationId::named("room");
        telemetry.timers().start(&id);
        clock.advance(5);
        other.timers().end(&id, MetricType::RoomSwitch, EndOptions::success());

        assert_eq!(telemetry.buffer().len(), 1);
    }

    #[test]
    fn from_config_persists_to_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = TelemetryConfig {
            max_metrics_stored: 10,
            storage_key: "metrics".to_string(),
            data_dir: dir.path().display().to_string(),
            persist: true,
        };
        let telemetry = TelemetryService::from_config(&config);
        telemetry
            .buffer()
            .record_point(MetricType::PageLoad, 120, Default::default());
        assert!(dir.path().join("metrics.json").exists());

        let reopened = TelemetryService::from_config(&config);
        assert_eq!(reopened.buffer().len(), 1);
    }
}
