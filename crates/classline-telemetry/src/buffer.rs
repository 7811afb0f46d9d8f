// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, persisted collection of recorded metrics.
//!
//! Eviction is FIFO by insertion order, never by timestamp, so a skewed
//! clock cannot make a fresh metric look "oldest". The whole buffer is
//! rewritten to its [`MetricsPersistence`] after every mutation; persistence
//! failures are logged and swallowed.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use classline_core::{Clock, Metadata, Metric, MetricType, MetricsPersistence};
use tracing::{debug, warn};

use crate::export;
use crate::stats::MetricStats;
use crate::thresholds::LatencyAlert;

/// Default cap on stored metrics.
pub const MAX_METRICS_STORED: usize = 1000;

/// Ring buffer of recorded metrics.
pub struct MetricsBuffer {
    metrics: Mutex<VecDeque<Metric>>,
    capacity: usize,
    store: Arc<dyn MetricsPersistence>,
    clock: Arc<dyn Clock>,
    alerts: AtomicU64,
}

impl MetricsBuffer {
    /// Opens the buffer, loading whatever `store` holds.
    ///
    /// A missing blob starts empty. A blob that cannot be read starts empty
    /// with a warning. A blob larger than `capacity` keeps its newest entries.
    pub fn open(
        capacity: usize,
        store: Arc<dyn MetricsPersistence>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let capacity = capacity.max(1);
        let mut metrics: VecDeque<Metric> = match store.load() {
            Ok(Some(loaded)) => loaded.into(),
            Ok(None) => VecDeque::new(),
            Err(e) => {
                warn!(error = %e, "failed to load persisted metrics, starting empty");
                VecDeque::new()
            }
        };
        while metrics.len() > capacity {
            metrics.pop_front();
        }
        debug!(count = metrics.len(), capacity, "metrics buffer opened");

        Self {
            metrics: Mutex::new(metrics),
            capacity,
            store,
            clock,
            alerts: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Metric>> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `metric`, evicting the oldest entries beyond capacity.
    ///
    /// Returns the alert raised if the duration exceeded its type's threshold.
    /// Alerts are advisory and never affect the caller.
    pub fn record(&self, metric: Metric) -> Option<LatencyAlert> {
        let alert = LatencyAlert::check(metric.metric_type, metric.duration_ms);
        export::record_duration(&metric);

        if let Some(alert) = &alert {
            self.alerts.fetch_add(1, Ordering::Relaxed);
            export::record_alert(alert);
            warn!(
                metric_type = %alert.metric_type,
                duration_ms = alert.duration_ms,
                threshold_ms = alert.threshold_ms,
                metadata = ?metric.metadata,
                "operation exceeded latency threshold"
            );
        }

        let mut metrics = self.lock();
        metrics.push_back(metric);
        while metrics.len() > self.capacity {
            metrics.pop_front();
        }
        // Saved under the lock so concurrent writers cannot persist out of order.
        self.persist(metrics.make_contiguous());

        alert
    }

    /// Records a successful point event stamped with the current time.
    pub fn record_point(
        &self,
        metric_type: MetricType,
        duration_ms: u64,
        metadata: Metadata,
    ) -> Option<LatencyAlert> {
        self.record(Metric {
            metric_type,
            duration_ms,
            timestamp: self.clock.now_ms(),
            success: true,
            metadata,
        })
    }

    fn persist(&self, metrics: &[Metric]) {
        if let Err(e) = self.store.save(metrics) {
            warn!(error = %e, count = metrics.len(), "failed to persist metrics");
        }
    }

    /// Statistics over successful metrics of `metric_type`. `None` means no data.
    pub fn stats(&self, metric_type: MetricType) -> Option<MetricStats> {
        let durations: Vec<u64> = self
            .lock()
            .iter()
            .filter(|m| m.metric_type == metric_type && m.success)
            .map(|m| m.duration_ms)
            .collect();
        MetricStats::from_durations(durations)
    }

    /// Statistics for every type that has successful samples.
    pub fn summary(&self) -> BTreeMap<MetricType, MetricStats> {
        let mut by_type: BTreeMap<MetricType, Vec<u64>> = BTreeMap::new();
        for metric in self.lock().iter().filter(|m| m.success) {
            by_type
                .entry(metric.metric_type)
                .or_default()
                .push(metric.duration_ms);
        }
        by_type
            .into_iter()
            .filter_map(|(t, durations)| MetricStats::from_durations(durations).map(|s| (t, s)))
            .collect()
    }

    /// Up to `limit` metrics, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Metric> {
        self.lock().iter().rev().take(limit).cloned().collect()
    }

    /// All metrics in insertion order.
    pub fn snapshot(&self) -> Vec<Metric> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of latency alerts raised since the buffer was opened.
    pub fn alert_count(&self) -> u64 {
        self.alerts.load(Ordering::Relaxed)
    }

    /// Empties the buffer and removes the persisted copy.
    pub fn clear(&self) {
        self.lock().clear();
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "failed to remove persisted metrics");
        }
    }
}

#[cfg(test)]
mod tests {
    use classline_core::ManualClock;
    use tracing_test::traced_test;

    use super::*;
    use crate::persistence::MemoryStore;

    fn metric(metric_type: MetricType, duration_ms: u64, success: bool) -> Metric {
        Metric {
            metric_type,
            duration_ms,
            timestamp: 0,
            success,
            metadata: Metadata::new(),
        }
    }

    fn buffer(capacity: usize, store: Arc<MemoryStore>) -> MetricsBuffer {
        MetricsBuffer::open(capacity, store, Arc::new(ManualClock::new(0)))
    }

    #[test]
    fn evicts_oldest_inserted_first() {
        let buf = buffer(3, Arc::new(MemoryStore::new()));
        for d in 1..=5 {
            buf.record(metric(MetricType::PageLoad, d, true));
        }
        let durations: Vec<u64> = buf.snapshot().iter().map(|m| m.duration_ms).collect();
        assert_eq!(durations, vec![3, 4, 5]);
    }

    #[test]
    fn eviction_ignores_timestamps() {
        let buf = buffer(2, Arc::new(MemoryStore::new()));
        let mut late = metric(MetricType::PageLoad, 1, true);
        late.timestamp = 9_999;
        let mut early = metric(MetricType::PageLoad, 2, true);
        early.timestamp = 1;
        buf.record(late);
        buf.record(early);
        buf.record(metric(MetricType::PageLoad, 3, true));
        let durations: Vec<u64> = buf.snapshot().iter().map(|m| m.duration_ms).collect();
        assert_eq!(durations, vec![2, 3]);
    }

    #[test]
    fn stats_only_count_successes_of_the_type() {
        let buf = buffer(100, Arc::new(MemoryStore::new()));
        for d in [10, 20, 30, 40, 50] {
            buf.record(metric(MetricType::MessageSend, d, true));
        }
        buf.record(metric(MetricType::MessageSend, 9_000, false));
        buf.record(metric(MetricType::RoomSwitch, 1, true));

        let stats = buf.stats(MetricType::MessageSend).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.p50, 30);
        assert_eq!(stats.p95, 50);
        assert_eq!(stats.p99, 50);
        assert_eq!(stats.max, 50);
    }

    #[test]
    fn stats_with_no_data_is_none() {
        let buf = buffer(10, Arc::new(MemoryStore::new()));
        assert!(buf.stats(MetricType::ImageUpload).is_none());
        buf.record(metric(MetricType::ImageUpload, 100, false));
        assert!(buf.stats(MetricType::ImageUpload).is_none());
        assert!(buf.summary().is_empty());
    }

    #[test]
    fn summary_covers_each_type_with_data() {
        let buf = buffer(10, Arc::new(MemoryStore::new()));
        buf.record(metric(MetricType::RoomSwitch, 5, true));
        buf.record(metric(MetricType::MessageSend, 7, true));
        let summary = buf.summary();
        let types: Vec<MetricType> = summary.keys().copied().collect();
        assert_eq!(types, vec![MetricType::MessageSend, MetricType::RoomSwitch]);
    }

    #[test]
    fn recent_is_newest_first() {
        let buf = buffer(10, Arc::new(MemoryStore::new()));
        for d in 1..=4 {
            buf.record(metric(MetricType::PageLoad, d, true));
        }
        let recent: Vec<u64> = buf.recent(2).iter().map(|m| m.duration_ms).collect();
        assert_eq!(recent, vec![4, 3]);
    }

    #[test]
    fn every_record_is_persisted_and_reloaded() {
        let store = Arc::new(MemoryStore::new());
        {
            let buf = buffer(10, store.clone());
            buf.record(metric(MetricType::PageLoad, 11, true));
            buf.record(metric(MetricType::PageLoad, 12, true));
        }
        let reopened = buffer(10, store);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.snapshot()[1].duration_ms, 12);
    }

    #[test]
    fn oversized_blob_is_truncated_on_open() {
        let store = Arc::new(MemoryStore::new());
        {
            let buf = buffer(10, store.clone());
            for d in 1..=10 {
                buf.record(metric(MetricType::PageLoad, d, true));
            }
        }
        let smaller = buffer(4, store);
        let durations: Vec<u64> = smaller.snapshot().iter().map(|m| m.duration_ms).collect();
        assert_eq!(durations, vec![7, 8, 9, 10]);
    }

    #[traced_test]
    #[test]
    fn persistence_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let buf = buffer(10, store);
        buf.record(metric(MetricType::PageLoad, 1, true));
        assert_eq!(buf.len(), 1);
        assert!(logs_contain("failed to persist metrics"));

        buf.clear();
        assert!(buf.is_empty());
        assert!(logs_contain("failed to remove persisted metrics"));
    }

    #[traced_test]
    #[test]
    fn corrupt_blob_starts_empty() {
        let store = Arc::new(MemoryStore::with_blob("{{{"));
        let buf = buffer(10, store);
        assert!(buf.is_empty());
        assert!(logs_contain("failed to load persisted metrics"));
    }

    #[traced_test]
    #[test]
    fn slow_operation_raises_alert() {
        let buf = buffer(10, Arc::new(MemoryStore::new()));
        assert!(buf.record(metric(MetricType::RoomSwitch, 2_000, true)).is_none());
        let alert = buf.record(metric(MetricType::RoomSwitch, 2_001, true)).unwrap();
        assert_eq!(alert.threshold_ms, 2_000);
        assert_eq!(buf.alert_count(), 1);
        assert!(logs_contain("operation exceeded latency threshold"));
    }

    #[test]
    fn clear_removes_persisted_copy() {
        let store = Arc::new(MemoryStore::new());
        let buf = buffer(10, store.clone());
        buf.record(metric(MetricType::PageLoad, 1, true));
        assert!(store.raw().is_some());
        buf.clear();
        assert!(store.raw().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn record_point_uses_clock() {
        let clock = Arc::new(ManualClock::new(42));
        let buf = MetricsBuffer::open(10, Arc::new(MemoryStore::new()), clock);
        buf.record_point(MetricType::PageLoad, 900, Metadata::new());
        let m = &buf.snapshot()[0];
        assert_eq!(m.timestamp, 42);
        assert!(m.success);
        assert_eq!(m.duration_ms, 900);
    }
}
