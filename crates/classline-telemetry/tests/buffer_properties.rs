// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for the metrics ring buffer.

use std::sync::Arc;

use classline_core::{ManualClock, Metadata, Metric, MetricType};
use classline_telemetry::{MemoryStore, MetricStats, MetricsBuffer};
use proptest::prelude::*;

fn open(capacity: usize) -> MetricsBuffer {
    MetricsBuffer::open(
        capacity,
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(0)),
    )
}

proptest! {
    /// Length never exceeds the cap and the survivors are the newest insertions.
    #[test]
    fn length_bounded_and_oldest_evicted(
        capacity in 1usize..50,
        timestamps in proptest::collection::vec(any::<i64>(), 0..200),
    ) {
        let buffer = open(capacity);
        for (seq, ts) in timestamps.iter().enumerate() {
            buffer.record(Metric {
                metric_type: MetricType::MessageRealtime,
                duration_ms: seq as u64,
                timestamp: *ts,
                success: true,
                metadata: Metadata::new(),
            });
            prop_assert!(buffer.len() <= capacity);
        }

        let kept: Vec<u64> = buffer.snapshot().iter().map(|m| m.duration_ms).collect();
        let total = timestamps.len() as u64;
        let first = total.saturating_sub(capacity as u64);
        let expected: Vec<u64> = (first..total).collect();
        prop_assert_eq!(kept, expected);
    }

    /// Percentiles are ordered and drawn from the samples.
    #[test]
    fn percentiles_are_monotonic(durations in proptest::collection::vec(0u64..100_000, 1..300)) {
        let stats = MetricStats::from_durations(durations.clone()).unwrap();
        prop_assert!(stats.min <= stats.p50);
        prop_assert!(stats.p50 <= stats.p95);
        prop_assert!(stats.p95 <= stats.p99);
        prop_assert!(stats.p99 <= stats.max);
        prop_assert!(stats.min <= stats.avg && stats.avg <= stats.max);
        prop_assert!(durations.contains(&stats.p95));
        prop_assert_eq!(stats.count, durations.len());
    }
}
