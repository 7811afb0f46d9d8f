// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-type latency alert thresholds.

use classline_core::MetricType;
use serde::Serialize;

/// Duration above which an operation of the given type raises an alert.
pub const fn alert_threshold_ms(metric_type: MetricType) -> u64 {
    match metric_type {
        MetricType::MessageSend => 3_000,
        MetricType::MessageRealtime => 2_000,
        MetricType::ImageUpload => 15_000,
        MetricType::ImageCompression => 5_000,
        MetricType::RealtimeReconnect => 5_000,
        MetricType::PageLoad => 5_000,
        MetricType::RoomSwitch => 2_000,
    }
}

/// Advisory signal raised when a recorded duration exceeds its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyAlert {
    pub metric_type: MetricType,
    pub duration_ms: u64,
    pub threshold_ms: u64,
}

impl LatencyAlert {
    /// Returns an alert if `duration_ms` is strictly above the threshold.
    pub fn check(metric_type: MetricType, duration_ms: u64) -> Option<Self> {
        let threshold_ms = alert_threshold_ms(metric_type);
        (duration_ms > threshold_ms).then_some(Self {
            metric_type,
            duration_ms,
            threshold_ms,
        })
    }
}
