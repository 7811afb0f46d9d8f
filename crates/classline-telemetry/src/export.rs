// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metrics facade reporting.
//!
//! Uses the metrics-rs facade so a recorder installed by the host application
//! (Prometheus, statsd) can collect client latency.
//! Without a recorder these are no-ops.

use classline_core::Metric;

use crate::thresholds::LatencyAlert;

/// Report a recorded metric.
pub fn record_duration(metric: &Metric) {
    metrics::histogram!(
        "classline_operation_duration_ms",
        "type" => metric.metric_type.to_string(),
        "success" => if metric.success { "true" } else { "false" },
    )
    .record(metric.duration_ms as f64);
}

/// Report a latency alert.
pub fn record_alert(alert: &LatencyAlert) {
    metrics::counter!(
        "classline_latency_alerts_total",
        "type" => alert.metric_type.to_string(),
    )
    .increment(1);
}
