// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate statistics over recorded durations.
//!
//! Percentiles use the nearest-rank method: `sorted[ceil(p/100 * n) - 1]`,
//! clamped into range. No interpolation.

use serde::Serialize;

/// Summary of successful durations for one metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricStats {
    pub count: usize,
    /// Arithmetic mean, rounded to the nearest millisecond.
    pub avg: u64,
    pub min: u64,
    pub max: u64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
}

impl MetricStats {
    /// Computes statistics over `durations`. `None` when there are no samples.
    pub fn from_durations(mut durations: Vec<u64>) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }
        durations.sort_unstable();

        let count = durations.len();
        let sum: u128 = durations.iter().map(|&d| u128::from(d)).sum();
        let avg = (sum as f64 / count as f64).round() as u64;

        Some(Self {
            count,
            avg,
            min: durations[0],
            max: durations[count - 1],
            p50: nearest_rank(&durations, 50),
            p95: nearest_rank(&durations, 95),
            p99: nearest_rank(&durations, 99),
        })
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
pub fn nearest_rank(sorted: &[u64], percentile: u32) -> u64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    let rank = (f64::from(percentile) * n as f64 / 100.0).ceil() as usize;
    sorted[rank.saturating_sub(1).min(n - 1)]
}
