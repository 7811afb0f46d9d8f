// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `classline stats`, `recent` and `clear` command implementations.
//!
//! All three read the persisted metrics blob described by the telemetry
//! configuration.

use std::collections::BTreeMap;
use std::io::IsTerminal;

use classline_config::model::TelemetryConfig;
use classline_core::{ClasslineError, Metric, MetricType};
use classline_telemetry::{alert_threshold_ms, MetricStats, TelemetryService};
use serde::Serialize;

/// One row of `stats --json` output.
#[derive(Debug, Serialize)]
struct StatsRow {
    #[serde(rename = "type")]
    metric_type: MetricType,
    threshold_ms: u64,
    #[serde(flatten)]
    stats: MetricStats,
}

/// Run the `classline stats` command.
pub fn run_stats(
    config: &TelemetryConfig,
    only: Option<MetricType>,
    json: bool,
    plain: bool,
) -> Result<(), ClasslineError> {
    let telemetry = TelemetryService::from_config(config);
    let summary = select(telemetry.buffer().summary(), only);

    if json {
        println!("{}", stats_json(&summary)?);
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", stats_table(&summary, telemetry.buffer().len(), use_color));
    }
    Ok(())
}

/// Run the `classline recent` command.
pub fn run_recent(config: &TelemetryConfig, limit: usize, json: bool) -> Result<(), ClasslineError> {
    let telemetry = TelemetryService::from_config(config);
    let recent = telemetry.buffer().recent(limit);

    if json {
        let out = serde_json::to_string_pretty(&recent)
            .map_err(|e| ClasslineError::Internal(format!("failed to encode metrics: {e}")))?;
        println!("{out}");
    } else {
        for metric in &recent {
            println!("{}", recent_line(metric));
        }
    }
    Ok(())
}

/// Run the `classline clear` command.
pub fn run_clear(config: &TelemetryConfig) -> Result<(), ClasslineError> {
    let telemetry = TelemetryService::from_config(config);
    let removed = telemetry.buffer().len();
    telemetry.buffer().clear();
    println!("cleared {removed} stored metrics");
    Ok(())
}

fn select(
    summary: BTreeMap<MetricType, MetricStats>,
    only: Option<MetricType>,
) -> BTreeMap<MetricType, MetricStats> {
    match only {
        Some(wanted) => summary.into_iter().filter(|(t, _)| *t == wanted).collect(),
        None => summary,
    }
}

fn stats_json(summary: &BTreeMap<MetricType, MetricStats>) -> Result<String, ClasslineError> {
    let rows: Vec<StatsRow> = summary
        .iter()
        .map(|(&metric_type, &stats)| StatsRow {
            metric_type,
            threshold_ms: alert_threshold_ms(metric_type),
            stats,
        })
        .collect();
    serde_json::to_string_pretty(&rows)
        .map_err(|e| ClasslineError::Internal(format!("failed to encode stats: {e}")))
}

fn stats_table(summary: &BTreeMap<MetricType, MetricStats>, stored: usize, use_color: bool) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  classline stats ({stored} stored)");
    let _ = writeln!(out, "  {}", "-".repeat(78));

    if summary.is_empty() {
        let _ = writeln!(out, "    no successful measurements recorded");
        let _ = writeln!(out);
        return out;
    }

    let _ = writeln!(
        out,
        "    {:<20} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "type", "count", "avg", "p50", "p95", "p99", "max"
    );
    for (metric_type, stats) in summary {
        let slow = stats.p95 > alert_threshold_ms(*metric_type);
        let marker = match (slow, use_color) {
            (true, true) => {
                use colored::Colorize;
                "!".red().bold().to_string()
            }
            (true, false) => "!".to_string(),
            (false, _) => " ".to_string(),
        };
        let _ = writeln!(
            out,
            "  {marker} {:<20} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8}",
            metric_type.to_string(),
            stats.count,
            stats.avg,
            stats.p50,
            stats.p95,
            stats.p99,
            stats.max
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  durations in ms; ! marks p95 above the alert threshold");
    let _ = writeln!(out);
    out
}

fn recent_line(metric: &Metric) -> String {
    let outcome = if metric.success { "ok" } else { "failed" };
    let metadata = if metric.metadata.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&metric.metadata).unwrap_or_default()
    };
    format!(
        "{:>15}  {:<20} {:>7}ms  {:<6} {metadata}",
        metric.timestamp,
        metric.metric_type.to_string(),
        metric.duration_ms,
        outcome
    )
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use classline_core::Metadata;

    use super::*;

    fn config(dir: &tempfile::TempDir) -> TelemetryConfig {
        TelemetryConfig {
            max_metrics_stored: 50,
            storage_key: "cli_metrics".to_string(),
            data_dir: dir.path().display().to_string(),
            persist: true,
        }
    }

    fn seeded(dir: &tempfile::TempDir) -> TelemetryConfig {
        let config = config(dir);
        let telemetry = TelemetryService::from_config(&config);
        for d in [10, 20, 30, 40, 50] {
            telemetry
                .buffer()
                .record_point(MetricType::MessageSend, d, Metadata::new());
        }
        telemetry
            .buffer()
            .record_point(MetricType::RoomSwitch, 2_500, Metadata::new());
        config
    }

    #[test]
    fn json_rows_carry_percentiles_and_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded(&dir);
        let summary = TelemetryService::from_config(&config).buffer().summary();

        let value: serde_json::Value = serde_json::from_str(&stats_json(&summary).unwrap()).unwrap();
        let send = &value[0];
        assert_eq!(send["type"], "message_send");
        assert_eq!(send["p50"], 30);
        assert_eq!(send["p95"], 50);
        assert_eq!(send["p99"], 50);
        assert_eq!(send["threshold_ms"], 3000);
    }

    #[test]
    fn type_filter_keeps_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded(&dir);
        let summary = TelemetryService::from_config(&config).buffer().summary();
        let only = select(summary, Some(MetricType::RoomSwitch));
        assert_eq!(only.len(), 1);
        assert!(only.contains_key(&MetricType::RoomSwitch));
    }

    #[test]
    fn table_marks_slow_types() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded(&dir);
        let summary = TelemetryService::from_config(&config).buffer().summary();
        let table = stats_table(&summary, 6, false);

        let room_line = table.lines().find(|l| l.contains("room_switch")).unwrap();
        assert!(room_line.trim_start().starts_with('!'));
        let send_line = table.lines().find(|l| l.contains("message_send")).unwrap();
        assert!(!send_line.contains('!'));
        assert!(table.contains("6 stored"));
    }

    #[test]
    fn empty_table_says_so() {
        let table = stats_table(&BTreeMap::new(), 0, false);
        assert!(table.contains("no successful measurements"));
    }

    #[test]
    fn clear_removes_persisted_blob() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded(&dir);
        assert!(dir.path().join("cli_metrics.json").exists());

        run_clear(&config).unwrap();
        assert!(!dir.path().join("cli_metrics.json").exists());
        assert!(TelemetryService::from_config(&config).buffer().is_empty());
    }

    #[test]
    fn recent_line_shows_failure_and_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("room_id".to_string(), "r1".into());
        let line = recent_line(&Metric {
            metric_type: MetricType::MessageSend,
            duration_ms: 120,
            timestamp: 1_700_000_000_000,
            success: false,
            metadata,
        });
        assert!(line.contains("message_send"));
        assert!(line.contains("failed"));
        assert!(line.contains("\"room_id\":\"r1\""));
    }
}
