// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Classline configuration system.

use classline_config::diagnostic::ConfigError;
use classline_config::model::ClasslineConfig;
use classline_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_classline_config() {
    let toml = r#"
[client]
log_level = "debug"

[telemetry]
max_metrics_stored = 250
storage_key = "school_metrics"
data_dir = "/tmp/classline"
persist = false

[realtime]
max_retries = 7
base_delay_ms = 500

[endpoint]
base_url = "https://school.example"
request_timeout_secs = 10
access_token = "token-123"
user_id = "teacher-1"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.client.log_level, "debug");
    assert_eq!(config.telemetry.max_metrics_stored, 250);
    assert_eq!(config.telemetry.storage_key, "school_metrics");
    assert_eq!(config.telemetry.data_dir, "/tmp/classline");
    assert!(!config.telemetry.persist);
    assert_eq!(config.realtime.max_retries, 7);
    assert_eq!(config.realtime.base_delay_ms, 500);
    assert_eq!(config.endpoint.base_url, "https://school.example");
    assert_eq!(config.endpoint.request_timeout_secs, 10);
    assert_eq!(config.endpoint.access_token.as_deref(), Some("token-123"));
    assert_eq!(config.endpoint.user_id.as_deref(), Some("teacher-1"));
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.client.log_level, "info");
    assert_eq!(config.telemetry.max_metrics_stored, 1000);
    assert_eq!(config.telemetry.storage_key, "classline_metrics");
    assert!(config.telemetry.persist);
    assert_eq!(config.realtime.max_retries, 5);
    assert_eq!(config.realtime.base_delay_ms, 1000);
    assert_eq!(config.endpoint.base_url, "http://127.0.0.1:3000");
    assert_eq!(config.endpoint.request_timeout_secs, 30);
    assert!(config.endpoint.access_token.is_none());
}

/// Dotted overrides (the shape env vars map to) win over TOML.
#[test]
fn dotted_override_beats_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: ClasslineConfig = Figment::new()
        .merge(Serialized::defaults(ClasslineConfig::default()))
        .merge(Toml::string("[realtime]\nmax_retries = 3\n"))
        .merge(("realtime.max_retries", 9))
        .extract()
        .expect("should merge override");

    assert_eq!(config.realtime.max_retries, 9);
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_files_silently_skipped() {
    let config = classline_config::load_config_from_path(std::path::Path::new(
        "/nonexistent/path/classline.toml",
    ))
    .expect("missing file should be silently skipped");
    assert_eq!(config.realtime.max_retries, 5);
}

/// Unknown field in [realtime] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_realtime_key_suggests_correction() {
    let toml = r#"
[realtime]
max_retires = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "max_retires"
                && suggestion.as_deref() == Some("max_retries")
                && valid_keys.contains("base_delay_ms")
        })
    });
    assert!(found, "expected UnknownKey for max_retires, got: {errors:?}");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[feature_flags]
dark_mode = true
"#;

    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("feature_flags"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Invalid type (string where number expected) produces a clear message.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[realtime]
base_delay_ms = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::InvalidType { .. })
            || e.to_string().contains("base_delay_ms")),
        "expected a type error, got: {errors:?}"
    );
}

/// Validation runs after a successful parse.
#[test]
fn validation_rejects_zero_retries() {
    let toml = r#"
[realtime]
max_retries = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero retries should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("max_retries"))
    ));
}

/// ConfigError renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "max_retires".to_string(),
        suggestion: Some("max_retries".to_string()),
        valid_keys: "max_retries, base_delay_ms".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().expect("should have help").to_string();
    assert!(help.contains("did you mean `max_retries`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("max_retires"));
}

/// load_and_validate with defaults works when no config file or env is present.
#[test]
#[serial_test::serial]
fn load_and_validate_defaults() {
    let config = classline_config::load_and_validate().expect("defaults should validate");
    assert!(config.realtime.max_retries >= 1);
}
