// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive limits, URL schemes, and safe storage keys.

use crate::diagnostic::ConfigError;
use crate::model::ClasslineConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ClasslineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.client.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "client.log_level `{}` is not one of {}",
                config.client.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.telemetry.max_metrics_stored == 0 {
        errors.push(ConfigError::Validation {
            message: "telemetry.max_metrics_stored must be at least 1".to_string(),
        });
    }

    // The key becomes a file name.
    let key = config.telemetry.storage_key.trim();
    if key.is_empty() {
        errors.push(ConfigError::Validation {
            message: "telemetry.storage_key must not be empty".to_string(),
        });
    } else if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "telemetry.storage_key `{key}` may only contain letters, digits, `_` and `-`"
            ),
        });
    }

    if config.telemetry.persist && config.telemetry.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "telemetry.data_dir must not be empty when telemetry.persist is true"
                .to_string(),
        });
    }

    if config.realtime.max_retries == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.max_retries must be at least 1".to_string(),
        });
    }

    if config.realtime.base_delay_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.base_delay_ms must be at least 1".to_string(),
        });
    }

    let base_url = config.endpoint.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("endpoint.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.endpoint.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "endpoint.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ClasslineConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let mut config = ClasslineConfig::default();
        config.telemetry.max_metrics_stored = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "max_metrics_stored"));
    }

    #[test]
    fn storage_key_with_path_separator_fails_validation() {
        let mut config = ClasslineConfig::default();
        config.telemetry.storage_key = "../metrics".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "storage_key"));
    }

    #[test]
    fn empty_data_dir_is_fine_without_persistence() {
        let mut config = ClasslineConfig::default();
        config.telemetry.data_dir = String::new();
        config.telemetry.persist = false;
        assert!(validate_config(&config).is_ok());

        config.telemetry.persist = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "data_dir"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ClasslineConfig::default();
        config.realtime.max_retries = 0;
        config.realtime.base_delay_ms = 0;
        config.endpoint.base_url = "ftp://school.example".to_string();
        config.client.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(has_error(&errors, "max_retries"));
        assert!(has_error(&errors, "base_delay_ms"));
        assert!(has_error(&errors, "base_url"));
        assert!(has_error(&errors, "log_level"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = ClasslineConfig::default();
        config.client.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
