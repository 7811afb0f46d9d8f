// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Classline client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Classline configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClasslineConfig {
    /// Process-wide client settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Local performance telemetry settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Realtime reconnection settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Message-creation endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

/// Process-wide client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Local performance telemetry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Maximum number of metrics kept in the ring buffer and on disk.
    #[serde(default = "default_max_metrics_stored")]
    pub max_metrics_stored: usize,

    /// Key naming the persisted metrics blob.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Directory holding the persisted metrics blob.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Persist metrics to disk. When false, metrics live only in memory.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            max_metrics_stored: default_max_metrics_stored(),
            storage_key: default_storage_key(),
            data_dir: default_data_dir(),
            persist: default_persist(),
        }
    }
}

fn default_max_metrics_stored() -> usize {
    1000
}

fn default_storage_key() -> String {
    "classline_metrics".to_string()
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("classline"))
        .unwrap_or_else(|| std::path::PathBuf::from(".classline"))
        .to_string_lossy()
        .into_owned()
}

fn default_persist() -> bool {
    true
}

/// Realtime reconnection configuration.
///
/// The backoff cap (30s) and jitter range (0-1000ms) are fixed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Consecutive failures tolerated before the controller gives up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

/// Message-creation endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Base URL of the backend serving `/api/messages`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Bearer token of the signed-in user. `None` means signed out.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Id of the signed-in user, used as the author of optimistic messages.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            access_token: None,
            user_id: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}
