// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./classline.toml` > `~/.config/classline/classline.toml`
//! > `/etc/classline/classline.toml` with environment variable overrides via the
//! `CLASSLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ClasslineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/classline/classline.toml`
/// 3. `~/.config/classline/classline.toml`
/// 4. `./classline.toml`
/// 5. `CLASSLINE_*` environment variables
pub fn load_config() -> Result<ClasslineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ClasslineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClasslineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClasslineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClasslineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ClasslineConfig::default()))
        .merge(Toml::file("/etc/classline/classline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("classline/classline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("classline.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CLASSLINE_REALTIME_BASE_DELAY_MS` must map to
/// `realtime.base_delay_ms`, not `realtime.base.delay.ms`. Figment hands
/// the key to `map` in its original case, so it is lowercased first.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("CLASSLINE_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("client_", "client.", 1)
            .replacen("telemetry_", "telemetry.", 1)
            .replacen("realtime_", "realtime.", 1)
            .replacen("endpoint_", "endpoint.", 1);
        mapped.into()
    })
}
