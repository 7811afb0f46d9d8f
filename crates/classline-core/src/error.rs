// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Classline realtime client.

use thiserror::Error;

/// The primary error type used across Classline adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ClasslineError {
    /// Configuration errors (invalid values, missing endpoint settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local persistence errors (file I/O, serialization of the metrics blob).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Network or parse failures talking to the backend.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Realtime subscription errors (subscribe rejected, channel unavailable).
    #[error("realtime error: {message}")]
    Realtime { message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClasslineError {
    /// Convenience constructor for a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
