// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send failure taxonomy.

use classline_core::TempId;
use thiserror::Error;

/// Why a send did not produce a delivered message.
///
/// Every variant is terminal for its temp id. A retry is a new send with a
/// new temp id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// No signed-in session. Nothing was inserted or sent.
    #[error("not signed in")]
    Unauthenticated,

    /// Neither a body nor an image was provided.
    #[error("message has no body or image")]
    EmptyMessage,

    /// A send with this temp id is already in flight.
    #[error("message {0} is already being sent")]
    DuplicateTempId(TempId),

    /// Moderation blocked the message.
    #[error("message blocked: {reason}")]
    Rejected { reason: String },

    /// The server held the message pending user confirmation. It was not delivered.
    #[error("message needs confirmation: {reason}")]
    AmbiguousOutcome { reason: String },

    /// Network failure, non-2xx response, or an unreadable response body.
    #[error("send failed: {message}")]
    Transport { message: String },
}

impl SendError {
    /// Whether the optimistic placeholder was inserted before this error.
    pub fn had_placeholder(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. } | Self::AmbiguousOutcome { .. } | Self::Transport { .. }
        )
    }
}
