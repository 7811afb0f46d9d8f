// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic message types.

use classline_core::{MessageId, MessageRequest, TempId};
use serde::Serialize;
use strum::Display;

/// What the user asked to send.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub temp_id: TempId,
    pub room_id: String,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub reply_to: Option<String>,
}

impl MessageDraft {
    pub fn text(room_id: &str, body: &str) -> Self {
        Self {
            temp_id: TempId::generate(),
            room_id: room_id.to_string(),
            body: Some(body.to_string()),
            image_url: None,
            reply_to: None,
        }
    }

    pub fn image(room_id: &str, image_url: &str) -> Self {
        Self {
            temp_id: TempId::generate(),
            room_id: room_id.to_string(),
            body: None,
            image_url: Some(image_url.to_string()),
            reply_to: None,
        }
    }

    pub fn with_reply_to(mut self, message_id: &str) -> Self {
        self.reply_to = Some(message_id.to_string());
        self
    }

    pub fn with_temp_id(mut self, temp_id: TempId) -> Self {
        self.temp_id = temp_id;
        self
    }

    /// True when there is neither non-blank text nor an image.
    pub fn is_empty(&self) -> bool {
        let has_body = self.body.as_deref().is_some_and(|b| !b.trim().is_empty());
        !has_body && self.image_url.is_none()
    }

    pub(crate) fn to_request(&self) -> MessageRequest {
        MessageRequest {
            room_id: self.room_id.clone(),
            body: self.body.clone(),
            image_url: self.image_url.clone(),
            reply_to: self.reply_to.clone(),
        }
    }
}

/// Delivery state of an optimistic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Confirmed { message_id: MessageId, flagged: bool },
    Failed { reason: String },
}

/// Discriminant of [`MessageStatus`], for counting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    Pending,
    Confirmed,
    Failed,
}

impl MessageStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Pending => StatusKind::Pending,
            Self::Confirmed { .. } => StatusKind::Confirmed,
            Self::Failed { .. } => StatusKind::Failed,
        }
    }
}

/// Final outcome applied to a pending placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Confirmed { message_id: MessageId, flagged: bool },
    Failed { reason: String },
}

impl From<Resolution> for MessageStatus {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Confirmed {
                message_id,
                flagged,
            } => Self::Confirmed {
                message_id,
                flagged,
            },
            Resolution::Failed { reason } => Self::Failed { reason },
        }
    }
}

/// A message shown to the user before the server confirmed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimisticMessage {
    pub temp_id: TempId,
    pub room_id: String,
    pub author_id: String,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub reply_to: Option<String>,
    /// Epoch milliseconds when the placeholder was created.
    pub created_at: i64,
    #[serde(flatten)]
    pub status: MessageStatus,
}

/// A delivered send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub temp_id: TempId,
    pub message_id: MessageId,
    /// Delivered but marked for moderation review.
    pub flagged: bool,
    pub duration_ms: Option<u64>,
}
