// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Classline client.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Free-form metric metadata.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// --- Telemetry types ---

/// The kind of user-visible operation a [`Metric`] measures.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricType {
    MessageSend,
    MessageRealtime,
    ImageUpload,
    ImageCompression,
    RealtimeReconnect,
    PageLoad,
    RoomSwitch,
}

/// A single recorded measurement. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub duration_ms: u64,
    /// Epoch milliseconds at which the measurement completed.
    pub timestamp: i64,
    pub success: bool,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Identifies a pending timed operation.
///
/// Use [`OperationId::generate`] for a structurally unique handle. Named ids
/// exist for retried operations that deliberately share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId(String);

impl OperationId {
    pub fn generate() -> Self {
        Self(format!("op-{}", uuid::Uuid::new_v4()))
    }

    pub fn named(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Realtime types ---

/// Status events delivered by a realtime subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelStatus {
    Subscribed,
    ChannelError,
    TimedOut,
    Closed,
}

impl ChannelStatus {
    /// Whether this status means the subscription is no longer delivering events.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::ChannelError | Self::TimedOut)
    }
}

// --- Chat types ---

/// Client-generated identifier of an optimistic message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempId(pub String);

impl TempId {
    pub fn generate() -> Self {
        Self(format!("temp-{}", uuid::Uuid::new_v4()))
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// An authenticated user session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

/// Request body for the message-creation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub room_id: String,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub reply_to: Option<String>,
}

/// Moderation outcome reported by the message-creation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModerationStatus {
    /// Delivered clean.
    Allow,
    /// Delivered but marked for moderation review.
    #[serde(alias = "flagged")]
    Flag,
    /// Rejected.
    #[serde(alias = "blocked")]
    Block,
    /// Not delivered; the user must confirm before resending.
    RequiresConfirmation,
}

impl ModerationStatus {
    /// Whether the message reached the room.
    pub fn is_delivered(self) -> bool {
        matches!(self, Self::Allow | Self::Flag)
    }
}

/// Response body from the message-creation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: ModerationStatus,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
