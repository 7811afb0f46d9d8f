// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Classline realtime client.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types shared by the telemetry, realtime, and chat crates. External
//! collaborators (backend endpoint, realtime SDK, local storage, session)
//! are reached only through the traits defined here.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ClasslineError;
pub use types::{
    ChannelStatus, Metadata, MessageId, MessageRequest, MessageResponse, Metric, MetricType,
    ModerationStatus, OperationId, Session, TempId,
};

pub use traits::{
    MessageEndpoint, MetricsPersistence, RealtimeChannel, SessionProvider, StaticSession,
    StatusReport, StatusSink,
};
