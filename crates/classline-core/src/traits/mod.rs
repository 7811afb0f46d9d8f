// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the client.
//!
//! Async adapters use `#[async_trait]` for dynamic dispatch compatibility.

pub mod endpoint;
pub mod persistence;
pub mod realtime;
pub mod session;

pub use endpoint::MessageEndpoint;
pub use persistence::MetricsPersistence;
pub use realtime::{RealtimeChannel, StatusReport, StatusSink};
pub use session::{SessionProvider, StaticSession};
