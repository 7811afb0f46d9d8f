// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Classline integration tests.
//!
//! Provides mock adapters and fixtures for fast, deterministic tests
//! without a realtime backend or message server.
//!
//! # Components
//!
//! - [`MockRealtimeChannel`] - Realtime subscription with call capture and status injection
//! - [`MockEndpoint`] - Message endpoint with scripted or hand-released responses
//! - [`TelemetryFixture`] - In-memory telemetry driven by a manual clock

pub mod fixtures;
pub mod mock_endpoint;
pub mod mock_realtime;

pub use fixtures::{test_session, TelemetryFixture};
pub use mock_endpoint::{MockEndpoint, PendingCall, RecordedRequest};
pub use mock_realtime::{ChannelCall, MockRealtimeChannel};
