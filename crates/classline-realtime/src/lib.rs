// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime subscription supervision for the Classline client.
//!
//! A subscription that reports `CHANNEL_ERROR` or `TIMED_OUT` is torn down
//! and retried with capped exponential backoff. After a successful
//! reconnect the caller's [`RecoveryHandler`] refetches missed data. Once
//! the retry budget is spent the controller parks in
//! [`Phase::Failed`] until [`ReconnectController::reconnect`] is called.

pub mod backoff;
pub mod controller;
pub mod machine;
pub mod recovery;

pub use backoff::{BackoffPolicy, BACKOFF_CAP_MS, JITTER_MAX_MS};
pub use controller::ReconnectController;
pub use machine::{Action, ConnectionState, Input, Phase, ReconnectMachine};
pub use recovery::{FnRecovery, NoRecovery, RecoveryHandler};
