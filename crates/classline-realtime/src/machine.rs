// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconnection state machine.
//!
//! [`ReconnectMachine`] is pure: it consumes [`Input`]s and returns the
//! [`Action`]s the driver must perform. It never sleeps or touches the
//! network, which keeps every transition testable without a runtime.
//!
//! Two counters make late events harmless:
//! - every subscribe attempt gets a fresh *epoch*; status reports tagged
//!   with any other epoch belong to a torn-down subscription and are dropped.
//! - every scheduled retry gets a fresh *seq*; a retry timer that fires after
//!   it was superseded or cancelled is dropped.

use classline_core::{ChannelStatus, StatusReport};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

/// Coarse connection phase exposed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Idle,
    Connected,
    Reconnecting,
    Failed,
}

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionState {
    pub phase: Phase,
    /// Consecutive failures since the last successful subscription.
    pub retry_count: u32,
    pub last_error: Option<String>,
}

impl ConnectionState {
    /// The controller gave up; the user should refresh or reconnect manually.
    pub fn needs_refresh(&self) -> bool {
        self.phase == Phase::Failed
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            retry_count: 0,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Status(StatusReport),
    /// The subscribe call for `epoch` itself returned an error.
    SubscribeFailed { epoch: u64, reason: String },
    RetryDue { seq: u64 },
    ManualReconnect,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Subscribe { epoch: u64 },
    Unsubscribe,
    ScheduleRetry { attempt: u32, seq: u64 },
    CancelRetry,
    /// Run the caller's missed-data recovery after `attempts` failed attempts.
    RunRecovery { attempts: u32 },
    NotifyFailed,
}

/// What the machine is currently waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Nothing,
    /// The outcome of the subscription with the live epoch.
    Subscription,
    /// The retry timer with this seq.
    Backoff { seq: u64 },
}

pub struct ReconnectMachine {
    state: ConnectionState,
    max_retries: u32,
    epoch: u64,
    /// Epoch whose status reports are still meaningful.
    live_epoch: Option<u64>,
    seq: u64,
    awaiting: Awaiting,
    stopped: bool,
}

impl ReconnectMachine {
    pub fn new(max_retries: u32) -> Self {
        Self {
            state: ConnectionState::default(),
            max_retries: max_retries.max(1),
            epoch: 0,
            live_epoch: None,
            seq: 0,
            awaiting: Awaiting::Nothing,
            stopped: false,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn handle(&mut self, input: Input) -> Vec<Action> {
        if self.stopped {
            debug!(?input, "reconnect machine stopped, input ignored");
            return Vec::new();
        }

        match input {
            Input::Start => self.on_start(),
            Input::Status(report) => self.on_status(report),
            Input::SubscribeFailed { epoch, reason } => {
                if self.live_epoch != Some(epoch) {
                    debug!(epoch, "stale subscribe failure ignored");
                    return Vec::new();
                }
                self.on_failure(reason)
            }
            Input::RetryDue { seq } => self.on_retry_due(seq),
            Input::ManualReconnect => self.on_manual_reconnect(),
            Input::Shutdown => {
                self.stopped = true;
                self.live_epoch = None;
                self.awaiting = Awaiting::Nothing;
                vec![Action::CancelRetry, Action::Unsubscribe]
            }
        }
    }

    fn on_start(&mut self) -> Vec<Action> {
        if self.state.phase != Phase::Idle || self.awaiting != Awaiting::Nothing {
            debug!(phase = %self.state.phase, "already started");
            return Vec::new();
        }
        vec![self.subscribe()]
    }

    fn on_status(&mut self, report: StatusReport) -> Vec<Action> {
        if self.live_epoch != Some(report.epoch) {
            debug!(epoch = report.epoch, status = %report.status, "status from stale subscription ignored");
            return Vec::new();
        }
        match report.status {
            ChannelStatus::Subscribed => self.on_subscribed(),
            status if status.is_failure() => self.on_failure(status.to_string()),
            _ => {
                debug!(epoch = report.epoch, "channel closed");
                Vec::new()
            }
        }
    }

    fn on_subscribed(&mut self) -> Vec<Action> {
        if self.state.phase == Phase::Connected && self.awaiting == Awaiting::Nothing {
            return Vec::new();
        }

        let recovering = self.state.phase == Phase::Reconnecting;
        let attempts = self.state.retry_count;
        self.state = ConnectionState {
            phase: Phase::Connected,
            retry_count: 0,
            last_error: None,
        };
        self.awaiting = Awaiting::Nothing;
        info!(recovering, attempts, "realtime channel subscribed");

        let mut actions = vec![Action::CancelRetry];
        if recovering {
            actions.push(Action::RunRecovery { attempts });
        }
        actions
    }

    fn on_failure(&mut self, reason: String) -> Vec<Action> {
        if self.state.phase == Phase::Failed {
            debug!(%reason, "failure ignored, controller already gave up");
            return Vec::new();
        }
        if matches!(self.awaiting, Awaiting::Backoff { .. }) {
            debug!(%reason, "failure ignored, retry already scheduled");
            return Vec::new();
        }

        self.state.retry_count += 1;
        self.state.last_error = Some(reason.clone());
        self.live_epoch = None;

        let mut actions = vec![Action::Unsubscribe];
        if self.state.retry_count >= self.max_retries {
            self.state.phase = Phase::Failed;
            self.awaiting = Awaiting::Nothing;
            warn!(
                retry_count = self.state.retry_count,
                max_retries = self.max_retries,
                %reason,
                "reconnect attempts exhausted"
            );
            actions.push(Action::NotifyFailed);
        } else {
            self.state.phase = Phase::Reconnecting;
            self.seq += 1;
            self.awaiting = Awaiting::Backoff { seq: self.seq };
            info!(
                retry_count = self.state.retry_count,
                %reason,
                "realtime channel lost, scheduling retry"
            );
            actions.push(Action::ScheduleRetry {
                attempt: self.state.retry_count,
                seq: self.seq,
            });
        }
        actions
    }

    fn on_retry_due(&mut self, seq: u64) -> Vec<Action> {
        if self.awaiting != (Awaiting::Backoff { seq }) {
            debug!(seq, "stale retry timer ignored");
            return Vec::new();
        }
        vec![self.subscribe()]
    }

    fn on_manual_reconnect(&mut self) -> Vec<Action> {
        info!(phase = %self.state.phase, "manual reconnect requested");
        self.state = ConnectionState {
            phase: Phase::Reconnecting,
            retry_count: 0,
            last_error: None,
        };
        // Invalidates any retry timer still in flight.
        self.seq += 1;
        vec![Action::CancelRetry, Action::Unsubscribe, self.subscribe()]
    }

    fn subscribe(&mut self) -> Action {
        self.epoch += 1;
        self.live_epoch = Some(self.epoch);
        self.awaiting = Awaiting::Subscription;
        Action::Subscribe { epoch: self.epoch }
    }
}
