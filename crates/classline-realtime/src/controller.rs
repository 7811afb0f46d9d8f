// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tokio driver for the [`ReconnectMachine`].
//!
//! [`ReconnectController::spawn`] starts a task that owns the machine,
//! feeds it status reports and timer events, and executes the resulting
//! actions against a [`RealtimeChannel`]. Observers read the current
//! [`ConnectionState`] through a watch channel.

use std::sync::Arc;

use classline_config::model::RealtimeConfig;
use classline_core::{MetricType, RealtimeChannel, StatusReport, StatusSink};
use classline_telemetry::{EndOptions, TimerStore};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::BackoffPolicy;
use crate::machine::{Action, ConnectionState, Input, ReconnectMachine};
use crate::recovery::RecoveryHandler;

/// Events the driver feeds itself or receives from the handle.
#[derive(Debug)]
enum Control {
    RetryDue { seq: u64 },
    SubscribeFailed { epoch: u64, reason: String },
    ManualReconnect,
    Shutdown,
}

/// Handle to a running reconnection supervisor.
///
/// Dropping the handle stops the supervisor without unsubscribing; call
/// [`shutdown`](Self::shutdown) for an orderly teardown.
pub struct ReconnectController {
    control: mpsc::UnboundedSender<Control>,
    state: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
    interrupt: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ReconnectController {
    /// Subscribes `channel` and keeps it subscribed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        channel: Arc<dyn RealtimeChannel>,
        recovery: Arc<dyn RecoveryHandler>,
        timers: Arc<TimerStore>,
        config: &RealtimeConfig,
    ) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::default());
        let cancel = CancellationToken::new();
        let interrupt = cancel.child_token();

        let driver = Driver {
            machine: ReconnectMachine::new(config.max_retries),
            backoff: BackoffPolicy::new(config.base_delay_ms),
            channel,
            recovery,
            timers,
            state_tx,
            control_tx: control_tx.clone(),
            status_tx,
            cancel: cancel.clone(),
            interrupt: interrupt.clone(),
            retry: None,
        };
        let task = tokio::spawn(driver.run(control_rx, status_rx));

        Self {
            control: control_tx,
            state: state_rx,
            cancel,
            interrupt,
            task: Some(task),
        }
    }

    /// Snapshot of the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every state change.
    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Resets the retry budget and resubscribes immediately.
    pub fn reconnect(&self) {
        if self.control.send(Control::ManualReconnect).is_err() {
            warn!("reconnect requested after the supervisor stopped");
        }
    }

    /// Cancels pending retries, unsubscribes, and waits for the supervisor to exit.
    ///
    /// A subscribe call or recovery still in progress is abandoned.
    pub async fn shutdown(mut self) {
        let _ = self.control.send(Control::Shutdown);
        self.interrupt.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "realtime supervisor task ended abnormally");
            }
        }
    }
}

impl Drop for ReconnectController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Driver {
    machine: ReconnectMachine,
    backoff: BackoffPolicy,
    channel: Arc<dyn RealtimeChannel>,
    recovery: Arc<dyn RecoveryHandler>,
    timers: Arc<TimerStore>,
    state_tx: watch::Sender<ConnectionState>,
    control_tx: mpsc::UnboundedSender<Control>,
    status_tx: mpsc::UnboundedSender<StatusReport>,
    cancel: CancellationToken,
    /// Aborts an in-progress subscribe or recovery. Cancelled on shutdown.
    interrupt: CancellationToken,
    /// Cancels the retry timer currently in flight.
    retry: Option<(CancellationToken, JoinHandle<()>)>,
}

impl Driver {
    async fn run(
        mut self,
        mut control_rx: mpsc::UnboundedReceiver<Control>,
        mut status_rx: mpsc::UnboundedReceiver<StatusReport>,
    ) {
        debug!(channel = self.channel.name(), "realtime supervisor started");
        self.apply(Input::Start).await;

        while !self.machine.is_stopped() {
            // Status reports drain before control events so a queued
            // shutdown never overtakes a subscription outcome.
            let input = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(report) = status_rx.recv() => Input::Status(report),
                Some(control) = control_rx.recv() => match control {
                    Control::RetryDue { seq } => Input::RetryDue { seq },
                    Control::SubscribeFailed { epoch, reason } => {
                        Input::SubscribeFailed { epoch, reason }
                    }
                    Control::ManualReconnect => Input::ManualReconnect,
                    Control::Shutdown => Input::Shutdown,
                },
                else => break,
            };
            self.apply(input).await;
        }

        self.cancel_retry();
        debug!(channel = self.channel.name(), "realtime supervisor stopped");
    }

    async fn apply(&mut self, input: Input) {
        let actions = self.machine.handle(input);
        // Connected is only published once missed data has been refetched.
        let recovering = actions
            .iter()
            .any(|action| matches!(action, Action::RunRecovery { .. }));
        if !recovering {
            self.publish();
        }
        for action in actions {
            self.execute(action).await;
        }
        if recovering {
            self.publish();
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.machine.state().clone());
    }

    async fn execute(&mut self, action: Action) {
        match action {
            Action::Subscribe { epoch } => {
                let sink = StatusSink::new(epoch, self.status_tx.clone());
                debug!(channel = self.channel.name(), epoch, "subscribing");
                let result = tokio::select! {
                    _ = self.interrupt.cancelled() => {
                        debug!(channel = self.channel.name(), epoch, "subscribe abandoned");
                        return;
                    }
                    result = self.channel.subscribe(sink) => result,
                };
                if let Err(e) = result {
                    warn!(channel = self.channel.name(), epoch, error = %e, "subscribe call failed");
                    let _ = self.control_tx.send(Control::SubscribeFailed {
                        epoch,
                        reason: e.to_string(),
                    });
                }
            }
            Action::Unsubscribe => {
                let result = tokio::select! {
                    _ = self.cancel.cancelled() => return,
                    result = self.channel.unsubscribe() => result,
                };
                if let Err(e) = result {
                    warn!(channel = self.channel.name(), error = %e, "unsubscribe failed");
                }
            }
            Action::ScheduleRetry { attempt, seq } => {
                self.cancel_retry();
                let delay = self.backoff.delay(attempt, &mut rand::thread_rng());
                info!(
                    channel = self.channel.name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "reconnect attempt scheduled"
                );

                let token = self.cancel.child_token();
                let guard = token.clone();
                let tx = self.control_tx.clone();
                let handle = tokio::spawn(async move {
                    tokio::select! {
                        _ = guard.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            let _ = tx.send(Control::RetryDue { seq });
                        }
                    }
                });
                self.retry = Some((token, handle));
            }
            Action::CancelRetry => self.cancel_retry(),
            Action::RunRecovery { attempts } => self.recover(attempts).await,
            Action::NotifyFailed => {
                let state = self.machine.state();
                error!(
                    channel = self.channel.name(),
                    retry_count = state.retry_count,
                    last_error = state.last_error.as_deref().unwrap_or("unknown"),
                    "realtime reconnection failed, please refresh"
                );
            }
        }
    }

    async fn recover(&self, attempts: u32) {
        let op = self.timers.start_new();
        let result = tokio::select! {
            _ = self.interrupt.cancelled() => {
                self.timers.cancel(&op);
                debug!(channel = self.channel.name(), "missed-data recovery abandoned");
                return;
            }
            result = self.recovery.recover() => result,
        };
        self.timers.end(
            &op,
            MetricType::RealtimeReconnect,
            EndOptions::default()
                .with_success(result.is_ok())
                .with_metadata("channel", self.channel.name())
                .with_metadata("attempts", attempts),
        );
        match result {
            Ok(()) => info!(channel = self.channel.name(), attempts, "missed-data recovery complete"),
            Err(e) => warn!(channel = self.channel.name(), error = %e, "missed-data recovery failed"),
        }
    }

    fn cancel_retry(&mut self) {
        if let Some((token, handle)) = self.retry.take() {
            token.cancel();
            handle.abort();
        }
    }
}
