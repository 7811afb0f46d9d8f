// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock realtime channel for deterministic testing.
//!
//! `MockRealtimeChannel` implements `RealtimeChannel`, capturing every
//! subscribe/unsubscribe call and letting tests inject status events into
//! the most recent subscription.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use classline_core::{ChannelStatus, ClasslineError, RealtimeChannel, StatusSink};

/// A call observed by the mock, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelCall {
    Subscribe { epoch: u64 },
    Unsubscribe,
}

#[derive(Default)]
struct ChannelLog {
    calls: Vec<ChannelCall>,
    sink: Option<StatusSink>,
    auto_status: Option<ChannelStatus>,
    failures: VecDeque<String>,
}

/// A mock realtime subscription.
///
/// With an auto status set, every successful subscribe immediately reports
/// that status, mimicking a backend that acknowledges at once.
pub struct MockRealtimeChannel {
    name: String,
    log: Mutex<ChannelLog>,
    notify: Notify,
}

impl MockRealtimeChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log: Mutex::new(ChannelLog::default()),
            notify: Notify::new(),
        }
    }

    /// A channel that acknowledges every subscribe with `SUBSCRIBED`.
    pub fn auto_subscribing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log: Mutex::new(ChannelLog {
                auto_status: Some(ChannelStatus::Subscribed),
                ..ChannelLog::default()
            }),
            notify: Notify::new(),
        }
    }

    pub async fn set_auto_status(&self, status: Option<ChannelStatus>) {
        self.log.lock().await.auto_status = status;
    }

    /// Makes the next subscribe call return an error with `reason`.
    pub async fn fail_next_subscribe(&self, reason: &str) {
        self.log.lock().await.failures.push_back(reason.to_string());
    }

    /// Reports `status` through the sink of the most recent subscribe.
    ///
    /// The sink survives `unsubscribe`, so tests can replay late events from
    /// a torn-down subscription. Returns `false` if nothing ever subscribed
    /// or nobody listens.
    pub async fn emit(&self, status: ChannelStatus) -> bool {
        match &self.log.lock().await.sink {
            Some(sink) => sink.report(status),
            None => false,
        }
    }

    /// Epoch of the most recent successful subscribe.
    pub async fn current_epoch(&self) -> Option<u64> {
        self.log.lock().await.sink.as_ref().map(StatusSink::epoch)
    }

    pub async fn calls(&self) -> Vec<ChannelCall> {
        self.log.lock().await.calls.clone()
    }

    pub async fn subscribe_count(&self) -> usize {
        self.count(|c| matches!(c, ChannelCall::Subscribe { .. })).await
    }

    pub async fn unsubscribe_count(&self) -> usize {
        self.count(|c| matches!(c, ChannelCall::Unsubscribe)).await
    }

    async fn count(&self, pred: impl Fn(&ChannelCall) -> bool) -> usize {
        self.log.lock().await.calls.iter().filter(|c| pred(c)).count()
    }

    /// Waits until at least `n` subscribe calls have been made.
    pub async fn wait_for_subscribes(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.subscribe_count().await >= n {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl RealtimeChannel for MockRealtimeChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn subscribe(&self, sink: StatusSink) -> Result<(), ClasslineError> {
        let result = {
            let mut log = self.log.lock().await;
            log.calls.push(ChannelCall::Subscribe {
                epoch: sink.epoch(),
            });
            match log.failures.pop_front() {
                Some(message) => Err(ClasslineError::Realtime { message }),
                None => {
                    if let Some(status) = log.auto_status {
                        sink.report(status);
                    }
                    log.sink = Some(sink);
                    Ok(())
                }
            }
        };
        self.notify.notify_waiters();
        result
    }

    async fn unsubscribe(&self) -> Result<(), ClasslineError> {
        self.log.lock().await.calls.push(ChannelCall::Unsubscribe);
        self.notify.notify_waiters();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use classline_core::StatusReport;
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn emit_reaches_latest_subscription() {
        let channel = MockRealtimeChannel::new("room:1");
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(!channel.emit(ChannelStatus::Subscribed).await);

        channel.subscribe(StatusSink::new(3, tx)).await.unwrap();
        assert!(channel.emit(ChannelStatus::TimedOut).await);
        assert_eq!(
            rx.recv().await,
            Some(StatusReport {
                epoch: 3,
                status: ChannelStatus::TimedOut
            })
        );
        assert_eq!(channel.current_epoch().await, Some(3));
    }

    #[tokio::test]
    async fn auto_subscribing_acknowledges() {
        let channel = MockRealtimeChannel::auto_subscribing("room:1");
        let (tx, mut rx) = mpsc::unbounded_channel();
        channel.subscribe(StatusSink::new(1, tx)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().status, ChannelStatus::Subscribed);
    }

    #[tokio::test]
    async fn scripted_failure_applies_once() {
        let channel = MockRealtimeChannel::new("room:1");
        channel.fail_next_subscribe("refused").await;
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(channel.subscribe(StatusSink::new(1, tx.clone())).await.is_err());
        assert!(channel.subscribe(StatusSink::new(2, tx)).await.is_ok());
        channel.unsubscribe().await.unwrap();
        assert_eq!(
            channel.calls().await,
            vec![
                ChannelCall::Subscribe { epoch: 1 },
                ChannelCall::Subscribe { epoch: 2 },
                ChannelCall::Unsubscribe
            ]
        );
    }
}
