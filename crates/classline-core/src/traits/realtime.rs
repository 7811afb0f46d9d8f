// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime subscription trait.
//!
//! The vendor SDK is hidden behind `subscribe`/`unsubscribe` plus a
//! [`StatusSink`] that the subscription reports its status events into.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ClasslineError;
use crate::types::ChannelStatus;

/// A status event tagged with the subscription epoch that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub epoch: u64,
    pub status: ChannelStatus,
}

/// Handle a subscription uses to report status events.
///
/// Each subscribe call gets a sink bound to a fresh epoch, so events from a
/// subscription that has since been replaced can be told apart and dropped.
#[derive(Debug, Clone)]
pub struct StatusSink {
    epoch: u64,
    tx: mpsc::UnboundedSender<StatusReport>,
}

impl StatusSink {
    pub fn new(epoch: u64, tx: mpsc::UnboundedSender<StatusReport>) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Reports a status event. Returns `false` if nobody is listening anymore.
    pub fn report(&self, status: ChannelStatus) -> bool {
        self.tx
            .send(StatusReport {
                epoch: self.epoch,
                status,
            })
            .is_ok()
    }
}

/// A live event subscription supervised by a reconnection controller.
///
/// `unsubscribe` is always called before a resubscribe attempt so that a
/// channel never holds duplicate listeners.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Name used in logs and telemetry metadata.
    fn name(&self) -> &str;

    /// Starts the subscription. Status events are reported through `sink`.
    async fn subscribe(&self, sink: StatusSink) -> Result<(), ClasslineError>;

    /// Tears down the current subscription, if any.
    async fn unsubscribe(&self) -> Result<(), ClasslineError>;
}
