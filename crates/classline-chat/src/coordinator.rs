// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic send coordinator.
//!
//! Shows a message immediately, sends it, then reconciles the placeholder
//! with the server's moderation outcome. Each send is timed as a
//! `message_send` metric.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use classline_core::{
    Clock, MessageEndpoint, MessageId, MessageResponse, MetricType, ModerationStatus,
    OperationId, SessionProvider, TempId,
};
use classline_telemetry::{EndOptions, TimerStore};
use tracing::{debug, info, warn};

use crate::error::SendError;
use crate::message::{MessageDraft, MessageStatus, OptimisticMessage, Resolution, SendReceipt};
use crate::timeline::MessageView;

const DEFAULT_BLOCK_REASON: &str = "blocked by moderation";
const DEFAULT_CONFIRM_REASON: &str = "message requires confirmation";
const ABANDONED_REASON: &str = "send abandoned";

pub struct OptimisticSendCoordinator {
    endpoint: Arc<dyn MessageEndpoint>,
    sessions: Arc<dyn SessionProvider>,
    timers: Arc<TimerStore>,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<HashSet<TempId>>,
}

impl OptimisticSendCoordinator {
    pub fn new(
        endpoint: Arc<dyn MessageEndpoint>,
        sessions: Arc<dyn SessionProvider>,
        timers: Arc<TimerStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            endpoint,
            sessions,
            timers,
            clock,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<TempId>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of sends awaiting a server outcome.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight().len()
    }

    /// Sends `draft`, showing it in `view` as pending until the outcome is known.
    ///
    /// The placeholder is inserted before any I/O and resolved exactly once.
    /// If `view` has been dropped by the time the outcome arrives, the
    /// resolution is discarded; the send itself still completes. Dropping the
    /// returned future before the server answers fails the placeholder with
    /// `send abandoned`.
    pub async fn send<V>(&self, view: &Weak<V>, draft: MessageDraft) -> Result<SendReceipt, SendError>
    where
        V: MessageView + ?Sized,
    {
        let session = self
            .sessions
            .current_session()
            .await
            .ok_or(SendError::Unauthenticated)?;
        if draft.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if !self.in_flight().insert(draft.temp_id.clone()) {
            return Err(SendError::DuplicateTempId(draft.temp_id));
        }

        let temp_id = draft.temp_id.clone();
        let request = draft.to_request();
        match view.upgrade() {
            Some(view) => view.insert_pending(OptimisticMessage {
                temp_id: temp_id.clone(),
                room_id: draft.room_id.clone(),
                author_id: session.user_id.clone(),
                body: draft.body,
                image_url: draft.image_url,
                reply_to: draft.reply_to,
                created_at: self.clock.now_ms(),
                status: MessageStatus::Pending,
            }),
            None => debug!(%temp_id, "view gone before send, sending without placeholder"),
        }

        let pending = PendingSend {
            coordinator: self,
            view,
            temp_id,
            op: self.timers.start_new(),
            room_id: request.room_id.clone(),
            has_image: request.image_url.is_some(),
            settled: false,
        };

        let response = self
            .endpoint
            .create_message(&request, &session.access_token)
            .await;

        let (label, outcome) = match response {
            Ok(response) => classify(response),
            Err(e) => (
                "transport_error",
                Err(SendError::Transport {
                    message: e.to_string(),
                }),
            ),
        };
        pending.settle(label, outcome)
    }
}

/// A send whose placeholder is showing and whose outcome is not yet known.
///
/// Dropping it unsettled, e.g. when the send future is aborted, resolves the
/// placeholder as failed, releases the temp id and records a failed metric.
struct PendingSend<'a, V: MessageView + ?Sized> {
    coordinator: &'a OptimisticSendCoordinator,
    view: &'a Weak<V>,
    temp_id: TempId,
    op: OperationId,
    room_id: String,
    has_image: bool,
    settled: bool,
}

impl<V: MessageView + ?Sized> PendingSend<'_, V> {
    fn settle(
        mut self,
        label: &'static str,
        outcome: Result<(MessageId, bool), SendError>,
    ) -> Result<SendReceipt, SendError> {
        self.settled = true;
        let duration_ms = self.finish(label, outcome.is_ok());

        let resolution = match &outcome {
            Ok((message_id, flagged)) => {
                info!(temp_id = %self.temp_id, message_id = %message_id.0, flagged, "message confirmed");
                Resolution::Confirmed {
                    message_id: message_id.clone(),
                    flagged: *flagged,
                }
            }
            Err(e) => {
                warn!(temp_id = %self.temp_id, room_id = %self.room_id, error = %e, "message send failed");
                Resolution::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.resolve(resolution);

        outcome.map(|(message_id, flagged)| SendReceipt {
            temp_id: self.temp_id.clone(),
            message_id,
            flagged,
            duration_ms,
        })
    }

    /// Ends the timer and releases the temp id.
    fn finish(&self, label: &'static str, success: bool) -> Option<u64> {
        let duration_ms = self.coordinator.timers.end(
            &self.op,
            MetricType::MessageSend,
            EndOptions::default()
                .with_success(success)
                .with_metadata("room_id", self.room_id.as_str())
                .with_metadata("outcome", label)
                .with_metadata("has_image", self.has_image),
        );
        self.coordinator.in_flight().remove(&self.temp_id);
        duration_ms
    }

    fn resolve(&self, resolution: Resolution) {
        match self.view.upgrade() {
            Some(view) => view.resolve(&self.temp_id, resolution),
            None => debug!(temp_id = %self.temp_id, "view dropped before send resolved, resolution discarded"),
        }
    }
}

impl<V: MessageView + ?Sized> Drop for PendingSend<'_, V> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(temp_id = %self.temp_id, room_id = %self.room_id, "send abandoned before the server answered");
        self.finish("abandoned", false);
        self.resolve(Resolution::Failed {
            reason: ABANDONED_REASON.to_string(),
        });
    }
}

/// Maps a parsed response to a metric label and a send outcome.
fn classify(response: MessageResponse) -> (&'static str, Result<(MessageId, bool), SendError>) {
    let reason = response.reason.or(response.error);
    match response.status {
        status if status.is_delivered() => {
            let flagged = status == ModerationStatus::Flag;
            let label = if flagged { "flag" } else { "allow" };
            match response.message_id {
                Some(id) => (label, Ok((MessageId(id), flagged))),
                None => (
                    "transport_error",
                    Err(SendError::Transport {
                        message: format!("{label} response without message_id"),
                    }),
                ),
            }
        }
        ModerationStatus::Block => (
            "block",
            Err(SendError::Rejected {
                reason: reason.unwrap_or_else(|| DEFAULT_BLOCK_REASON.to_string()),
            }),
        ),
        _ => (
            "requires_confirmation",
            Err(SendError::AmbiguousOutcome {
                reason: reason.unwrap_or_else(|| DEFAULT_CONFIRM_REASON.to_string()),
            }),
        ),
    }
}
