// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message endpoint for deterministic testing.
//!
//! Two modes:
//! - **scripted**: responses are popped from a FIFO queue; an empty queue
//!   answers `allow` with a generated message id.
//! - **gated**: every call parks until the test releases it through
//!   [`MockEndpoint::next_call`], so completions can be reordered.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex};

use classline_core::{
    ClasslineError, MessageEndpoint, MessageRequest, MessageResponse, ModerationStatus,
};

/// A request as the endpoint received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub request: MessageRequest,
    pub access_token: String,
}

/// A gated call waiting for the test to answer it.
pub struct PendingCall {
    pub request: MessageRequest,
    responder: oneshot::Sender<Result<MessageResponse, ClasslineError>>,
}

impl PendingCall {
    pub fn respond(self, response: MessageResponse) {
        let _ = self.responder.send(Ok(response));
    }

    pub fn fail(self, message: &str) {
        let _ = self.responder.send(Err(ClasslineError::transport(message)));
    }
}

enum Mode {
    Scripted(Mutex<VecDeque<Result<MessageResponse, String>>>),
    Gated {
        tx: mpsc::UnboundedSender<PendingCall>,
        rx: Mutex<mpsc::UnboundedReceiver<PendingCall>>,
    },
}

pub struct MockEndpoint {
    mode: Mode,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockEndpoint {
    /// A scripted endpoint with an empty queue.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<MessageResponse>) -> Self {
        Self {
            mode: Mode::Scripted(Mutex::new(responses.into_iter().map(Ok).collect())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn gated() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            mode: Mode::Gated {
                tx,
                rx: Mutex::new(rx),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response. Ignored in gated mode.
    pub async fn push_response(&self, response: MessageResponse) {
        if let Mode::Scripted(queue) = &self.mode {
            queue.lock().await.push_back(Ok(response));
        }
    }

    /// Queues a transport failure. Ignored in gated mode.
    pub async fn push_failure(&self, message: &str) {
        if let Mode::Scripted(queue) = &self.mode {
            queue.lock().await.push_back(Err(message.to_string()));
        }
    }

    /// The next parked call, in arrival order. Gated mode only.
    pub async fn next_call(&self) -> Option<PendingCall> {
        match &self.mode {
            Mode::Gated { rx, .. } => rx.lock().await.recv().await,
            Mode::Scripted(_) => None,
        }
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub fn allow(message_id: &str) -> MessageResponse {
        Self::response(ModerationStatus::Allow, Some(message_id), None)
    }

    pub fn flag(message_id: &str) -> MessageResponse {
        Self::response(ModerationStatus::Flag, Some(message_id), None)
    }

    pub fn block(reason: &str) -> MessageResponse {
        Self::response(ModerationStatus::Block, None, Some(reason))
    }

    pub fn requires_confirmation(reason: &str) -> MessageResponse {
        Self::response(ModerationStatus::RequiresConfirmation, None, Some(reason))
    }

    fn response(
        status: ModerationStatus,
        message_id: Option<&str>,
        reason: Option<&str>,
    ) -> MessageResponse {
        MessageResponse {
            status,
            message_id: message_id.map(str::to_string),
            reason: reason.map(str::to_string),
            error: None,
        }
    }
}

impl Default for MockEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageEndpoint for MockEndpoint {
    async fn create_message(
        &self,
        request: &MessageRequest,
        access_token: &str,
    ) -> Result<MessageResponse, ClasslineError> {
        self.requests.lock().await.push(RecordedRequest {
            request: request.clone(),
            access_token: access_token.to_string(),
        });

        match &self.mode {
            Mode::Scripted(queue) => match queue.lock().await.pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(ClasslineError::transport(message)),
                None => Ok(Self::allow(&format!("mock-msg-{}", uuid::Uuid::new_v4()))),
            },
            Mode::Gated { tx, .. } => {
                let (responder, rx) = oneshot::channel();
                tx.send(PendingCall {
                    request: request.clone(),
                    responder,
                })
                .map_err(|_| ClasslineError::transport("mock endpoint closed"))?;
                rx.await
                    .unwrap_or_else(|_| Err(ClasslineError::transport("gated call dropped")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(room: &str) -> MessageRequest {
        MessageRequest {
            room_id: room.to_string(),
            body: Some("hi".to_string()),
            image_url: None,
            reply_to: None,
        }
    }

    #[tokio::test]
    async fn scripted_responses_pop_in_order() {
        let endpoint = MockEndpoint::with_responses(vec![MockEndpoint::block("language")]);
        endpoint.push_failure("socket closed").await;

        let first = endpoint.create_message(&request("r1"), "tok").await.unwrap();
        assert_eq!(first.status, ModerationStatus::Block);
        assert!(endpoint.create_message(&request("r1"), "tok").await.is_err());
        let fallback = endpoint.create_message(&request("r1"), "tok").await.unwrap();
        assert_eq!(fallback.status, ModerationStatus::Allow);
        assert!(fallback.message_id.unwrap().starts_with("mock-msg-"));

        let recorded = endpoint.requests().await;
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[0].access_token, "tok");
    }

    #[tokio::test]
    async fn gated_calls_wait_for_release() {
        let endpoint = std::sync::Arc::new(MockEndpoint::gated());
        let caller = endpoint.clone();
        let call = tokio::spawn(async move { caller.create_message(&request("r2"), "tok").await });

        let pending = endpoint.next_call().await.unwrap();
        assert_eq!(pending.request.room_id, "r2");
        pending.respond(MockEndpoint::allow("m-9"));

        let response = call.await.unwrap().unwrap();
        assert_eq!(response.message_id.as_deref(), Some("m-9"));
    }
}
