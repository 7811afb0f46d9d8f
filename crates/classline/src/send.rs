// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `classline send` command implementation.

use std::io::IsTerminal;
use std::sync::Arc;

use classline_chat::{
    HttpMessageEndpoint, MessageDraft, MessageTimeline, OptimisticSendCoordinator, SendError,
    SendReceipt,
};
use classline_config::model::{ClasslineConfig, EndpointConfig};
use classline_core::{ClasslineError, MessageEndpoint, Session, StaticSession, SystemClock};
use classline_telemetry::TelemetryService;
use tracing::info;

#[derive(Debug)]
pub struct SendArgs {
    pub room: String,
    pub body: Option<String>,
    pub image: Option<String>,
    pub reply_to: Option<String>,
}

impl SendArgs {
    fn into_draft(self) -> MessageDraft {
        let mut draft = match (self.body, self.image) {
            (_, Some(image)) => MessageDraft::image(&self.room, &image),
            (body, None) => MessageDraft::text(&self.room, body.as_deref().unwrap_or_default()),
        };
        if let Some(reply_to) = self.reply_to {
            draft = draft.with_reply_to(&reply_to);
        }
        draft
    }
}

/// The session configured under `[endpoint]`, if both halves are present.
fn configured_session(endpoint: &EndpointConfig) -> Option<Session> {
    Some(Session {
        user_id: endpoint.user_id.clone()?,
        access_token: endpoint.access_token.clone()?,
    })
}

/// Run the `classline send` command.
///
/// Returns whether the message was delivered.
pub async fn run_send(config: &ClasslineConfig, args: SendArgs) -> Result<bool, ClasslineError> {
    let endpoint = HttpMessageEndpoint::from_config(&config.endpoint)?;
    let telemetry = TelemetryService::from_config(&config.telemetry);
    let session = configured_session(&config.endpoint);
    info!(room = %args.room, base_url = %config.endpoint.base_url, "sending message");
    let outcome = send_with(Arc::new(endpoint), session, &telemetry, args.into_draft()).await;

    let use_color = std::io::stdout().is_terminal();
    print_outcome(&outcome, use_color);
    Ok(outcome.is_ok())
}

async fn send_with(
    endpoint: Arc<dyn MessageEndpoint>,
    session: Option<Session>,
    telemetry: &TelemetryService,
    draft: MessageDraft,
) -> Result<SendReceipt, SendError> {
    let coordinator = OptimisticSendCoordinator::new(
        endpoint,
        Arc::new(StaticSession(session)),
        telemetry.timers().clone(),
        Arc::new(SystemClock),
    );
    let timeline = Arc::new(MessageTimeline::new());
    coordinator.send(&Arc::downgrade(&timeline), draft).await
}

fn print_outcome(outcome: &Result<SendReceipt, SendError>, use_color: bool) {
    use colored::Colorize;

    match outcome {
        Ok(receipt) => {
            let took = receipt
                .duration_ms
                .map(|ms| format!(" in {ms}ms"))
                .unwrap_or_default();
            let note = if receipt.flagged {
                " (flagged for review)"
            } else {
                ""
            };
            if use_color {
                println!("{} delivered {}{took}{note}", "✓".green(), receipt.message_id.0);
            } else {
                println!("[OK] delivered {}{took}{note}", receipt.message_id.0);
            }
        }
        Err(SendError::Unauthenticated) => {
            let hint = "set endpoint.user_id and endpoint.access_token (or CLASSLINE_ENDPOINT_*)";
            if use_color {
                println!("{} not signed in: {hint}", "✗".red());
            } else {
                println!("[FAIL] not signed in: {hint}");
            }
        }
        Err(e) => {
            let note = if e.had_placeholder() { "" } else { " (nothing was sent)" };
            if use_color {
                println!("{} {e}{note}", "✗".red());
            } else {
                println!("[FAIL] {e}{note}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use classline_core::{ManualClock, MetricType};
    use classline_test_utils::{test_session, MockEndpoint};

    use super::*;

    fn args(body: Option<&str>, image: Option<&str>) -> SendArgs {
        SendArgs {
            room: "room-1".to_string(),
            body: body.map(str::to_string),
            image: image.map(str::to_string),
            reply_to: Some("m-0".to_string()),
        }
    }

    #[test]
    fn image_args_build_image_draft() {
        let draft = args(None, Some("https://cdn/a.png")).into_draft();
        assert_eq!(draft.image_url.as_deref(), Some("https://cdn/a.png"));
        assert_eq!(draft.body, None);
        assert_eq!(draft.reply_to.as_deref(), Some("m-0"));
    }

    #[test]
    fn session_needs_both_halves() {
        let mut endpoint = EndpointConfig::default();
        assert!(configured_session(&endpoint).is_none());
        endpoint.user_id = Some("teacher-1".to_string());
        assert!(configured_session(&endpoint).is_none());
        endpoint.access_token = Some("tok".to_string());
        assert_eq!(configured_session(&endpoint).unwrap().access_token, "tok");
    }

    #[tokio::test]
    async fn send_records_message_send_metric() {
        let telemetry = TelemetryService::in_memory(Arc::new(ManualClock::new(0)));
        let endpoint = Arc::new(MockEndpoint::with_responses(vec![MockEndpoint::allow("m-5")]));

        let receipt = send_with(
            endpoint.clone(),
            Some(test_session()),
            &telemetry,
            args(Some("hello class"), None).into_draft(),
        )
        .await
        .unwrap();
        assert_eq!(receipt.message_id.0, "m-5");
        assert_eq!(
            telemetry.buffer().stats(MetricType::MessageSend).map(|s| s.count),
            Some(1)
        );
        assert_eq!(endpoint.requests().await[0].request.reply_to.as_deref(), Some("m-0"));
    }

    #[tokio::test]
    async fn missing_session_is_unauthenticated() {
        let telemetry = TelemetryService::in_memory(Arc::new(ManualClock::new(0)));
        let outcome = send_with(
            Arc::new(MockEndpoint::new()),
            None,
            &telemetry,
            args(Some("hi"), None).into_draft(),
        )
        .await;
        assert_eq!(outcome, Err(SendError::Unauthenticated));
    }
}
