// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the message-creation endpoint.

use std::time::Duration;

use async_trait::async_trait;
use classline_config::model::EndpointConfig;
use classline_core::{ClasslineError, MessageEndpoint, MessageRequest, MessageResponse};
use tracing::debug;

const MESSAGES_PATH: &str = "/api/messages";

/// Error bodies are cut to this many characters before they reach logs.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// `POST {base_url}/api/messages` with bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpMessageEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpMessageEndpoint {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClasslineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClasslineError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            url: format!("{}{MESSAGES_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, ClasslineError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MessageEndpoint for HttpMessageEndpoint {
    async fn create_message(
        &self,
        request: &MessageRequest,
        access_token: &str,
    ) -> Result<MessageResponse, ClasslineError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| ClasslineError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, room_id = %request.room_id, "message endpoint responded");

        let body = response.text().await.map_err(|e| ClasslineError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(ClasslineError::transport(format!(
                "message endpoint returned {status}: {}",
                truncate(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| ClasslineError::Transport {
            message: format!("failed to parse message response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let endpoint = HttpMessageEndpoint::new("https://school.example/", Duration::from_secs(5)).unwrap();
        assert_eq!(endpoint.url(), "https://school.example/api/messages");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "é".repeat(600);
        let cut = truncate(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert_eq!(truncate("short"), "short");
    }
}
