// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message-creation endpoint trait.

use async_trait::async_trait;

use crate::error::ClasslineError;
use crate::types::{MessageRequest, MessageResponse};

/// The backend endpoint that creates chat messages.
///
/// Implementations must map non-2xx responses and unparseable bodies to
/// [`ClasslineError::Transport`]; only well-formed moderation outcomes are
/// returned as `Ok`.
#[async_trait]
pub trait MessageEndpoint: Send + Sync {
    async fn create_message(
        &self,
        request: &MessageRequest,
        access_token: &str,
    ) -> Result<MessageResponse, ClasslineError>;
}
