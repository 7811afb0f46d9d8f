// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lookup trait.

use async_trait::async_trait;

use crate::types::Session;

/// Resolves the currently authenticated session, if any.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Option<Session>;
}

/// A fixed session, or none. Used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSession(pub Option<Session>);

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_session(&self) -> Option<Session> {
        self.0.clone()
    }
}
