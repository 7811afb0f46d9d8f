// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The view side of optimistic sending.
//!
//! A [`MessageView`] shows placeholders immediately and swaps them for the
//! server outcome once it arrives. [`MessageTimeline`] is the in-memory
//! implementation used by the CLI and tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use classline_core::TempId;
use tracing::{debug, warn};

use crate::message::{MessageStatus, OptimisticMessage, Resolution, StatusKind};

/// Receives optimistic placeholders and their resolutions.
pub trait MessageView: Send + Sync {
    fn insert_pending(&self, message: OptimisticMessage);

    /// Applies the final outcome for `temp_id`. Unknown or already resolved
    /// ids are ignored.
    fn resolve(&self, temp_id: &TempId, resolution: Resolution);
}

/// Ordered list of a room's optimistic messages.
#[derive(Default)]
pub struct MessageTimeline {
    entries: Mutex<Vec<OptimisticMessage>>,
}

impl MessageTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OptimisticMessage>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Vec<OptimisticMessage> {
        self.lock().clone()
    }

    pub fn get(&self, temp_id: &TempId) -> Option<OptimisticMessage> {
        self.lock().iter().find(|m| &m.temp_id == temp_id).cloned()
    }

    /// Discards an entry, typically a failed one the user dismissed.
    pub fn remove(&self, temp_id: &TempId) -> Option<OptimisticMessage> {
        let mut entries = self.lock();
        let index = entries.iter().position(|m| &m.temp_id == temp_id)?;
        Some(entries.remove(index))
    }

    pub fn count_with_status(&self, kind: StatusKind) -> usize {
        self.lock().iter().filter(|m| m.status.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl MessageView for MessageTimeline {
    fn insert_pending(&self, message: OptimisticMessage) {
        let mut entries = self.lock();
        if entries.iter().any(|m| m.temp_id == message.temp_id) {
            warn!(temp_id = %message.temp_id, "placeholder already present, insert ignored");
            return;
        }
        entries.push(message);
    }

    fn resolve(&self, temp_id: &TempId, resolution: Resolution) {
        let mut entries = self.lock();
        let Some(entry) = entries.iter_mut().find(|m| &m.temp_id == temp_id) else {
            debug!(%temp_id, "resolution for unknown message ignored");
            return;
        };
        if entry.status != MessageStatus::Pending {
            debug!(%temp_id, status = %entry.status.kind(), "message already resolved");
            return;
        }
        entry.status = resolution.into();
    }
}
