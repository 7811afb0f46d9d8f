// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer correlation store.
//!
//! Correlates the start of an asynchronous operation with its completion,
//! which is usually signalled from a different code path. Completion turns
//! the pending timer into a [`Metric`] recorded in the [`MetricsBuffer`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use classline_core::{Clock, Metadata, Metric, MetricType, OperationId};
use tracing::{debug, warn};

use crate::buffer::MetricsBuffer;

/// Completion details passed to [`TimerStore::end`].
#[derive(Debug, Clone)]
pub struct EndOptions {
    pub metadata: Metadata,
    pub success: bool,
}

impl Default for EndOptions {
    fn default() -> Self {
        Self {
            metadata: Metadata::new(),
            success: true,
        }
    }
}

impl EndOptions {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failure() -> Self {
        Self {
            success: false,
            ..Self::default()
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Pending timers keyed by operation id.
pub struct TimerStore {
    pending: Mutex<HashMap<OperationId, i64>>,
    buffer: Arc<MetricsBuffer>,
    clock: Arc<dyn Clock>,
}

impl TimerStore {
    pub fn new(buffer: Arc<MetricsBuffer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            buffer,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<OperationId, i64>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts timing `id`.
    ///
    /// Starting an id that is already pending overwrites its start time. Retried
    /// operations rely on this; the earlier attempt's time is lost.
    pub fn start(&self, id: &OperationId) {
        let now = self.clock.now_ms();
        if let Some(previous) = self.lock().insert(id.clone(), now) {
            debug!(operation = %id, previous_start = previous, "timer restarted, earlier start discarded");
        }
    }

    /// Generates a fresh id and starts timing it.
    pub fn start_new(&self) -> OperationId {
        let id = OperationId::generate();
        self.start(&id);
        id
    }

    /// Ends timing `id` and records the resulting metric.
    ///
    /// Returns the measured duration, or `None` if `id` was not pending
    /// (never started, already ended, or cancelled). Duplicate and
    /// out-of-order completions are expected under network races.
    pub fn end(&self, id: &OperationId, metric_type: MetricType, options: EndOptions) -> Option<u64> {
        let Some(started) = self.lock().remove(id) else {
            warn!(operation = %id, metric_type = %metric_type, "timer ended without a matching start");
            return None;
        };

        let now = self.clock.now_ms();
        let duration_ms = u64::try_from(now - started).unwrap_or(0);
        self.buffer.record(Metric {
            metric_type,
            duration_ms,
            timestamp: now,
            success: options.success,
            metadata: options.metadata,
        });
        Some(duration_ms)
    }

    /// Drops a pending timer without recording anything.
    pub fn cancel(&self, id: &OperationId) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn is_pending(&self, id: &OperationId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    /// Times `fut`, recording `success = result.is_ok()`.
    pub async fn measure<F, T, E>(&self, metric_type: MetricType, metadata: Metadata, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let id = self.start_new();
        let result = fut.await;
        self.end(
            &id,
            metric_type,
            EndOptions {
                metadata,
                success: result.is_ok(),
            },
        );
        result
    }

    pub fn buffer(&self) -> &Arc<MetricsBuffer> {
        &self.buffer
    }
}
