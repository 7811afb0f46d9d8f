// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable local storage for the metrics blob.

use crate::error::ClasslineError;
use crate::types::Metric;

/// A single keyed blob holding the serialized metrics array.
///
/// Calls are synchronous: the buffer rewrites the whole blob after every
/// record, and callers never await telemetry.
pub trait MetricsPersistence: Send + Sync {
    /// Reads the persisted metrics. `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<Metric>>, ClasslineError>;

    /// Replaces the persisted blob with `metrics`.
    fn save(&self, metrics: &[Metric]) -> Result<(), ClasslineError>;

    /// Deletes the persisted blob. Removing a missing blob is not an error.
    fn remove(&self) -> Result<(), ClasslineError>;
}
