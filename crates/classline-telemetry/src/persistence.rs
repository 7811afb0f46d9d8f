// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence backends for the metrics blob.
//!
//! [`JsonFileStore`] keeps one `<key>.json` file per blob. Writes go to a
//! sibling temp file and are renamed into place, so a crash mid-write leaves
//! the previous blob intact. [`MemoryStore`] keeps the serialized blob in
//! memory for tests and clients that opt out of disk persistence.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use classline_core::{ClasslineError, Metric, MetricsPersistence};
use tracing::debug;

/// Metrics blob stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Blob `key` under directory `dir`. The directory is created on first save.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetricsPersistence for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<Metric>>, ClasslineError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClasslineError::storage(e)),
        };
        let metrics = serde_json::from_str(&content).map_err(ClasslineError::storage)?;
        Ok(Some(metrics))
    }

    fn save(&self, metrics: &[Metric]) -> Result<(), ClasslineError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(ClasslineError::storage)?;
        }
        let json = serde_json::to_vec(metrics).map_err(ClasslineError::storage)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(ClasslineError::storage)?;
        std::fs::rename(&tmp, &self.path).map_err(ClasslineError::storage)?;
        debug!(path = %self.path.display(), count = metrics.len(), "metrics blob written");
        Ok(())
    }

    fn remove(&self) -> Result<(), ClasslineError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClasslineError::storage(e)),
        }
    }
}

/// In-memory metrics blob.
///
/// Stores the serialized JSON rather than the values so that a save/load
/// cycle exercises the same encoding as the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with a raw blob, e.g. a corrupt one.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent `save`/`remove` calls fail, to simulate a full disk.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The raw persisted blob, if any.
    pub fn raw(&self) -> Option<String> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_writable(&self) -> Result<(), ClasslineError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClasslineError::storage(std::io::Error::other(
                "storage quota exceeded",
            )));
        }
        Ok(())
    }
}

impl MetricsPersistence for MemoryStore {
    fn load(&self) -> Result<Option<Vec<Metric>>, ClasslineError> {
        match self.raw() {
            Some(blob) => serde_json::from_str(&blob)
                .map(Some)
                .map_err(ClasslineError::storage),
            None => Ok(None),
        }
    }

    fn save(&self, metrics: &[Metric]) -> Result<(), ClasslineError> {
        self.check_writable()?;
        let json = serde_json::to_string(metrics).map_err(ClasslineError::storage)?;
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }

    fn remove(&self) -> Result<(), ClasslineError> {
        self.check_writable()?;
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use classline_core::{Metadata, MetricType};

    use super::*;

    fn metric(duration_ms: u64) -> Metric {
        Metric {
            metric_type: MetricType::RoomSwitch,
            duration_ms,
            timestamp: 1_700_000_000_000,
            success: true,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"), "metrics");
        assert!(store.load().unwrap().is_none());

        store.save(&[metric(1), metric(2)]).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, vec![metric(1), metric(2)]);
        assert!(!store.path().with_extension("json.tmp").exists());

        store.remove().unwrap();
        assert!(store.load().unwrap().is_none());
        // Removing twice is fine.
        store.remove().unwrap();
    }

    #[test]
    fn file_store_reports_corrupt_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path(), "metrics");
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(ClasslineError::Storage { .. })));
    }

    #[test]
    fn memory_store_can_fail_writes() {
        let store = MemoryStore::new();
        store.save(&[metric(5)]).unwrap();
        store.set_fail_writes(true);
        assert!(store.save(&[]).is_err());
        assert!(store.remove().is_err());
        assert_eq!(store.load().unwrap().unwrap(), vec![metric(5)]);
    }
}
