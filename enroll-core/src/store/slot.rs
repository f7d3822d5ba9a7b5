use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::EnrollmentAnswer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Stored record is unreadable: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// A named key-value persistence slot holding one serialized record.
///
/// Implementations only move bytes; merge and reset semantics live in
/// [`super::EnrollmentStore`].
#[async_trait]
pub trait AnswerSlot: Send + Sync {
    /// Record stored under `key`, or `None` if the slot is empty.
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<EnrollmentAnswer>, StoreError>;

    /// Overwrites the slot with `answer`.
    async fn save(
        &self,
        key: &str,
        answer: &EnrollmentAnswer,
    ) -> Result<(), StoreError>;

    /// Empties the slot. Clearing an empty slot is not an error.
    async fn clear(
        &self,
        key: &str,
    ) -> Result<(), StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// memory
// ─────────────────────────────────────────────────────────────────────────────

/// In-process slot. Cloning shares the underlying map, so a clone can stand
/// in for "the same storage after a reload".
///
/// Records are kept in serialized form to exercise the same encoding as the
/// durable backends.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw serialized payload under `key`.
    pub fn raw(
        &self,
        key: &str,
    ) -> Option<String> {
        self.lock().ok()?.get(key).cloned()
    }

    /// Stores an arbitrary payload, bypassing serialization.
    pub fn put_raw(
        &self,
        key: &str,
        payload: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), payload.into());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Storage(format!("memory slot poisoned: {e}")))
    }
}

#[async_trait]
impl AnswerSlot for MemorySlot {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<EnrollmentAnswer>, StoreError> {
        match self.lock()?.get(key) {
            Some(payload) => Ok(Some(serde_json::from_str(payload)?)),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        key: &str,
        answer: &EnrollmentAnswer,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(answer)?;
        self.lock()?.insert(key.to_string(), payload);
        Ok(())
    }

    async fn clear(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// file
// ─────────────────────────────────────────────────────────────────────────────

/// One pretty-printed JSON document per key, stored as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Uses `dir` for slot files; the directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document backing `key`.
    pub fn path_for(
        &self,
        key: &str,
    ) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl AnswerSlot for FileSlot {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<EnrollmentAnswer>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Storage(format!(
                "cannot read '{}': {e}",
                path.display()
            ))),
        }
    }

    async fn save(
        &self,
        key: &str,
        answer: &EnrollmentAnswer,
    ) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            StoreError::Storage(format!("cannot create '{}': {e}", self.dir.display()))
        })?;

        // Staged then renamed: readers never see a partial document.
        let path = self.path_for(key);
        let staging = self.dir.join(format!("{key}.json.tmp"));
        let payload = serde_json::to_string_pretty(answer)?;
        tokio::fs::write(&staging, payload).await.map_err(|e| {
            StoreError::Storage(format!("cannot write '{}': {e}", staging.display()))
        })?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| StoreError::Storage(format!("cannot replace '{}': {e}", path.display())))
    }

    async fn clear(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Storage(format!(
                "cannot remove '{}': {e}",
                path.display()
            ))),
        }
    }
}
