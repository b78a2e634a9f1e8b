//! File-backed implementation of TaskStorage.
//!
//! The snapshot is a single JSON array of records. Saves go to a sibling
//! temporary file first and are renamed over the target, so readers only
//! ever see a complete snapshot.

use crate::backend::{StorageError, TaskStorage};
use async_trait::async_trait;
use session_core::TaskRecord;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Path used when the caller does not pick one.
pub const DEFAULT_SNAPSHOT_PATH: &str = "./sessions.json";

/// Storage that keeps the snapshot in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first save or
    /// [`ensure_tables`](TaskStorage::ensure_tables). Both create missing
    /// parent directories.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("sessions"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonFileStorage {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_PATH)
    }
}

#[async_trait]
impl TaskStorage for JsonFileStorage {
    async fn ensure_tables(&self) -> Result<(), StorageError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(dir).await?;
            }
            _ => {}
        }
        Ok(())
    }

    async fn save(&self, records: Vec<TaskRecord>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(&records)?;
        self.ensure_tables().await?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "Wrote task snapshot"
        );
        Ok(())
    }

    async fn load(&self) -> Result<Vec<TaskRecord>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
