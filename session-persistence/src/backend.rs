//! Storage trait for the supervisor's persisted snapshot.
//!
//! The supervisor never updates individual records. Every write hands the
//! store the full set of records, which replaces whatever was stored before.

use async_trait::async_trait;
use session_core::TaskRecord;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem or transport failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Backend-specific error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Durable storage for supervised task records.
///
/// # Example
///
/// ```rust,ignore
/// use session_persistence::{InMemoryStorage, TaskStorage};
/// use session_core::{ClientArgs, TaskRecord};
///
/// let storage = InMemoryStorage::new();
/// storage.save(vec![TaskRecord::new("u1", ClientArgs::new(), "tag")]).await?;
/// let records = storage.load().await?;
/// ```
#[async_trait]
pub trait TaskStorage: Send + Sync {
    /// Prepare the underlying schema or directory.
    ///
    /// Called by the supervisor before a restore. Stores with nothing to
    /// prepare keep the default.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be prepared.
    async fn ensure_tables(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Replace all stored records with `records`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be written. A failed save
    /// must leave the previous snapshot readable.
    async fn save(&self, records: Vec<TaskRecord>) -> Result<(), StorageError>;

    /// Load every stored record.
    ///
    /// Returns an empty vector if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be read or decoded.
    async fn load(&self) -> Result<Vec<TaskRecord>, StorageError>;

    /// Load the records written by the client type with tag `factory_tag`.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    async fn load_tagged(&self, factory_tag: &str) -> Result<Vec<TaskRecord>, StorageError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|record| record.factory_tag.as_deref() == Some(factory_tag))
            .collect())
    }
}
