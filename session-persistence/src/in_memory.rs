//! In-memory implementation of TaskStorage.
//!
//! Useful for testing and as a reference implementation.

use crate::backend::{StorageError, TaskStorage};
use async_trait::async_trait;
use session_core::TaskRecord;
use std::sync::{Arc, RwLock};

/// In-memory storage that keeps the last saved snapshot.
///
/// Clones share the same snapshot, so two supervisors built from clones of
/// one `InMemoryStorage` see each other's writes, the way two processes
/// would see one database.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    records: Arc<RwLock<Vec<TaskRecord>>>,
}

impl InMemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    pub fn with_records(records: Vec<TaskRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

#[async_trait]
impl TaskStorage for InMemoryStorage {
    async fn save(&self, records: Vec<TaskRecord>) -> Result<(), StorageError> {
        let mut stored = self
            .records
            .write()
            .map_err(|e| StorageError::Backend(format!("Lock error: {}", e)))?;
        *stored = records;
        Ok(())
    }

    async fn load(&self) -> Result<Vec<TaskRecord>, StorageError> {
        let stored = self
            .records
            .read()
            .map_err(|e| StorageError::Backend(format!("Lock error: {}", e)))?;
        Ok(stored.clone())
    }
}
