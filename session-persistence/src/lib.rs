//! Persistence layer for supervised sessions.
//!
//! This crate provides the storage capability the supervisor writes its
//! snapshot to, plus two implementations.
//!
//! # Architecture
//!
//! - **TaskStorage**: a trait that abstracts the storage mechanism. A save
//!   always replaces the whole snapshot.
//! - **InMemoryStorage**: a reference implementation over a shared `Vec`.
//! - **JsonFileStorage**: a single JSON file replaced atomically on save.
//!
//! # Implementing Custom Stores
//!
//! ```rust,ignore
//! use session_persistence::{StorageError, TaskStorage};
//! use session_core::TaskRecord;
//! use async_trait::async_trait;
//!
//! pub struct PostgresStorage {
//!     // your connection pool
//! }
//!
//! #[async_trait]
//! impl TaskStorage for PostgresStorage {
//!     async fn ensure_tables(&self) -> Result<(), StorageError> {
//!         // CREATE TABLE IF NOT EXISTS task_state (...)
//!     }
//!     async fn save(&self, records: Vec<TaskRecord>) -> Result<(), StorageError> {
//!         // DELETE + INSERT in one transaction
//!     }
//!     async fn load(&self) -> Result<Vec<TaskRecord>, StorageError> {
//!         // SELECT identity, args, factory_tag FROM task_state
//!     }
//! }
//! ```

mod backend;
mod in_memory;
mod json_file;

pub use backend::{StorageError, TaskStorage};
pub use in_memory::InMemoryStorage;
pub use json_file::{DEFAULT_SNAPSHOT_PATH, JsonFileStorage};
