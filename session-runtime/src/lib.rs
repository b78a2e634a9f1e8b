//! Supervision of long-lived per-identity client connections.
//!
//! A [`Supervisor`] runs at most one [`Client`] per identity, tracks which
//! identities are running and keeps a durable snapshot of them in a
//! [`TaskStorage`] so a restarted process can bring them back with
//! [`Supervisor::restore_all`].

mod config;
mod error;
mod supervisor;

// Re-exports
pub use config::SupervisorConfig;
pub use error::SupervisorError;
pub use supervisor::{Supervisor, TaskSnapshot, UnitOutcome};

pub use session_core::{CancellationToken, Client, ClientArgs, TaskRecord, factory_tag};
pub use session_persistence as persistence;
pub use session_persistence::{InMemoryStorage, JsonFileStorage, StorageError, TaskStorage};
