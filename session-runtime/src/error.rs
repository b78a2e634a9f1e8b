//! Error type for supervisor operations.

use session_core::ArgsError;
use session_persistence::StorageError;

/// Errors returned to callers of the supervisor.
///
/// Only caller misuse and storage reads surface here. Connection failures,
/// disconnect failures and background writes are logged where they happen.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The identity was empty or whitespace.
    #[error("Identity must not be empty")]
    InvalidIdentity,
    /// The constructor arguments cannot be stored as a JSON object.
    #[error("Invalid client args for '{identity}': {source}")]
    InvalidArgs {
        identity: String,
        #[source]
        source: ArgsError,
    },
    /// The client type rejected its arguments.
    #[error("Failed to construct client for '{identity}': {source}")]
    ClientConstruction {
        identity: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// `start` was called after `shutdown`.
    #[error("Supervisor has been shut down")]
    ShutDown,
    /// The store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
