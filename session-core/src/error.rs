//! Error types for session-core.

/// Rejection of constructor arguments that cannot be persisted as a JSON object.
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    /// The value failed to serialize.
    #[error("Failed to serialize client args: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The value serialized to something other than an object.
    #[error("Client args must serialize to a JSON object, got {0}")]
    NotAnObject(&'static str),
}
