//! Persisted task records.
//!
//! A record is the durable projection of one supervised identity. The
//! supervisor always writes the complete set of records at once; there is no
//! per-record update path.

use crate::args::ClientArgs;
use serde::{Deserialize, Serialize};

/// One row of the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// The identity the client runs for.
    pub identity: String,
    /// Constructor arguments, exactly as given to `start`.
    #[serde(default)]
    pub args: ClientArgs,
    /// Tag of the client type that wrote this record.
    /// Records without a tag are restored by any client type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_tag: Option<String>,
}

impl TaskRecord {
    /// Create a record tagged with the writing client type.
    pub fn new(identity: impl Into<String>, args: ClientArgs, factory_tag: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            args,
            factory_tag: Some(factory_tag.into()),
        }
    }

    /// Create a record without a factory tag.
    pub fn untagged(identity: impl Into<String>, args: ClientArgs) -> Self {
        Self {
            identity: identity.into(),
            args,
            factory_tag: None,
        }
    }

    /// Whether a client type with tag `current` may restore this record.
    pub fn is_compatible_with(&self, current: &str) -> bool {
        match &self.factory_tag {
            Some(saved) if !saved.is_empty() => saved == current,
            _ => true,
        }
    }
}
