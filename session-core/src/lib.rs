//! Shared building blocks for the session supervisor.
//!
//! This crate holds the pieces every other crate agrees on:
//!
//! - [`Client`]: the capability a per-identity connection implements.
//! - [`ClientArgs`]: the JSON-shaped constructor arguments of a client.
//! - [`TaskRecord`]: the durable projection of one supervised identity.
//! - [`factory_tag`]: the fingerprint that guards restores against a
//!   client type that changed since the record was written.

pub mod args;
pub mod client;
pub mod error;
pub mod record;
pub mod tag;

pub use args::{ClientArgs, to_client_args};
pub use client::Client;
pub use error::ArgsError;
pub use record::TaskRecord;
pub use tag::{factory_tag, tag_for_path};

/// Re-exported so client implementations name the same token type as the supervisor.
pub use tokio_util::sync::CancellationToken;
