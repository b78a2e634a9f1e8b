//! The capability a supervised connection implements.

use crate::args::ClientArgs;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A long-lived connection owned by exactly one identity.
///
/// The implementing type doubles as the constructor: the supervisor builds a
/// client with [`Client::from_args`] and fingerprints the type with
/// [`factory_tag`](crate::factory_tag), so renaming the type invalidates
/// records written by the old one.
///
/// # Example
///
/// ```rust,ignore
/// use session_core::{Client, ClientArgs, CancellationToken};
/// use async_trait::async_trait;
///
/// pub struct FeedClient {
///     user_id: String,
///     endpoint: String,
/// }
///
/// #[async_trait]
/// impl Client for FeedClient {
///     fn from_args(identity: &str, args: &ClientArgs) -> anyhow::Result<Self> {
///         let endpoint = args["endpoint"].as_str().unwrap_or_default().to_string();
///         Ok(Self { user_id: identity.to_string(), endpoint })
///     }
///
///     async fn connect(&self, cancel: CancellationToken) -> anyhow::Result<()> {
///         // stream until the peer hangs up or `cancel` fires
///     }
///
///     async fn disconnect(&self) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Client: Send + Sync + 'static {
    /// Build a client for `identity` from its constructor arguments.
    ///
    /// Called once per `start`, including starts issued by a restore. It
    /// must not block.
    ///
    /// # Errors
    ///
    /// Returns an error when the arguments are unusable for this client.
    fn from_args(identity: &str, args: &ClientArgs) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run the connection until it ends on its own or `cancel` fires.
    ///
    /// The supervisor also stops polling this future once `cancel` fires, so
    /// an implementation only needs to watch the token where it holds state
    /// that must be unwound before returning.
    ///
    /// # Errors
    ///
    /// Any error is logged by the supervisor and ends the execution unit.
    async fn connect(&self, cancel: CancellationToken) -> anyhow::Result<()>;

    /// Release whatever `connect` acquired.
    ///
    /// Must be idempotent: the supervisor may call it once from the
    /// execution unit and once more from `stop`.
    ///
    /// # Errors
    ///
    /// Errors are logged and never block `stop` or `shutdown`.
    async fn disconnect(&self) -> anyhow::Result<()>;
}
