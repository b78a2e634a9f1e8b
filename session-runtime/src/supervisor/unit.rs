//! The execution unit: one spawned run of a client's connect lifecycle.

use futures::FutureExt;
use session_core::Client;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How an execution unit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// `connect` returned on its own.
    Completed,
    /// `connect` returned an error or panicked.
    Failed(String),
    /// The unit's token fired before `connect` returned.
    Cancelled,
}

impl UnitOutcome {
    /// Whether the unit was stopped through its token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, UnitOutcome::Cancelled)
    }
}

/// Drive `client` until its connection ends or `cancel` fires.
///
/// `disconnect` runs exactly once on every path out of here, including a
/// panic inside `connect`.
pub(crate) async fn run(
    identity: String,
    client: Arc<dyn Client>,
    cancel: CancellationToken,
) -> UnitOutcome {
    let connect = AssertUnwindSafe(client.connect(cancel.clone())).catch_unwind();

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => UnitOutcome::Cancelled,
        result = connect => match result {
            Ok(Ok(())) => UnitOutcome::Completed,
            Ok(Err(e)) => {
                tracing::error!(identity = %identity, error = %e, "Client connection failed");
                UnitOutcome::Failed(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(identity = %identity, panic = %message, "Client connection panicked");
                UnitOutcome::Failed(message)
            }
        },
    };

    if let Err(e) = client.disconnect().await {
        tracing::warn!(identity = %identity, error = %e, "Error disconnecting client");
    }

    tracing::debug!(identity = %identity, outcome = ?outcome, "Execution unit finished");
    outcome
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "connect panicked".to_string()
    }
}
