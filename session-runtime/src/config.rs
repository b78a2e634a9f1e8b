//! Supervisor configuration.

use std::time::Duration;
use tracing::Span;

const DEFAULT_PERSIST_DEBOUNCE: Duration = Duration::from_millis(500);

/// Tunables for a [`Supervisor`](crate::Supervisor).
///
/// # Example
///
/// ```rust,ignore
/// use session_runtime::{InMemoryStorage, Supervisor, SupervisorConfig};
/// use std::time::Duration;
///
/// let config = SupervisorConfig::default()
///     .with_persist_debounce(Duration::from_secs(2))
///     .with_span(tracing::info_span!("feeds"));
/// let supervisor = Supervisor::with_config(InMemoryStorage::new(), config);
/// ```
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    persist_debounce: Duration,
    retain_on_shutdown: bool,
    span: Span,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            persist_debounce: DEFAULT_PERSIST_DEBOUNCE,
            retain_on_shutdown: true,
            span: tracing::info_span!("supervisor"),
        }
    }
}

impl SupervisorConfig {
    /// Set how long a state change waits before the snapshot is written.
    ///
    /// Changes arriving while a write is pending ride along with it.
    #[must_use]
    pub fn with_persist_debounce(mut self, debounce: Duration) -> Self {
        self.persist_debounce = debounce;
        self
    }

    /// Choose what the final snapshot written by `shutdown` contains.
    ///
    /// With `true` (default) it holds every identity that was running when
    /// shutdown began, so the next process can restore them. With `false` it
    /// is empty.
    #[must_use]
    pub fn with_retain_on_shutdown(mut self, retain: bool) -> Self {
        self.retain_on_shutdown = retain;
        self
    }

    /// Set the span all supervisor logging is recorded under.
    ///
    /// Execution units and background writes run in child spans of it.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn persist_debounce(&self) -> Duration {
        self.persist_debounce
    }

    pub fn retain_on_shutdown(&self) -> bool {
        self.retain_on_shutdown
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
