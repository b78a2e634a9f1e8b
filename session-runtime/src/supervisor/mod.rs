//! Supervision of per-identity client connections.
//!
//! The supervisor owns a registry with one entry per identity. Each entry
//! holds the client, its constructor arguments and the spawned execution unit
//! driving `connect`. Every change to the registry schedules a debounced
//! write of the full registry to a [`TaskStorage`], and a restarted process
//! rebuilds the registry from that snapshot with
//! [`restore_all`](Supervisor::restore_all).
//!
//! # Example
//!
//! ```rust,ignore
//! use session_runtime::{InMemoryStorage, Supervisor};
//! use serde_json::json;
//!
//! let storage = InMemoryStorage::new();
//! let supervisor = Supervisor::new(storage.clone());
//!
//! supervisor.start::<FeedClient>("u1", json!({"endpoint": "wss://feed"}))?;
//! assert!(supervisor.is_running("u1"));
//!
//! supervisor.shutdown().await;
//!
//! // Next process
//! let supervisor = Supervisor::new(storage);
//! supervisor.restore_all::<FeedClient>().await?;
//! ```

mod unit;


pub use unit::UnitOutcome;

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use session_core::{Client, ClientArgs, TaskRecord, factory_tag, to_client_args};
use session_persistence::{JsonFileStorage, StorageError, TaskStorage};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Read-only view of one registry entry.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot {
    /// Constructor arguments the client was built from.
    pub args: ClientArgs,
    /// Tag of the client type.
    pub factory_tag: String,
    /// When the execution unit was launched.
    pub started_at: DateTime<Utc>,
    /// Whether the execution unit has already ended.
    pub finished: bool,
}

struct TaskEntry {
    args: ClientArgs,
    factory_tag: String,
    client: Arc<dyn Client>,
    // Same allocation as `client`, kept for typed access.
    instance: Arc<dyn Any + Send + Sync>,
    cancel: CancellationToken,
    handle: JoinHandle<UnitOutcome>,
    started_at: DateTime<Utc>,
}

impl TaskEntry {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }

    fn record(&self, identity: &str) -> TaskRecord {
        TaskRecord::new(identity, self.args.clone(), self.factory_tag.clone())
    }
}

struct Inner<S> {
    storage: S,
    config: SupervisorConfig,
    registry: Mutex<BTreeMap<String, TaskEntry>>,
    save_lock: tokio::sync::Mutex<()>,
    pending_save: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

/// Supervisor for long-lived per-identity connections.
///
/// Cloning is cheap; clones drive the same registry.
pub struct Supervisor<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Supervisor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Supervisor<JsonFileStorage> {
    /// Create a supervisor persisting to a JSON file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileStorage::new(path))
    }

    /// Create a supervisor persisting to `./sessions.json`.
    pub fn open_default() -> Self {
        Self::new(JsonFileStorage::default())
    }
}

impl<S> Supervisor<S>
where
    S: TaskStorage + 'static,
{
    /// Create a supervisor with the default configuration.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, SupervisorConfig::default())
    }

    /// Create a supervisor with an explicit configuration.
    pub fn with_config(storage: S, config: SupervisorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                config,
                registry: Mutex::new(BTreeMap::new()),
                save_lock: tokio::sync::Mutex::new(()),
                pending_save: Mutex::new(None),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Settings this supervisor was built with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.inner.config
    }

    /// The backend snapshots are written to.
    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    /// Start a `C` client for `identity`.
    ///
    /// Builds the client with [`Client::from_args`], spawns an execution unit
    /// running its `connect`, registers it and schedules a snapshot write.
    /// The identity counts as running as soon as this returns, before the
    /// connection is necessarily up.
    ///
    /// Returns `Ok(false)` without side effects if the identity already has
    /// a live execution unit. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`SupervisorError::InvalidIdentity`] for an empty identity
    /// - [`SupervisorError::InvalidArgs`] if `args` is not map-shaped
    /// - [`SupervisorError::ClientConstruction`] if `C` rejects the arguments
    /// - [`SupervisorError::ShutDown`] after [`shutdown`](Self::shutdown)
    pub fn start<C: Client>(
        &self,
        identity: impl Into<String>,
        args: impl Serialize,
    ) -> Result<bool, SupervisorError> {
        let identity = identity.into();
        let args = to_client_args(&args).map_err(|source| SupervisorError::InvalidArgs {
            identity: identity.clone(),
            source,
        })?;
        self.start_with_args::<C>(identity, args)
    }

    fn start_with_args<C: Client>(
        &self,
        identity: String,
        args: ClientArgs,
    ) -> Result<bool, SupervisorError> {
        let _span = self.inner.config.span().enter();

        if identity.trim().is_empty() {
            return Err(SupervisorError::InvalidIdentity);
        }
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return Err(SupervisorError::ShutDown);
        }
        if self.is_running(&identity) {
            tracing::info!(identity = %identity, "Task already running");
            return Ok(false);
        }

        let client = Arc::new(C::from_args(&identity, &args).map_err(|source| {
            SupervisorError::ClientConstruction {
                identity: identity.clone(),
                source: source.into(),
            }
        })?);

        {
            let mut registry = lock(&self.inner.registry);
            // Another caller may have won the race while the client was built.
            if registry.get(&identity).is_some_and(TaskEntry::is_live) {
                tracing::info!(identity = %identity, "Task already running");
                return Ok(false);
            }

            let cancel = CancellationToken::new();
            let unit_span = tracing::info_span!(
                parent: self.inner.config.span(),
                "session",
                identity = %identity
            );
            let handle = tokio::spawn(
                unit::run(identity.clone(), client.clone(), cancel.clone()).instrument(unit_span),
            );

            registry.insert(
                identity.clone(),
                TaskEntry {
                    args,
                    factory_tag: factory_tag::<C>(),
                    client: client.clone(),
                    instance: client,
                    cancel,
                    handle,
                    started_at: Utc::now(),
                },
            );
        }

        self.schedule_persist();
        tracing::info!(identity = %identity, "Task started");
        Ok(true)
    }

    /// Stop the execution unit for `identity`.
    ///
    /// The identity disappears from the registry immediately. The call then
    /// waits for the unit to unwind, including its own `disconnect`, and
    /// calls `disconnect` once more. Disconnect errors are logged.
    ///
    /// Stopping an identity that is not running does nothing beyond dropping
    /// a leftover entry whose unit already ended.
    pub async fn stop(&self, identity: &str) {
        let span = self.inner.config.span().clone();
        async {
            let removed = lock(&self.inner.registry).remove(identity);
            let Some(entry) = removed else {
                tracing::info!(identity = %identity, "Task not running");
                return;
            };
            if !entry.is_live() {
                tracing::info!(identity = %identity, "Task not running, dropped finished entry");
                self.schedule_persist();
                return;
            }

            entry.cancel.cancel();
            match entry.handle.await {
                Ok(outcome) => {
                    tracing::debug!(identity = %identity, outcome = ?outcome, "Execution unit joined");
                }
                Err(e) => {
                    tracing::warn!(identity = %identity, error = %e, "Execution unit ended abnormally");
                }
            }

            if let Err(e) = entry.client.disconnect().await {
                tracing::warn!(identity = %identity, error = %e, "Error disconnecting client");
            }

            self.schedule_persist();
            tracing::info!(identity = %identity, "Task stopped");
        }
        .instrument(span)
        .await
    }

    /// Whether `identity` has an execution unit that has not ended yet.
    pub fn is_running(&self, identity: &str) -> bool {
        lock(&self.inner.registry)
            .get(identity)
            .is_some_and(TaskEntry::is_live)
    }

    /// Identities with a live execution unit, in sorted order.
    pub fn running(&self) -> Vec<String> {
        lock(&self.inner.registry)
            .iter()
            .filter(|(_, entry)| entry.is_live())
            .map(|(identity, _)| identity.clone())
            .collect()
    }

    /// Copy of the client map.
    pub fn clients(&self) -> HashMap<String, Arc<dyn Client>> {
        lock(&self.inner.registry)
            .iter()
            .map(|(identity, entry)| (identity.clone(), Arc::clone(&entry.client)))
            .collect()
    }

    /// The client for `identity`, if it is registered and is a `C`.
    pub fn client<C: Client>(&self, identity: &str) -> Option<Arc<C>> {
        let instance = Arc::clone(&lock(&self.inner.registry).get(identity)?.instance);
        instance.downcast::<C>().ok()
    }

    /// Copy of the registry.
    pub fn tasks(&self) -> HashMap<String, TaskSnapshot> {
        lock(&self.inner.registry)
            .iter()
            .map(|(identity, entry)| {
                (
                    identity.clone(),
                    TaskSnapshot {
                        args: entry.args.clone(),
                        factory_tag: entry.factory_tag.clone(),
                        started_at: entry.started_at,
                        finished: !entry.is_live(),
                    },
                )
            })
            .collect()
    }

    /// Restart every stored identity with client type `C`.
    ///
    /// Records written by a different client type are skipped with a
    /// warning. Records are started one after another in the order the
    /// store returns them; a record that fails to start is logged and does
    /// not stop the rest. Returns how many identities were started.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Storage`] if the snapshot cannot be loaded.
    pub async fn restore_all<C: Client>(&self) -> Result<usize, SupervisorError> {
        let span = self.inner.config.span().clone();
        async {
            if let Err(e) = self.inner.storage.ensure_tables().await {
                tracing::warn!(error = %e, "Failed to prepare storage, loading anyway");
            }

            let records = self.inner.storage.load().await?;
            let current = factory_tag::<C>();
            let mut started = 0;

            for record in records {
                if !record.is_compatible_with(&current) {
                    tracing::warn!(
                        identity = %record.identity,
                        saved = record.factory_tag.as_deref().unwrap_or_default(),
                        current = %current,
                        "Factory mismatch, skipping restore"
                    );
                    continue;
                }

                let identity = record.identity.clone();
                match self.start_with_args::<C>(record.identity, record.args) {
                    Ok(true) => started += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!(identity = %identity, error = %e, "Failed to restore task");
                    }
                }
            }

            tracing::info!(started, "Restored tasks from storage");
            Ok::<_, SupervisorError>(started)
        }
        .instrument(span)
        .await
    }

    /// Write the current registry to storage right away.
    ///
    /// Waits for any write already in flight. Does nothing after
    /// [`shutdown`](Self::shutdown), whose snapshot is final.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Storage`] if the write fails.
    pub async fn persist_now(&self) -> Result<(), SupervisorError> {
        self.inner.persist_now().await?;
        Ok(())
    }

    /// Stop everything and write the final snapshot.
    ///
    /// Cancels a pending debounced write, cancels every execution unit and
    /// waits for all of them, then writes the snapshot once without
    /// debouncing. A failed write is logged. The registry is empty afterward
    /// and further `start` calls fail with [`SupervisorError::ShutDown`].
    pub async fn shutdown(&self) {
        let span = self.inner.config.span().clone();
        async {
            tracing::info!("Shutting down supervisor, cancelling all tasks");
            self.inner.shut_down.store(true, Ordering::SeqCst);

            if let Some(pending) = lock(&self.inner.pending_save).take() {
                pending.abort();
            }

            let entries = std::mem::take(&mut *lock(&self.inner.registry));
            let records = if self.inner.config.retain_on_shutdown() {
                entries
                    .iter()
                    .map(|(identity, entry)| entry.record(identity))
                    .collect()
            } else {
                Vec::new()
            };

            for entry in entries.values() {
                entry.cancel.cancel();
            }
            let results =
                futures::future::join_all(entries.into_values().map(|entry| entry.handle)).await;
            for result in results {
                if let Err(e) = result {
                    tracing::debug!(error = %e, "Execution unit ended abnormally during shutdown");
                }
            }

            if let Err(e) = self.inner.save(records).await {
                tracing::error!(error = %e, "Error persisting during shutdown");
            }

            tracing::info!("All tasks stopped cleanly");
        }
        .instrument(span)
        .await
    }

    fn schedule_persist(&self) {
        // The snapshot written by shutdown is final.
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return;
        }
        let mut pending = lock(&self.inner.pending_save);
        if pending.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let delay = self.inner.config.persist_debounce();
        let task = async move {
            tokio::time::sleep(delay).await;
            // Disarm before reading the registry so later changes re-arm.
            lock(&inner.pending_save).take();
            if let Err(e) = inner.persist_now().await {
                tracing::error!(error = %e, "Failed to persist tasks");
            }
        };
        *pending = Some(tokio::spawn(task.instrument(self.inner.config.span().clone())));
    }
}

impl<S> Inner<S>
where
    S: TaskStorage,
{
    fn records(&self) -> Vec<TaskRecord> {
        lock(&self.registry)
            .iter()
            .map(|(identity, entry)| entry.record(identity))
            .collect()
    }

    async fn persist_now(&self) -> Result<(), StorageError> {
        let _guard = self.save_lock.lock().await;
        if self.shut_down.load(Ordering::SeqCst) {
            tracing::debug!("Supervisor shut down, skipping persist");
            return Ok(());
        }
        self.write(self.records()).await
    }

    async fn save(&self, records: Vec<TaskRecord>) -> Result<(), StorageError> {
        let _guard = self.save_lock.lock().await;
        self.write(records).await
    }

    // Callers hold `save_lock`.
    async fn write(&self, records: Vec<TaskRecord>) -> Result<(), StorageError> {
        let count = records.len();
        self.storage.save(records).await?;
        tracing::debug!(records = count, "Persisted tasks to storage");
        Ok(())
    }
}
