//! Sync coordinator.
//!
//! Runs sync cycles. A cycle checks that the remote is reachable, takes a
//! bounded batch of pending entries in `created_at` order and replays them
//! one at a time, recording each outcome in the queue. At most one cycle
//! runs at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use super::entry::{QueueStats, SyncQueueEntry, SyncStatus};
use super::payload::Mutation;
use super::queue::QueueStore;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::remote::RemoteClient;

/// Prefix recorded on entries whose retry budget ran out.
pub const TERMINAL_PREFIX: &str = "Max retries exceeded: ";

/// Coordinator knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Failed attempts allowed before an entry becomes terminal
    pub max_retries: u32,
    /// Maximum entries processed per cycle
    pub batch_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            batch_size: 50,
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            batch_size: config.batch_size,
        }
    }
}

/// One failed entry in a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryError {
    pub id: String,
    pub error: String,
}

/// Aggregated result of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<EntryError>,
}

impl SyncResult {
    /// Total entries attempted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.success + self.failed
    }

    fn record(&mut self, id: &str, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Synced => self.success += 1,
            EntryOutcome::Retrying { error } | EntryOutcome::Exhausted { error } => {
                self.failed += 1;
                self.errors.push(EntryError {
                    id: id.to_string(),
                    error,
                });
            },
        }
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Another cycle held the single-flight flag; nothing was done.
    Skipped,
    /// The health check failed; no entry was touched.
    Offline,
    /// The batch was processed.
    Completed(SyncResult),
}

impl CycleOutcome {
    /// Counts for this cycle; empty unless the batch was processed.
    #[must_use]
    pub fn result(&self) -> SyncResult {
        match self {
            Self::Completed(result) => result.clone(),
            Self::Skipped | Self::Offline => SyncResult::default(),
        }
    }
}

/// Outcome of replaying a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Remote accepted the mutation; the entry was deleted.
    Synced,
    /// Attempt failed; the entry stays pending for a later cycle.
    Retrying { error: String },
    /// Attempt failed and the retry budget is spent; the entry is now `failed`.
    Exhausted { error: String },
}

/// Clears the in-progress flag when a cycle ends, however it ends.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives sync cycles against an injected store and remote client.
pub struct SyncCoordinator {
    store: Arc<dyn QueueStore>,
    remote: Arc<dyn RemoteClient>,
    options: SyncOptions,
    in_progress: AtomicBool,
}

impl SyncCoordinator {
    /// Create a coordinator.
    #[must_use]
    pub fn new(
        store: Arc<dyn QueueStore>,
        remote: Arc<dyn RemoteClient>,
        options: SyncOptions,
    ) -> Self {
        Self {
            store,
            remote,
            options,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Whether a cycle (or a manual single-entry sync) is running.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run one cycle.
    ///
    /// Returns `CycleOutcome::Skipped` immediately if a cycle is already
    /// running. Per-entry failures are recorded in the result and never
    /// returned as errors.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Storage` if the queue cannot be read or updated.
    pub async fn run_sync(&self) -> Result<CycleOutcome, SyncError> {
        let Some(_guard) = FlightGuard::acquire(&self.in_progress) else {
            tracing::info!("previous sync still in progress, skipping");
            return Ok(CycleOutcome::Skipped);
        };

        let started = Instant::now();
        tracing::info!("starting sync cycle");

        match self.process_queue().await {
            Ok(outcome) => {
                if let CycleOutcome::Completed(result) = &outcome {
                    tracing::info!(
                        success = result.success,
                        failed = result.failed,
                        elapsed = ?started.elapsed(),
                        "sync cycle completed"
                    );
                }
                Ok(outcome)
            },
            Err(e) => {
                tracing::error!(error = %e, "sync cycle aborted");
                Err(e)
            },
        }
    }

    async fn process_queue(&self) -> Result<CycleOutcome, SyncError> {
        if !self.remote.health_check().await {
            tracing::warn!("remote API is not reachable, skipping cycle");
            return Ok(CycleOutcome::Offline);
        }

        let released = self.store.release_processing()?;
        if released > 0 {
            tracing::warn!(released, "returned interrupted entries to pending");
        }

        log_stats("queue before", &self.store.stats()?);

        let batch = self
            .store
            .fetch_pending(self.options.batch_size, self.options.max_retries)?;

        let mut result = SyncResult::default();
        for entry in &batch {
            if let Some(outcome) = self.process_entry(entry).await? {
                result.record(&entry.id, outcome);
            }
        }

        log_stats("queue after", &self.store.stats()?);

        Ok(CycleOutcome::Completed(result))
    }

    /// Replay one entry and record the outcome in the store.
    ///
    /// Returns `None` without calling the remote if the row is gone by the
    /// time it is claimed.
    async fn process_entry(
        &self,
        entry: &SyncQueueEntry,
    ) -> Result<Option<EntryOutcome>, SyncError> {
        if !self.store.mark_processing(&entry.id)? {
            tracing::warn!(id = %entry.id, "entry vanished before dispatch, skipping");
            return Ok(None);
        }

        let outcome = match self.dispatch(entry).await {
            Ok(()) => {
                self.store.delete_by_id(&entry.id)?;
                tracing::debug!(id = %entry.id, action = %entry.action_type, "entry synced");
                EntryOutcome::Synced
            },
            Err(e) if e.is_storage() => return Err(e),
            Err(e) => self.record_failure(entry, e.to_string())?,
        };
        Ok(Some(outcome))
    }

    fn record_failure(
        &self,
        entry: &SyncQueueEntry,
        error: String,
    ) -> Result<EntryOutcome, SyncError> {
        let attempts = entry.retry_count.saturating_add(1);

        if attempts < self.options.max_retries {
            self.store.retry_later(&entry.id, &error)?;
            tracing::warn!(
                id = %entry.id,
                attempts,
                max_retries = self.options.max_retries,
                error = %error,
                "sync attempt failed, will retry"
            );
            Ok(EntryOutcome::Retrying { error })
        } else {
            self.store
                .mark_failed_terminal(&entry.id, &format!("{TERMINAL_PREFIX}{error}"))?;
            tracing::warn!(
                id = %entry.id,
                attempts,
                error = %error,
                "sync entry failed permanently"
            );
            Ok(EntryOutcome::Exhausted { error })
        }
    }

    async fn dispatch(&self, entry: &SyncQueueEntry) -> Result<(), SyncError> {
        match Mutation::from_entry(entry)? {
            Mutation::CreateTodo(request) => {
                self.remote.create(&request).await?;
            },
            Mutation::UpdateTodo { remote_id, request } => {
                self.remote.update(remote_id, &request).await?;
            },
            Mutation::DeleteTodo { remote_id } => {
                self.remote.delete(remote_id).await?;
            },
        }
        Ok(())
    }

    /// Replay one entry now, outside the normal batch (manual retry).
    ///
    /// # Errors
    ///
    /// Returns `Busy` while a cycle runs, `NotFound` for an unknown id,
    /// `AlreadyProcessing` if the entry is marked `processing`, `Offline` if
    /// the remote is unreachable, and `Storage` if the queue fails.
    pub async fn sync_single_item(&self, id: &str) -> Result<EntryOutcome, SyncError> {
        let Some(_guard) = FlightGuard::acquire(&self.in_progress) else {
            return Err(SyncError::Busy);
        };

        let entry = self
            .store
            .get_by_id(id)?
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;

        if entry.status == SyncStatus::Processing {
            return Err(SyncError::AlreadyProcessing(id.to_string()));
        }

        if !self.remote.health_check().await {
            return Err(SyncError::Offline);
        }

        tracing::info!(id, "manually syncing entry");
        self.process_entry(&entry)
            .await?
            .ok_or_else(|| SyncError::NotFound(id.to_string()))
    }

    /// Delete every terminal (`failed`) entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear_terminal_items(&self) -> Result<usize, SyncError> {
        let cleared = self.store.delete_by_status(SyncStatus::Failed)?;
        tracing::info!(cleared, "cleared terminal entries");
        Ok(cleared)
    }

    /// Queue statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_queue_stats(&self) -> Result<QueueStats, SyncError> {
        self.store.stats()
    }
}

fn log_stats(label: &str, stats: &QueueStats) {
    tracing::info!(
        total = stats.total,
        pending = stats.pending,
        processing = stats.processing,
        failed = stats.failed,
        "{label}"
    );
}
