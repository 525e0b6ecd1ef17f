//! Offline sync queue and reconciliation.
//!
//! Local mutations are recorded in the queue while offline and replayed
//! against the remote service by the coordinator once it is reachable.

pub mod coordinator;
pub mod entry;
pub mod payload;
pub mod queue;
pub mod scheduler;

pub use coordinator::{
    CycleOutcome, EntryError, EntryOutcome, SyncCoordinator, SyncOptions, SyncResult,
};
pub use entry::{ActionType, QueueStats, SyncQueueEntry, SyncStatus};
pub use payload::{EntityKind, Mutation, TodoSnapshot};
pub use queue::{QueueStore, SqliteQueue};
pub use scheduler::run_every;
