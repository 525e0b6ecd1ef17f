//! Queue entry types.
//!
//! Defines the unit of work held in the sync queue and its status values.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::SyncError;

/// Kind of local mutation an entry replays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Entity was created locally
    Create,
    /// Entity was modified locally
    Update,
    /// Entity was removed locally
    Delete,
    /// Value read back from storage that this build does not understand
    Unknown(String),
}

impl ActionType {
    /// Stored column value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Unknown(raw) => raw,
        }
    }

    /// Parse a stored column value. Never fails; unrecognized values are kept
    /// so the coordinator can record them as failures.
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        match s {
            "CREATE" => Self::Create,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl FromStr for ActionType {
    type Err = SyncError;

    /// Parse user input (case-insensitive). Rejects unknown values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_stored(&s.to_ascii_uppercase()) {
            Self::Unknown(raw) => Err(SyncError::Validation(format!(
                "unknown action type: {raw} (expected CREATE, UPDATE or DELETE)"
            ))),
            known => Ok(known),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Status of a queued entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Waiting for a cycle
    Pending,
    /// Selected by the running cycle
    Processing,
    /// Retry budget exhausted
    Failed,
}

impl SyncStatus {
    /// Stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "failed" => Ok(Self::Failed),
            other => Err(SyncError::Validation(format!("unknown sync status: {other}"))),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One durable record of a local mutation awaiting remote replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncQueueEntry {
    /// Unique identifier, assigned at enqueue time
    pub id: String,
    pub action_type: ActionType,
    /// Kind of local entity, e.g. `todo`
    pub entity_type: String,
    /// Local identifier of the entity
    pub entity_id: String,
    /// JSON snapshot of the entity at enqueue time
    pub payload: String,
    /// Epoch milliseconds; the ordering key
    pub created_at: i64,
    pub retry_count: u32,
    pub status: SyncStatus,
    pub error_message: Option<String>,
    /// Epoch milliseconds of the most recent attempt
    pub last_attempt_at: Option<i64>,
}

/// Queue statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total: u64,
    pub pending: u64,
    pub processing: u64,
    pub failed: u64,
}
