//! JSON output formatting for syncq.

use serde::Serialize;
use serde_json::json;

use crate::error::SyncError;
use crate::sync::{CycleOutcome, EntryOutcome, QueueStats, SyncQueueEntry};

/// Format queue statistics as JSON
///
/// # Errors
///
/// Returns `SyncError::Json` if serialization fails.
pub fn format_stats_json(stats: &QueueStats) -> Result<String, SyncError> {
    to_json(stats)
}

/// Format queue entries as JSON
///
/// # Errors
///
/// Returns `SyncError::Json` if serialization fails.
pub fn format_entries_json(entries: &[SyncQueueEntry]) -> Result<String, SyncError> {
    let output = json!({
        "count": entries.len(),
        "items": entries
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format the outcome of a sync cycle as JSON
///
/// # Errors
///
/// Returns `SyncError::Json` if serialization fails.
pub fn format_cycle_json(outcome: &CycleOutcome) -> Result<String, SyncError> {
    let result = outcome.result();
    let output = json!({
        "outcome": match outcome {
            CycleOutcome::Skipped => "skipped",
            CycleOutcome::Offline => "offline",
            CycleOutcome::Completed(_) => "completed",
        },
        "success": result.success,
        "failed": result.failed,
        "errors": result.errors
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format the outcome of a manual single-entry sync as JSON
///
/// # Errors
///
/// Returns `SyncError::Json` if serialization fails.
pub fn format_entry_outcome_json(id: &str, outcome: &EntryOutcome) -> Result<String, SyncError> {
    let mut value = serde_json::to_value(outcome)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("id".to_string(), json!(id));
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `SyncError::Json` if serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, SyncError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{EntryError, SyncResult};

    #[test]
    fn test_format_stats_json() {
        let stats = QueueStats {
            total: 3,
            pending: 2,
            processing: 0,
            failed: 1,
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_stats_json(&stats).unwrap()).unwrap();

        assert_eq!(value["total"], 3);
        assert_eq!(value["failed"], 1);
    }

    #[test]
    fn test_format_cycle_json_offline_has_zero_counts() {
        let value: serde_json::Value =
            serde_json::from_str(&format_cycle_json(&CycleOutcome::Offline).unwrap()).unwrap();

        assert_eq!(value["outcome"], "offline");
        assert_eq!(value["success"], 0);
        assert_eq!(value["failed"], 0);
        assert_eq!(value["errors"], json!([]));
    }

    #[test]
    fn test_format_cycle_json_lists_errors() {
        let outcome = CycleOutcome::Completed(SyncResult {
            success: 1,
            failed: 1,
            errors: vec![EntryError {
                id: "e2".to_string(),
                error: "Invalid entity ID: abc".to_string(),
            }],
        });
        let value: serde_json::Value =
            serde_json::from_str(&format_cycle_json(&outcome).unwrap()).unwrap();

        assert_eq!(value["outcome"], "completed");
        assert_eq!(value["errors"][0]["id"], "e2");
        assert_eq!(value["errors"][0]["error"], "Invalid entity ID: abc");
    }

    #[test]
    fn test_format_entry_outcome_json() {
        let outcome = EntryOutcome::Exhausted {
            error: "HTTP 500".to_string(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_entry_outcome_json("e1", &outcome).unwrap()).unwrap();

        assert_eq!(value["id"], "e1");
        assert_eq!(value["outcome"], "exhausted");
        assert_eq!(value["error"], "HTTP 500");
    }

    #[test]
    fn test_format_entries_json() {
        let value: serde_json::Value =
            serde_json::from_str(&format_entries_json(&[]).unwrap()).unwrap();
        assert_eq!(value["count"], 0);
    }
}
