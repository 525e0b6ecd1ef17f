//! Queue inspection and enqueue commands.

use crate::cli::args::{EnqueueArgs, OutputFormat, StatusArg};
use crate::error::SyncError;
use crate::output::{format_entries, format_entry, format_stats, to_json};
use crate::sync::{ActionType, QueueStats, QueueStore, SyncStatus, TodoSnapshot};

/// Execute enqueue command
///
/// # Errors
///
/// Returns `SyncError::Validation` if neither a payload nor a title is given
/// for a create or update, or if the payload is not JSON.
pub fn enqueue(
    store: &dyn QueueStore,
    args: EnqueueArgs,
    format: OutputFormat,
) -> Result<String, SyncError> {
    let action = ActionType::from(args.action);

    let payload = match (args.payload, args.title) {
        (Some(payload), _) => payload,
        (None, Some(title)) => serde_json::to_string(&TodoSnapshot::titled(title))?,
        (None, None) if action == ActionType::Delete => {
            serde_json::json!({ "id": args.entity_id }).to_string()
        },
        (None, None) => {
            return Err(SyncError::Validation(format!(
                "{action} needs --payload or --title"
            )))
        },
    };

    let entry = store.enqueue(action, &args.entity_type, &args.entity_id, &payload)?;

    match format {
        OutputFormat::Json => to_json(&entry),
        OutputFormat::Pretty => Ok(format!(
            "Queued {} {} #{} (ID: {})",
            entry.action_type, entry.entity_type, entry.entity_id, entry.id
        )),
    }
}

/// Execute status command
///
/// # Errors
///
/// Returns an error if the queue cannot be read.
pub fn status(stats: &QueueStats, format: OutputFormat) -> Result<String, SyncError> {
    format_stats(stats, format)
}

/// Execute list command
///
/// # Errors
///
/// Returns an error if the queue cannot be read.
pub fn list(
    store: &dyn QueueStore,
    status: Option<StatusArg>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<String, SyncError> {
    let (mut entries, title) = match status.map(SyncStatus::from) {
        Some(status) => (store.get_by_status(status)?, format!("Queue: {status}")),
        None => (store.get_all()?, "Queue".to_string()),
    };

    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    format_entries(&entries, &title, format)
}

/// Execute show command
///
/// # Errors
///
/// Returns `SyncError::NotFound` if no entry has this ID.
pub fn show(store: &dyn QueueStore, id: &str, format: OutputFormat) -> Result<String, SyncError> {
    let entry = store
        .get_by_id(id)?
        .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
    format_entry(&entry, format)
}

/// Execute reset command
///
/// # Errors
///
/// Returns `SyncError::NotFound` if no failed entry has this ID.
pub fn reset(store: &dyn QueueStore, id: &str, format: OutputFormat) -> Result<String, SyncError> {
    if !store.reset_failed(id)? {
        return Err(SyncError::NotFound(format!("{id} (no failed entry with this ID)")));
    }

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({ "id": id, "reset": true })),
        OutputFormat::Pretty => Ok(format!("Reset entry: {id}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::ActionArg;
    use crate::sync::SqliteQueue;

    fn args(action: ActionArg, payload: Option<&str>, title: Option<&str>) -> EnqueueArgs {
        EnqueueArgs {
            action,
            entity_id: "42".to_string(),
            entity_type: "todo".to_string(),
            payload: payload.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn test_enqueue_with_title_builds_snapshot() {
        let store = SqliteQueue::in_memory().unwrap();

        let output = enqueue(&store, args(ActionArg::Create, None, Some("Buy milk")), OutputFormat::Pretty)
            .unwrap();
        assert!(output.starts_with("Queued CREATE todo #42"));

        let entries = store.get_all().unwrap();
        let snapshot: TodoSnapshot = serde_json::from_str(&entries[0].payload).unwrap();
        assert_eq!(snapshot.title, "Buy milk");
    }

    #[test]
    fn test_enqueue_delete_needs_no_payload() {
        let store = SqliteQueue::in_memory().unwrap();
        enqueue(&store, args(ActionArg::Delete, None, None), OutputFormat::Json).unwrap();
        assert_eq!(store.stats().unwrap().pending, 1);
    }

    #[test]
    fn test_enqueue_update_without_payload_fails() {
        let store = SqliteQueue::in_memory().unwrap();
        let err = enqueue(&store, args(ActionArg::Update, None, None), OutputFormat::Pretty)
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(store.stats().unwrap().total, 0);
    }

    #[test]
    fn test_list_filters_and_limits() {
        let store = SqliteQueue::in_memory().unwrap();
        for _ in 0..3 {
            enqueue(&store, args(ActionArg::Delete, None, None), OutputFormat::Pretty).unwrap();
        }
        let first = store.get_all().unwrap().remove(0);
        store.mark_failed_terminal(&first.id, "boom").unwrap();

        let output = list(&store, Some(StatusArg::Pending), Some(1), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["items"][0]["status"], "pending");
    }

    #[test]
    fn test_show_and_reset_unknown_id() {
        let store = SqliteQueue::in_memory().unwrap();
        assert!(matches!(
            show(&store, "missing", OutputFormat::Pretty),
            Err(SyncError::NotFound(_))
        ));
        assert!(matches!(
            reset(&store, "missing", OutputFormat::Pretty),
            Err(SyncError::NotFound(_))
        ));
    }
}
