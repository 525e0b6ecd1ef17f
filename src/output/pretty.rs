use chrono::{DateTime, Local};
use colored::Colorize;

use crate::sync::{CycleOutcome, EntryOutcome, QueueStats, SyncQueueEntry, SyncStatus};

fn format_millis(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms).map_or_else(
        || ms.to_string(),
        |dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

fn status_label(status: SyncStatus) -> colored::ColoredString {
    match status {
        SyncStatus::Pending => "pending".yellow(),
        SyncStatus::Processing => "processing".cyan(),
        SyncStatus::Failed => "failed".red(),
    }
}

/// Format queue statistics
pub fn format_stats_pretty(stats: &QueueStats) -> String {
    let mut output = format!("{}\n", "Sync Queue".bold());
    output.push_str(&"─".repeat(40));
    output.push('\n');
    output.push_str(&format!("  {:<12} {}\n", "Total:", stats.total));
    output.push_str(&format!(
        "  {:<12} {}\n",
        "Pending:",
        stats.pending.to_string().yellow()
    ));
    output.push_str(&format!(
        "  {:<12} {}\n",
        "Processing:",
        stats.processing.to_string().cyan()
    ));
    output.push_str(&format!(
        "  {:<12} {}\n",
        "Failed:",
        stats.failed.to_string().red()
    ));
    output
}

/// Format a list of queue entries, one per line
pub fn format_entries_pretty(entries: &[SyncQueueEntry], title: &str) -> String {
    if entries.is_empty() {
        return format!("{title} (0 entries)\n  Queue is empty");
    }

    let mut output = format!("{} ({} entries)\n", title, entries.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for entry in entries {
        let mut line = format!(
            "{} {:<7} {} #{}  {}",
            entry.id.dimmed(),
            entry.action_type.as_str().bold(),
            entry.entity_type,
            entry.entity_id,
            status_label(entry.status)
        );

        if entry.retry_count > 0 {
            line.push_str(&format!("  retries: {}", entry.retry_count));
        }

        if let Some(error) = &entry.error_message {
            line.push_str(&format!("  {}", error.red()));
        }

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format a single queue entry with all fields
pub fn format_entry_pretty(entry: &SyncQueueEntry) -> String {
    let mut output = format!(
        "{} {} #{}\n",
        entry.action_type.as_str().bold(),
        entry.entity_type,
        entry.entity_id
    );
    output.push_str(&format!("  {}: {}\n", "ID".dimmed(), entry.id));
    output.push_str(&format!("  {}: {}\n", "Status".dimmed(), status_label(entry.status)));
    output.push_str(&format!("  {}: {}\n", "Retries".dimmed(), entry.retry_count));
    output.push_str(&format!(
        "  {}: {}\n",
        "Queued".dimmed(),
        format_millis(entry.created_at)
    ));

    if let Some(last) = entry.last_attempt_at {
        output.push_str(&format!("  {}: {}\n", "Last attempt".dimmed(), format_millis(last)));
    }

    if let Some(error) = &entry.error_message {
        output.push_str(&format!("  {}: {}\n", "Error".dimmed(), error.red()));
    }

    output.push_str(&format!("  {}: {}\n", "Payload".dimmed(), entry.payload));
    output
}

/// Format the outcome of a sync cycle
pub fn format_cycle_pretty(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::Skipped => format!("{} A sync is already in progress", "○".yellow()),
        CycleOutcome::Offline => format!("{} Remote is offline, nothing synced", "○".yellow()),
        CycleOutcome::Completed(result) if result.total() == 0 => {
            format!("{} Nothing to sync", "✓".green())
        },
        CycleOutcome::Completed(result) => {
            let mut output = format!(
                "{} Synced {}, failed {}\n",
                if result.failed == 0 {
                    "✓".green()
                } else {
                    "✗".red()
                },
                result.success.to_string().green(),
                result.failed.to_string().red()
            );
            for failure in &result.errors {
                output.push_str(&format!("  {} {}\n", failure.id.dimmed(), failure.error));
            }
            output
        },
    }
}

/// Format the outcome of a manual single-entry sync
pub fn format_entry_outcome_pretty(id: &str, outcome: &EntryOutcome) -> String {
    match outcome {
        EntryOutcome::Synced => format!("{} Synced {}", "✓".green(), id),
        EntryOutcome::Retrying { error } => {
            format!("{} {} failed, will retry: {}", "✗".red(), id, error)
        },
        EntryOutcome::Exhausted { error } => {
            format!("{} {} failed permanently: {}", "✗".red(), id, error)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{ActionType, EntryError, SyncResult};

    fn make_entry(status: SyncStatus) -> SyncQueueEntry {
        SyncQueueEntry {
            id: "entry-1".to_string(),
            action_type: ActionType::Create,
            entity_type: "todo".to_string(),
            entity_id: "42".to_string(),
            payload: r#"{"title":"Buy milk"}"#.to_string(),
            created_at: 1_700_000_000_000,
            retry_count: 0,
            status,
            error_message: None,
            last_attempt_at: None,
        }
    }

    #[test]
    fn test_format_stats_pretty() {
        let stats = QueueStats {
            total: 5,
            pending: 3,
            processing: 0,
            failed: 2,
        };
        let result = format_stats_pretty(&stats);

        assert!(result.contains("Sync Queue"));
        assert!(result.contains("Total:"));
        assert!(result.contains('5'));
    }

    #[test]
    fn test_format_entries_empty() {
        let result = format_entries_pretty(&[], "Queue");
        assert!(result.contains("Queue (0 entries)"));
        assert!(result.contains("Queue is empty"));
    }

    #[test]
    fn test_format_entries_shows_errors() {
        let mut entry = make_entry(SyncStatus::Failed);
        entry.retry_count = 3;
        entry.error_message = Some("Max retries exceeded: HTTP 500".to_string());

        let result = format_entries_pretty(&[entry], "Queue");

        assert!(result.contains("Queue (1 entries)"));
        assert!(result.contains("#42"));
        assert!(result.contains("retries: 3"));
        assert!(result.contains("Max retries exceeded: HTTP 500"));
    }

    #[test]
    fn test_format_entry_pretty_includes_payload() {
        let result = format_entry_pretty(&make_entry(SyncStatus::Pending));

        assert!(result.contains("entry-1"));
        assert!(result.contains("Buy milk"));
        assert!(!result.contains("Last attempt"));
    }

    #[test]
    fn test_format_cycle_pretty() {
        assert!(format_cycle_pretty(&CycleOutcome::Offline).contains("offline"));
        assert!(format_cycle_pretty(&CycleOutcome::Completed(SyncResult::default()))
            .contains("Nothing to sync"));

        let result = format_cycle_pretty(&CycleOutcome::Completed(SyncResult {
            success: 2,
            failed: 1,
            errors: vec![EntryError {
                id: "entry-9".to_string(),
                error: "HTTP 500".to_string(),
            }],
        }));
        assert!(result.contains("Synced"));
        assert!(result.contains("HTTP 500"));
    }

    #[test]
    fn test_format_millis_falls_back_to_raw_value() {
        assert_eq!(format_millis(i64::MAX), i64::MAX.to_string());
    }
}
