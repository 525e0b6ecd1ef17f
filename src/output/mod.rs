//! Output formatting for syncq.
//!
//! Every command result can be rendered for a terminal or as JSON.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::SyncError;
use crate::sync::{CycleOutcome, EntryOutcome, QueueStats, SyncQueueEntry};

pub use json::*;
pub use pretty::*;

/// Format queue statistics based on output format
///
/// # Errors
///
/// Returns `SyncError::Json` if JSON serialization fails.
pub fn format_stats(stats: &QueueStats, format: OutputFormat) -> Result<String, SyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_stats_pretty(stats)),
        OutputFormat::Json => format_stats_json(stats),
    }
}

/// Format queue entries based on output format
///
/// # Errors
///
/// Returns `SyncError::Json` if JSON serialization fails.
pub fn format_entries(
    entries: &[SyncQueueEntry],
    title: &str,
    format: OutputFormat,
) -> Result<String, SyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_entries_pretty(entries, title)),
        OutputFormat::Json => format_entries_json(entries),
    }
}

/// Format a single entry based on output format
///
/// # Errors
///
/// Returns `SyncError::Json` if JSON serialization fails.
pub fn format_entry(entry: &SyncQueueEntry, format: OutputFormat) -> Result<String, SyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_entry_pretty(entry)),
        OutputFormat::Json => to_json(entry),
    }
}

/// Format a cycle outcome based on output format
///
/// # Errors
///
/// Returns `SyncError::Json` if JSON serialization fails.
pub fn format_cycle(outcome: &CycleOutcome, format: OutputFormat) -> Result<String, SyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_cycle_pretty(outcome)),
        OutputFormat::Json => format_cycle_json(outcome),
    }
}

/// Format a single-entry sync outcome based on output format
///
/// # Errors
///
/// Returns `SyncError::Json` if JSON serialization fails.
pub fn format_entry_outcome(
    id: &str,
    outcome: &EntryOutcome,
    format: OutputFormat,
) -> Result<String, SyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_entry_outcome_pretty(id, outcome)),
        OutputFormat::Json => format_entry_outcome_json(id, outcome),
    }
}
