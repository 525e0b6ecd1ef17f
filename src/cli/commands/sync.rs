//! Sync command implementations.

use std::time::Duration;

use colored::Colorize;

use crate::cli::args::OutputFormat;
use crate::error::SyncError;
use crate::output::{format_cycle, format_entry_outcome, to_json};
use crate::sync::{run_every, SyncCoordinator};

/// Execute run command
///
/// # Errors
///
/// Returns an error if the queue cannot be read or updated.
pub async fn run(coordinator: &SyncCoordinator, format: OutputFormat) -> Result<String, SyncError> {
    let outcome = coordinator.run_sync().await?;
    format_cycle(&outcome, format)
}

/// Execute retry command
///
/// # Errors
///
/// Returns an error if the entry does not exist, is being processed, the
/// remote is offline, or the queue fails.
pub async fn retry(
    coordinator: &SyncCoordinator,
    id: &str,
    format: OutputFormat,
) -> Result<String, SyncError> {
    let outcome = coordinator.sync_single_item(id).await?;
    format_entry_outcome(id, &outcome, format)
}

/// Execute clear command
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn clear(coordinator: &SyncCoordinator, format: OutputFormat) -> Result<String, SyncError> {
    let cleared = coordinator.clear_terminal_items()?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({ "cleared": cleared })),
        OutputFormat::Pretty => Ok(format!("Cleared {cleared} failed entries")),
    }
}

/// Execute watch command; returns once Ctrl-C is received
///
/// # Errors
///
/// Returns an error if the final stats cannot be read.
pub async fn watch(
    coordinator: &SyncCoordinator,
    interval: Duration,
    format: OutputFormat,
) -> Result<String, SyncError> {
    if format == OutputFormat::Pretty {
        eprintln!(
            "{}",
            format!("Syncing every {}s, press Ctrl-C to stop", interval.as_secs()).dimmed()
        );
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };
    run_every(coordinator, interval, shutdown).await;

    let stats = coordinator.get_queue_stats()?;
    match format {
        OutputFormat::Json => to_json(&stats),
        OutputFormat::Pretty => Ok(format!(
            "Stopped. {} pending, {} failed",
            stats.pending, stats.failed
        )),
    }
}
