use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::sync::{ActionType, SyncStatus};

#[derive(Parser)]
#[command(name = "syncq")]
#[command(about = "Offline-first sync queue: record local mutations and replay them to a remote API")]
#[command(long_about = "syncq - offline-first sync queue

Local changes are recorded in a durable queue while the remote API is
unreachable, then replayed in order once it comes back. Entries that keep
failing are retried a bounded number of times before being marked failed.

QUICK START:
  syncq enqueue create --entity-id 42 --title \"Buy milk\"
  syncq status                 Show queue counts
  syncq run                    Run one sync cycle
  syncq watch                  Sync periodically until Ctrl-C

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

CONFIGURATION:
  ~/.syncq/config.yaml (or $SYNCQ_HOME/config.yaml). API_BASE_URL,
  API_TIMEOUT, LOG_LEVEL, SYNC_INTERVAL_SECS, ENABLE_AUTO_SYNC,
  SYNC_MAX_RETRIES and SYNC_BATCH_SIZE override the file.")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a local mutation for later sync
    ///
    /// # Examples
    ///
    ///   syncq enqueue create --entity-id 42 --title "Buy milk"
    ///   syncq enqueue update --entity-id 42 --payload '{"title":"x","completed":1}'
    ///   syncq enqueue delete --entity-id 42
    #[command(alias = "add")]
    Enqueue(EnqueueArgs),

    /// Run one sync cycle
    ///
    /// Checks that the remote API is reachable, then replays up to
    /// `batch_size` pending entries, oldest first.
    Run,

    /// Show queue statistics
    Status,

    /// List queued entries
    ///
    /// # Examples
    ///
    ///   syncq list
    ///   syncq list --status failed
    ///   syncq list -n 10
    #[command(alias = "ls")]
    List {
        /// Only show entries with this status
        #[arg(long, short, value_enum)]
        status: Option<StatusArg>,

        /// Maximum number of entries to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show a single entry
    Show {
        /// Entry ID
        id: String,
    },

    /// Sync one entry now, regardless of its retry count
    Retry {
        /// Entry ID
        id: String,
    },

    /// Return a failed entry to the queue with its retry count cleared
    Reset {
        /// Entry ID
        id: String,
    },

    /// Delete every failed entry
    Clear,

    /// Sync every `interval_secs` until interrupted
    Watch {
        /// Override the configured interval in seconds
        #[arg(long, short)]
        interval: Option<u64>,
    },
}

/// Arguments for `enqueue`.
#[derive(Args)]
pub struct EnqueueArgs {
    /// Kind of mutation
    #[arg(value_enum)]
    pub action: ActionArg,

    /// Local identifier of the entity
    #[arg(long)]
    pub entity_id: String,

    /// Kind of entity
    #[arg(long, default_value = "todo")]
    pub entity_type: String,

    /// Entity snapshot as JSON
    #[arg(long, conflicts_with = "title")]
    pub payload: Option<String>,

    /// Shorthand for a todo snapshot holding only a title
    #[arg(long)]
    pub title: Option<String>,
}

/// Mutation kinds accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionArg {
    Create,
    Update,
    Delete,
}

impl From<ActionArg> for ActionType {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Create => Self::Create,
            ActionArg::Update => Self::Update,
            ActionArg::Delete => Self::Delete,
        }
    }
}

/// Entry statuses accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    Pending,
    Processing,
    Failed,
}

impl From<StatusArg> for SyncStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => Self::Pending,
            StatusArg::Processing => Self::Processing,
            StatusArg::Failed => Self::Failed,
        }
    }
}
