//! syncq - offline-first sync queue
//!
//! Local mutations are recorded in a durable SQLite queue and replayed
//! against a remote REST API once it is reachable, in creation order, with
//! bounded retries and at most one sync cycle in flight.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod remote;
pub mod storage;
pub mod sync;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::SyncError;
pub use sync::{QueueStore, SqliteQueue, SyncCoordinator};
