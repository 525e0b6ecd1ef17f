//! Command implementations for syncq.
//!
//! Each command returns the text to print, already formatted for the
//! requested output format.

mod queue;
mod sync;

pub use queue::{enqueue, list, reset, show, status};
pub use sync::{clear, retry, run, watch};
