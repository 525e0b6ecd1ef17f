//! Storage layer for syncq.
//!
//! This module provides SQLite-based persistence for the sync queue.

mod database;
mod migrations;

pub use database::Database;
