//! Database migrations for syncq.
//!
//! Each migration upgrades the schema by one version. Migrations are run
//! automatically when the database is opened.

use rusqlite::Connection;

use crate::error::SyncError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, SyncError> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| SyncError::Storage(format!("Failed to get schema version: {e}")))?;

    Ok(version)
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), SyncError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| SyncError::Storage(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), SyncError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(());
    }

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(conn, version)?;
        set_version(conn, version)?;
        tracing::debug!(version, "applied schema migration");
    }

    Ok(())
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), SyncError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(SyncError::Storage(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: the sync queue.
///
/// `created_at` and `last_attempt_at` are epoch milliseconds.
fn migrate_v1(conn: &Connection) -> Result<(), SyncError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS sync_queue (
            id TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            payload TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            retry_count INTEGER NOT NULL DEFAULT 0 CHECK (retry_count >= 0),
            status TEXT NOT NULL DEFAULT 'pending',
            error_message TEXT,
            last_attempt_at INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_sync_queue_status
        ON sync_queue(status);

        CREATE INDEX IF NOT EXISTS idx_sync_queue_created_at
        ON sync_queue(created_at);
        ",
    )
    .map_err(|e| SyncError::Storage(format!("Migration v1 failed: {e}")))
}
