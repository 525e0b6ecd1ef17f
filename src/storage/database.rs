//! The `syncq.db` file holding the `sync_queue` table.

use std::path::Path;

use rusqlite::Connection;

use crate::config::Paths;
use crate::error::SyncError;

use super::migrations;

const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
                            PRAGMA synchronous = NORMAL;
                            PRAGMA temp_store = MEMORY;";

/// A migrated `SQLite` connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open `syncq.db` under the resolved data directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the data directory cannot be resolved or
    /// created, and `SyncError::Storage` if the file cannot be opened or migrated.
    pub fn open() -> Result<Self, SyncError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open a queue file in WAL mode and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Storage` if the file cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, SyncError> {
        let conn = Connection::open(path).map_err(|e| {
            SyncError::Storage(format!("Failed to open queue file {}: {e}", path.display()))
        })?;
        conn.execute_batch(FILE_PRAGMAS)
            .map_err(|e| SyncError::Storage(format!("Failed to apply pragmas: {e}")))?;

        migrations::run(&conn)?;
        tracing::debug!(path = %path.display(), "queue database ready");

        Ok(Self { conn })
    }

    /// Private in-memory queue; gone when dropped.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Storage` if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, SyncError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SyncError::Storage(format!("Failed to open in-memory queue: {e}")))?;
        migrations::run(&conn)?;

        Ok(Self { conn })
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// For `retry_later` / `mark_failed_terminal` transactions.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
