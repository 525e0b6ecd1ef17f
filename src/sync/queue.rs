//! Sync queue storage and management.
//!
//! [`QueueStore`] is the contract the coordinator drives; [`SqliteQueue`]
//! is the durable implementation backed by the `sync_queue` table.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use super::entry::{ActionType, QueueStats, SyncQueueEntry, SyncStatus};
use super::payload::{EntityKind, TodoSnapshot};
use crate::error::SyncError;
use crate::storage::Database;

/// Durable, ordered record of pending mutations.
///
/// Every operation is atomic with respect to a single entry, and every
/// storage failure is returned to the caller.
pub trait QueueStore: Send + Sync {
    /// Persist a new entry with `retry_count = 0` and `status = pending`.
    fn enqueue(
        &self,
        action_type: ActionType,
        entity_type: &str,
        entity_id: &str,
        payload: &str,
    ) -> Result<SyncQueueEntry, SyncError>;

    /// Pending entries with `retry_count < max_retries`, oldest first, at most `limit`.
    fn fetch_pending(&self, limit: usize, max_retries: u32)
        -> Result<Vec<SyncQueueEntry>, SyncError>;

    fn mark_processing(&self, id: &str) -> Result<bool, SyncError>;

    /// Set `failed`, bump `retry_count`, record the error and attempt time.
    fn mark_failed_terminal(&self, id: &str, error_message: &str) -> Result<bool, SyncError>;

    /// Bump `retry_count`, record the error and attempt time, return to `pending`.
    fn retry_later(&self, id: &str, error_message: &str) -> Result<bool, SyncError>;

    fn delete_by_id(&self, id: &str) -> Result<bool, SyncError>;

    fn delete_by_status(&self, status: SyncStatus) -> Result<usize, SyncError>;

    fn get_by_id(&self, id: &str) -> Result<Option<SyncQueueEntry>, SyncError>;

    /// All entries, oldest first.
    fn get_all(&self) -> Result<Vec<SyncQueueEntry>, SyncError>;

    /// Entries with the given status, oldest first.
    fn get_by_status(&self, status: SyncStatus) -> Result<Vec<SyncQueueEntry>, SyncError>;

    fn stats(&self) -> Result<QueueStats, SyncError>;

    /// Return entries left in `processing` by an interrupted cycle to `pending`.
    fn release_processing(&self) -> Result<usize, SyncError>;

    /// Re-arm a terminal entry: `pending`, `retry_count = 0`, error cleared.
    fn reset_failed(&self, id: &str) -> Result<bool, SyncError>;

    /// Serialize `payload` and enqueue it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or persistence fails.
    fn enqueue_json<T: Serialize>(
        &self,
        action_type: ActionType,
        entity_type: &str,
        entity_id: &str,
        payload: &T,
    ) -> Result<SyncQueueEntry, SyncError>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(payload)?;
        self.enqueue(action_type, entity_type, entity_id, &json)
    }

    /// Queue a locally created todo.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    fn enqueue_create(&self, entity_id: &str, todo: &TodoSnapshot) -> Result<SyncQueueEntry, SyncError>
    where
        Self: Sized,
    {
        self.enqueue_json(ActionType::Create, EntityKind::Todo.as_str(), entity_id, todo)
    }

    /// Queue a locally updated todo.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    fn enqueue_update(&self, entity_id: &str, todo: &TodoSnapshot) -> Result<SyncQueueEntry, SyncError>
    where
        Self: Sized,
    {
        self.enqueue_json(ActionType::Update, EntityKind::Todo.as_str(), entity_id, todo)
    }

    /// Queue a locally deleted todo.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    fn enqueue_delete(&self, entity_id: &str) -> Result<SyncQueueEntry, SyncError>
    where
        Self: Sized,
    {
        self.enqueue_json(
            ActionType::Delete,
            EntityKind::Todo.as_str(),
            entity_id,
            &serde_json::json!({ "id": entity_id }),
        )
    }
}

const SELECT_COLUMNS: &str = r"SELECT id, action_type, entity_type, entity_id, payload, created_at,
                                      retry_count, status, error_message, last_attempt_at
                               FROM sync_queue";

struct Inner {
    db: Database,
    /// Highest `created_at` handed out; keeps the ordering key strictly increasing.
    last_created_at: i64,
}

/// SQLite-backed queue store.
pub struct SqliteQueue {
    inner: Mutex<Inner>,
}

impl SqliteQueue {
    /// Open the queue in the default database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self, SyncError> {
        Self::with_database(Database::open()?)
    }

    /// Open a queue over an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn in_memory() -> Result<Self, SyncError> {
        Self::with_database(Database::open_in_memory()?)
    }

    /// Create a sync queue with an existing database connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing queue cannot be read.
    pub fn with_database(db: Database) -> Result<Self, SyncError> {
        let last_created_at: i64 = db
            .connection()
            .query_row("SELECT COALESCE(MAX(created_at), 0) FROM sync_queue", [], |row| {
                row.get(0)
            })
            .map_err(|e| SyncError::Storage(format!("Failed to read queue head: {e}")))?;

        Ok(Self {
            inner: Mutex::new(Inner {
                db,
                last_created_at,
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, SyncError> {
        self.inner
            .lock()
            .map_err(|_| SyncError::Storage("sync queue lock poisoned".to_string()))
    }

    fn query_entries(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<SyncQueueEntry>, SyncError> {
        let inner = self.lock()?;
        let conn = inner.db.connection();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SyncError::Storage(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(params, row_to_entry)
            .map_err(|e| SyncError::Storage(format!("Failed to query sync queue: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| SyncError::Storage(e.to_string()))?);
        }

        Ok(entries)
    }

    /// Read-modify-write of `retry_count` inside a transaction.
    fn record_attempt(
        &self,
        id: &str,
        status: SyncStatus,
        error_message: &str,
    ) -> Result<bool, SyncError> {
        let mut inner = self.lock()?;
        let tx = inner
            .db
            .connection_mut()
            .transaction()
            .map_err(|e| SyncError::Storage(format!("Failed to begin transaction: {e}")))?;

        let current: Option<u32> = tx
            .query_row(
                "SELECT retry_count FROM sync_queue WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SyncError::Storage(format!("Failed to read retry count: {e}")))?;

        let Some(current) = current else {
            return Ok(false);
        };

        tx.execute(
            r"UPDATE sync_queue SET
              retry_count = ?1,
              status = ?2,
              error_message = ?3,
              last_attempt_at = ?4
              WHERE id = ?5",
            params![
                current.saturating_add(1),
                status.as_str(),
                error_message,
                now_millis(),
                id
            ],
        )
        .map_err(|e| SyncError::Storage(format!("Failed to record attempt: {e}")))?;

        tx.commit()
            .map_err(|e| SyncError::Storage(format!("Failed to commit attempt: {e}")))?;

        Ok(true)
    }
}

impl QueueStore for SqliteQueue {
    fn enqueue(
        &self,
        action_type: ActionType,
        entity_type: &str,
        entity_id: &str,
        payload: &str,
    ) -> Result<SyncQueueEntry, SyncError> {
        if let ActionType::Unknown(raw) = &action_type {
            return Err(SyncError::Validation(format!("unknown action type: {raw}")));
        }
        serde_json::from_str::<serde_json::Value>(payload)
            .map_err(|e| SyncError::Validation(format!("payload is not valid JSON: {e}")))?;

        let mut inner = self.lock()?;
        let created_at = now_millis().max(inner.last_created_at + 1);

        let entry = SyncQueueEntry {
            id: Uuid::new_v4().to_string(),
            action_type,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            payload: payload.to_string(),
            created_at,
            retry_count: 0,
            status: SyncStatus::Pending,
            error_message: None,
            last_attempt_at: None,
        };

        inner
            .db
            .connection()
            .execute(
                r"INSERT INTO sync_queue (id, action_type, entity_type, entity_id, payload,
                                          created_at, retry_count, status)
                  VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
                params![
                    entry.id,
                    entry.action_type.as_str(),
                    entry.entity_type,
                    entry.entity_id,
                    entry.payload,
                    entry.created_at,
                    entry.status.as_str(),
                ],
            )
            .map_err(|e| SyncError::Storage(format!("Failed to enqueue entry: {e}")))?;

        inner.last_created_at = created_at;
        tracing::debug!(
            id = %entry.id,
            action = %entry.action_type,
            entity_type = %entry.entity_type,
            entity_id = %entry.entity_id,
            "enqueued sync entry"
        );

        Ok(entry)
    }

    fn fetch_pending(
        &self,
        limit: usize,
        max_retries: u32,
    ) -> Result<Vec<SyncQueueEntry>, SyncError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE status = 'pending' AND retry_count < ?1
             ORDER BY created_at ASC
             LIMIT ?2"
        );
        self.query_entries(&sql, &[&max_retries, &limit])
    }

    fn mark_processing(&self, id: &str) -> Result<bool, SyncError> {
        let inner = self.lock()?;
        let rows = inner
            .db
            .connection()
            .execute(
                "UPDATE sync_queue SET status = 'processing' WHERE id = ?1",
                [id],
            )
            .map_err(|e| SyncError::Storage(format!("Failed to mark entry processing: {e}")))?;

        Ok(rows > 0)
    }

    fn mark_failed_terminal(&self, id: &str, error_message: &str) -> Result<bool, SyncError> {
        self.record_attempt(id, SyncStatus::Failed, error_message)
    }

    fn retry_later(&self, id: &str, error_message: &str) -> Result<bool, SyncError> {
        self.record_attempt(id, SyncStatus::Pending, error_message)
    }

    fn delete_by_id(&self, id: &str) -> Result<bool, SyncError> {
        let inner = self.lock()?;
        let rows = inner
            .db
            .connection()
            .execute("DELETE FROM sync_queue WHERE id = ?1", [id])
            .map_err(|e| SyncError::Storage(format!("Failed to delete entry: {e}")))?;

        Ok(rows > 0)
    }

    fn delete_by_status(&self, status: SyncStatus) -> Result<usize, SyncError> {
        let inner = self.lock()?;
        inner
            .db
            .connection()
            .execute(
                "DELETE FROM sync_queue WHERE status = ?1",
                [status.as_str()],
            )
            .map_err(|e| SyncError::Storage(format!("Failed to delete {status} entries: {e}")))
    }

    fn get_by_id(&self, id: &str) -> Result<Option<SyncQueueEntry>, SyncError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        Ok(self.query_entries(&sql, &[&id])?.into_iter().next())
    }

    fn get_all(&self) -> Result<Vec<SyncQueueEntry>, SyncError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at ASC");
        self.query_entries(&sql, &[])
    }

    fn get_by_status(&self, status: SyncStatus) -> Result<Vec<SyncQueueEntry>, SyncError> {
        let sql = format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY created_at ASC");
        self.query_entries(&sql, &[&status.as_str()])
    }

    fn stats(&self) -> Result<QueueStats, SyncError> {
        let inner = self.lock()?;

        let (total, pending, processing, failed): (i64, i64, i64, i64) = inner
            .db
            .connection()
            .query_row(
                r"SELECT COUNT(*),
                         COALESCE(SUM(status = 'pending'), 0),
                         COALESCE(SUM(status = 'processing'), 0),
                         COALESCE(SUM(status = 'failed'), 0)
                  FROM sync_queue",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .map_err(|e| SyncError::Storage(format!("Failed to count queue entries: {e}")))?;

        Ok(QueueStats {
            total: total.unsigned_abs(),
            pending: pending.unsigned_abs(),
            processing: processing.unsigned_abs(),
            failed: failed.unsigned_abs(),
        })
    }

    fn release_processing(&self) -> Result<usize, SyncError> {
        let inner = self.lock()?;
        inner
            .db
            .connection()
            .execute(
                "UPDATE sync_queue SET status = 'pending' WHERE status = 'processing'",
                [],
            )
            .map_err(|e| SyncError::Storage(format!("Failed to release processing entries: {e}")))
    }

    fn reset_failed(&self, id: &str) -> Result<bool, SyncError> {
        let inner = self.lock()?;
        let rows = inner
            .db
            .connection()
            .execute(
                r"UPDATE sync_queue SET
                  status = 'pending',
                  retry_count = 0,
                  error_message = NULL
                  WHERE id = ?1 AND status = 'failed'",
                [id],
            )
            .map_err(|e| SyncError::Storage(format!("Failed to reset entry: {e}")))?;

        Ok(rows > 0)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn row_to_entry(row: &Row<'_>) -> Result<SyncQueueEntry, rusqlite::Error> {
    let action_type: String = row.get(1)?;
    let status: String = row.get(7)?;
    let status = status.parse::<SyncStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(SyncQueueEntry {
        id: row.get(0)?,
        action_type: ActionType::from_stored(&action_type),
        entity_type: row.get(2)?,
        entity_id: row.get(3)?,
        payload: row.get(4)?,
        created_at: row.get(5)?,
        retry_count: row.get(6)?,
        status,
        error_message: row.get(8)?,
        last_attempt_at: row.get(9)?,
    })
}
