//! Typed payloads.
//!
//! The queue persists each entity snapshot as a JSON string. Before dispatch
//! the snapshot is decoded into a [`Mutation`], a tagged union keyed by
//! entity type and action, so every remote call is built from typed fields.

use serde::{Deserialize, Deserializer, Serialize};

use super::entry::{ActionType, SyncQueueEntry};
use crate::error::SyncError;
use crate::remote::{Priority, TodoRequest};

/// Entity kinds the remote service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Todo,
}

impl EntityKind {
    /// Stored `entity_type` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
        }
    }

    /// Parse a stored `entity_type` value.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for entity types with no remote endpoint.
    pub fn parse(entity_type: &str) -> Result<Self, SyncError> {
        match entity_type {
            "todo" => Ok(Self::Todo),
            other => Err(SyncError::Validation(format!(
                "unsupported entity type: {other}"
            ))),
        }
    }
}

/// Snapshot of a local todo row, as the producer serializes it.
///
/// `completed` is stored as `0`/`1` locally but booleans are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl TodoSnapshot {
    /// Snapshot holding only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            completed: None,
            priority: None,
            due_date: None,
            user_id: None,
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => None,
        Some(Flag::Bool(b)) => Some(b),
        Some(Flag::Int(i)) => Some(i != 0),
    })
}

/// A queue entry decoded into the remote call it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateTodo(TodoRequest),
    UpdateTodo { remote_id: i64, request: TodoRequest },
    DeleteTodo { remote_id: i64 },
}

impl Mutation {
    /// Decode an entry.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for unknown actions, unsupported entity
    /// types, non-numeric entity ids and payloads that do not match the
    /// snapshot shape.
    pub fn from_entry(entry: &SyncQueueEntry) -> Result<Self, SyncError> {
        let kind = EntityKind::parse(&entry.entity_type)?;

        match (kind, &entry.action_type) {
            (_, ActionType::Unknown(raw)) => Err(SyncError::Validation(format!(
                "Unknown action type: {raw}"
            ))),
            (EntityKind::Todo, ActionType::Create) => {
                let snapshot = decode_todo(&entry.payload)?;
                let entity_id = match snapshot.id {
                    Some(id) => id,
                    None => parse_remote_id(&entry.entity_id)?,
                };
                Ok(Self::CreateTodo(todo_request(entity_id, snapshot, entry.created_at)))
            },
            (EntityKind::Todo, ActionType::Update) => {
                let remote_id = parse_remote_id(&entry.entity_id)?;
                let snapshot = decode_todo(&entry.payload)?;
                Ok(Self::UpdateTodo {
                    remote_id,
                    request: todo_request(remote_id, snapshot, entry.created_at),
                })
            },
            (EntityKind::Todo, ActionType::Delete) => Ok(Self::DeleteTodo {
                remote_id: parse_remote_id(&entry.entity_id)?,
            }),
        }
    }
}

/// Parse a local entity id into the remote identifier type.
///
/// # Errors
///
/// Returns `SyncError::Validation` if the id is not an integer.
pub fn parse_remote_id(entity_id: &str) -> Result<i64, SyncError> {
    entity_id
        .trim()
        .parse::<i64>()
        .map_err(|_| SyncError::Validation(format!("Invalid entity ID: {entity_id}")))
}

fn decode_todo(payload: &str) -> Result<TodoSnapshot, SyncError> {
    serde_json::from_str(payload)
        .map_err(|e| SyncError::Validation(format!("Invalid todo payload: {e}")))
}

fn todo_request(entity_id: i64, snapshot: TodoSnapshot, created_at: i64) -> TodoRequest {
    TodoRequest {
        entity_id,
        title: snapshot.title,
        description: snapshot.description,
        completed: snapshot.completed,
        priority: snapshot.priority,
        due_date: snapshot.due_date,
        user_id: snapshot.user_id,
        created_at: Some(created_at.to_string()),
    }
}
