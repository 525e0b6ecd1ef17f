//! Error types for syncq.

use thiserror::Error;

/// All errors produced by the queue, the coordinator and the remote client.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Local persistence failed. Fatal to a sync cycle.
    #[error("storage error: {0}")]
    Storage(String),

    /// An entry cannot be mapped to a remote request.
    #[error("validation error: {0}")]
    Validation(String),

    /// Remote unreachable or the request timed out.
    #[error("{message}")]
    Network {
        message: String,
        code: Option<String>,
    },

    /// Non-success response from the remote service.
    #[error("{message}")]
    Remote {
        message: String,
        status: u16,
        code: Option<String>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("sync queue entry not found: {0}")]
    NotFound(String),

    #[error("entry is already being processed: {0}")]
    AlreadyProcessing(String),

    #[error("a sync cycle is already running")]
    Busy,

    #[error("remote API is not reachable")]
    Offline,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Build a network error with one of the transport codes (`TIMEOUT`, `NETWORK_ERROR`).
    #[must_use]
    pub fn network(message: impl Into<String>, code: &str) -> Self {
        Self::Network {
            message: message.into(),
            code: Some(code.to_string()),
        }
    }

    /// Whether this error leaves the queue in an unknown state.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<rusqlite::Error> for SyncError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_displays_message() {
        let err = SyncError::Remote {
            message: "Todo not found".to_string(),
            status: 404,
            code: None,
        };
        assert_eq!(err.to_string(), "Todo not found");
        assert!(!err.is_storage());
    }

    #[test]
    fn test_network_error_carries_code() {
        let err = SyncError::network("Request timeout", "TIMEOUT");
        assert_eq!(err.to_string(), "Request timeout");
        assert!(matches!(err, SyncError::Network { code: Some(ref c), .. } if c == "TIMEOUT"));
    }

    #[test]
    fn test_rusqlite_error_is_storage() {
        let err: SyncError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.is_storage());
    }
}
