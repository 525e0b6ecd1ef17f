//! Remote API access.
//!
//! The coordinator talks to the remote service through [`RemoteClient`];
//! [`HttpRemoteClient`] is the reqwest implementation used by the binary.

mod http;
mod types;

use async_trait::async_trait;

pub use http::HttpRemoteClient;
pub use types::{Priority, TodoRequest, TodoResponse};

use crate::error::SyncError;

/// Calls the coordinator makes against the remote service.
///
/// Per-call timeouts are the implementation's responsibility. Failures are
/// reported as `SyncError::Network` or `SyncError::Remote`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Whether the service is reachable. Never fails.
    async fn health_check(&self) -> bool;

    async fn create(&self, request: &TodoRequest) -> Result<TodoResponse, SyncError>;

    async fn update(&self, remote_id: i64, request: &TodoRequest)
        -> Result<TodoResponse, SyncError>;

    async fn delete(&self, remote_id: i64) -> Result<(), SyncError>;
}
