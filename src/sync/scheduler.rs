//! Periodic sync.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::coordinator::{CycleOutcome, SyncCoordinator};

/// Run a sync cycle every `interval` until `shutdown` resolves.
///
/// The first cycle starts immediately. Cycles run on the caller's task, so
/// ticks missed during a long cycle are dropped rather than queued. A cycle
/// in progress when `shutdown` resolves runs to completion before this
/// returns.
pub async fn run_every<F>(coordinator: &SyncCoordinator, interval: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    tracing::info!(interval = ?interval, "auto-sync started");

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => run_cycle(coordinator).await,
        }
    }

    tracing::info!("auto-sync stopped");
}

async fn run_cycle(coordinator: &SyncCoordinator) {
    match coordinator.run_sync().await {
        Ok(CycleOutcome::Completed(result)) if result.failed > 0 => {
            tracing::warn!(failed = result.failed, "auto-sync finished with failures");
        },
        Ok(_) => {},
        Err(e) => tracing::error!(error = %e, "auto-sync cycle failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::error::SyncError;
    use crate::remote::{MockRemoteClient, RemoteClient, TodoRequest, TodoResponse};
    use crate::sync::coordinator::SyncOptions;
    use crate::sync::queue::{QueueStore, SqliteQueue};

    /// Online remote whose deletes take `delay` each.
    struct SlowDeletes {
        delay: Duration,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl RemoteClient for SlowDeletes {
        async fn health_check(&self) -> bool {
            true
        }

        async fn create(&self, _request: &TodoRequest) -> Result<TodoResponse, SyncError> {
            unreachable!("only deletes are queued")
        }

        async fn update(
            &self,
            _remote_id: i64,
            _request: &TodoRequest,
        ) -> Result<TodoResponse, SyncError> {
            unreachable!("only deletes are queued")
        }

        async fn delete(&self, _remote_id: i64) -> Result<(), SyncError> {
            tokio::time::sleep(self.delay).await;
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_runs_repeatedly_until_shutdown() {
        let health_checks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&health_checks);

        let mut remote = MockRemoteClient::new();
        remote.expect_health_check().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        let coordinator = SyncCoordinator::new(
            Arc::new(SqliteQueue::in_memory().unwrap()),
            Arc::new(remote),
            SyncOptions::default(),
        );

        run_every(
            &coordinator,
            Duration::from_millis(20),
            tokio::time::sleep(Duration::from_millis(110)),
        )
        .await;

        assert!(health_checks.load(Ordering::SeqCst) >= 2);
        assert!(!coordinator.is_syncing());
    }

    #[tokio::test]
    async fn test_immediate_shutdown_returns() {
        let mut remote = MockRemoteClient::new();
        remote.expect_health_check().returning(|| false);

        let coordinator = SyncCoordinator::new(
            Arc::new(SqliteQueue::in_memory().unwrap()),
            Arc::new(remote),
            SyncOptions::default(),
        );

        tokio::time::timeout(
            Duration::from_secs(1),
            run_every(&coordinator, Duration::from_secs(60), std::future::ready(())),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_cycle_in_progress() {
        let store = Arc::new(SqliteQueue::in_memory().unwrap());
        for entity_id in ["1", "2", "3"] {
            store.enqueue_delete(entity_id).unwrap();
        }
        let remote = Arc::new(SlowDeletes {
            delay: Duration::from_millis(100),
            deletes: AtomicUsize::new(0),
        });
        let coordinator = SyncCoordinator::new(
            store.clone(),
            remote.clone(),
            SyncOptions::default(),
        );

        // Shutdown fires while the first cycle is on its first delete
        run_every(
            &coordinator,
            Duration::from_millis(20),
            tokio::time::sleep(Duration::from_millis(60)),
        )
        .await;

        assert!(!coordinator.is_syncing());
        assert_eq!(remote.deletes.load(Ordering::SeqCst), 3);
        let stats = store.stats().unwrap();
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.total, 0);
    }
}
