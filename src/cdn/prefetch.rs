//! Bounded concurrent prefetching
//!
//! Each fetch is one network round-trip, so warming hundreds of files one by
//! one is dominated by latency. The scheduler runs them on the tokio runtime
//! with at most `workers` in flight; everything else waits for a permit.
//!
//! Tasks are never rejected and never cancelled. `await_all` is the only
//! synchronization point and fails on the first error it sees.

use crate::error::{CdnError, CdnResult};
use futures_util::future::try_join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

/// Lower bound on concurrent prefetches
pub const MIN_WORKERS: usize = 1;

/// Upper bound on concurrent prefetches
pub const MAX_WORKERS: usize = 200;

/// Worker pool shared by all prefetch activity of one source
#[derive(Debug, Clone)]
pub struct PrefetchScheduler {
    permits: Arc<Semaphore>,
    workers: usize,
}

/// A submitted prefetch
#[derive(Debug)]
pub struct PrefetchHandle {
    label: String,
    handle: JoinHandle<CdnResult<()>>,
}

impl PrefetchHandle {
    /// What this task is fetching
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PrefetchScheduler {
    /// Create a pool allowing `workers` concurrent tasks (clamped to 1..=200)
    pub fn new(workers: usize) -> Self {
        let workers = workers.clamp(MIN_WORKERS, MAX_WORKERS);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Maximum number of tasks running at once
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queue a task; it starts as soon as a worker slot frees up.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F>(&self, label: impl Into<String>, task: F) -> PrefetchHandle
    where
        F: Future<Output = CdnResult<()>> + Send + 'static,
    {
        let label = label.into();
        let permits = Arc::clone(&self.permits);

        let handle = tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| CdnError::Internal("prefetch pool closed".to_string()))?;
            task.await
        });

        PrefetchHandle { label, handle }
    }

    /// Wait for a batch; the first failure wins.
    ///
    /// Tasks still running when a failure is returned keep running detached.
    pub async fn await_all(handles: Vec<PrefetchHandle>) -> CdnResult<()> {
        if handles.is_empty() {
            return Ok(());
        }

        let count = handles.len();
        try_join_all(handles.into_iter().map(|h| async move {
            match h.handle.await {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(CdnError::PrefetchPanicked { label: h.label }),
                Err(e) => Err(CdnError::Internal(format!(
                    "prefetch {} did not complete: {}",
                    h.label, e
                ))),
            }
        }))
        .await?;

        debug!("CDN: prefetched {} file(s)", count);
        Ok(())
    }
}

impl Default for PrefetchScheduler {
    fn default() -> Self {
        Self::new(MAX_WORKERS)
    }
}
