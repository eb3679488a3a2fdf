//! Held Response Completions
//!
//! The dispatch layer queues a future for every response whose body is
//! still being produced. [`HoldingQueue::flush`] drains them so a test can
//! wait for responses to settle before asserting on them.
//!
//! Draining swaps the queue for an empty one under the lock and awaits the
//! taken batch with the lock released, so futures queued while the batch is
//! running land in the fresh queue and are picked up by the next round.

use crate::result::FetchMockResult;
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A queued completion
pub type HeldFuture = BoxFuture<'static, FetchMockResult<()>>;

/// Shared queue of pending response completions
#[derive(Clone, Default)]
pub struct HoldingQueue {
    pending: Arc<Mutex<Vec<HeldFuture>>>,
}

impl HoldingQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HeldFuture>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a completion
    pub fn push<F>(&self, future: F)
    where
        F: Future<Output = FetchMockResult<()>> + Send + 'static,
    {
        self.lock().push(future.boxed());
    }

    /// Take every queued completion, leaving the queue empty
    #[must_use]
    pub fn take_all(&self) -> Vec<HeldFuture> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of queued completions
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every queued completion without awaiting it
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Await every queued completion.
    ///
    /// With `wait_for_response_methods`, completions queued while a batch
    /// was running are awaited too, until a round queues nothing new. The
    /// first failing completion aborts the flush with its error.
    pub async fn flush(&self, wait_for_response_methods: bool) -> FetchMockResult<()> {
        let mut round = 0usize;
        loop {
            let batch = self.take_all();
            round += 1;
            tracing::debug!(round, pending = batch.len(), "flushing held responses");
            try_join_all(batch).await?;

            if !wait_for_response_methods || self.is_empty() {
                return Ok(());
            }
        }
    }
}

impl std::fmt::Debug for HoldingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldingQueue")
            .field("pending", &self.len())
            .finish()
    }
}
