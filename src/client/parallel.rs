//! Bounded-concurrency batch execution for per-item engine calls.
//!
//! The engine exposes single-item operations only (for example
//! `DeleteScan`), so bulk actions fan out one call per ID, up to a fixed
//! number at a time, and collect a per-item outcome instead of stopping at
//! the first failure.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::{BatchError, BatchFailure, Result};

/// Default number of concurrent per-item calls
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Type alias for boxed futures used in batch execution
type ItemFuture = Pin<Box<dyn Future<Output = (usize, String, Result<()>)> + Send>>;

/// Per-item outcome of a batch operation, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// IDs whose call succeeded
    pub succeeded: Vec<String>,
    /// IDs whose call failed, with the error message
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    /// True when every item succeeded.
    #[allow(dead_code)]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Convert to a `Result`, failing with [`BatchError`] if any item failed.
    pub fn into_result(self) -> std::result::Result<Vec<String>, BatchError> {
        if self.failed.is_empty() {
            Ok(self.succeeded)
        } else {
            Err(BatchError {
                succeeded: self.succeeded,
                failed: self.failed,
            })
        }
    }
}

/// Run `op` once per ID with at most `max_concurrent` calls in flight.
///
/// Every ID is attempted exactly once. Results are reported in input order
/// regardless of completion order.
///
/// # Example
///
/// ```ignore
/// let outcome = run_batch(
///     ids,
///     |id| {
///         let c = client.clone();
///         async move { c.delete_scan(&id).await }
///     },
///     4,
/// )
/// .await;
/// ```
pub async fn run_batch<F, Fut>(ids: Vec<String>, op: F, max_concurrent: usize) -> BatchOutcome
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    if ids.is_empty() {
        return BatchOutcome::default();
    }

    let max_concurrent = max_concurrent.max(1);
    debug!(
        "Running batch of {} item(s) with max {} concurrent",
        ids.len(),
        max_concurrent
    );

    let mut results: Vec<(usize, String, Result<()>)> = Vec::with_capacity(ids.len());
    let mut futures: FuturesUnordered<ItemFuture> = FuturesUnordered::new();
    let mut pending = ids.into_iter().enumerate();

    let make_future = |index: usize, id: String, f: &F| -> ItemFuture {
        let fut = f(id.clone());
        Box::pin(async move {
            let result = fut.await;
            (index, id, result)
        })
    };

    for (index, id) in pending.by_ref().take(max_concurrent) {
        futures.push(make_future(index, id, &op));
    }

    while let Some(done) = futures.next().await {
        debug!("Batch item {} finished (ok: {})", done.1, done.2.is_ok());
        results.push(done);

        if let Some((index, id)) = pending.next() {
            futures.push(make_future(index, id, &op));
        }
    }

    results.sort_by_key(|(index, _, _)| *index);

    let mut outcome = BatchOutcome::default();
    for (_, id, result) in results {
        match result {
            Ok(()) => outcome.succeeded.push(id),
            Err(e) => outcome.failed.push(BatchFailure {
                id,
                reason: e.to_string(),
            }),
        }
    }

    debug!(
        "Batch finished: {} succeeded, {} failed",
        outcome.succeeded.len(),
        outcome.failed.len()
    );
    outcome
}
