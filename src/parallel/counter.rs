use std::sync::Arc;

use super::completion::CompletionCounter;

/// A job counter with a completion barrier, independent of any pool.
///
/// Increment before handing work to whatever runs it, decrement at the very
/// end of that work, after every lock on shared data has been released, and
/// call [`wait_for_completion`](Self::wait_for_completion) to block until all
/// tracked work is done. Clones share the same count.
///
/// ```rust
/// use jobpool::{JobCounter, WorkerPool};
///
/// let pool = WorkerPool::new(4)?;
/// let counter = JobCounter::new();
/// for _ in 0..8 {
///     let guard = counter.track();
///     pool.submit(move || {
///         // ... work ...
///         drop(guard);
///     });
/// }
/// counter.wait_for_completion();
/// assert_eq!(counter.count(), 0);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct JobCounter {
    inner: Arc<CompletionCounter>,
}

impl JobCounter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CompletionCounter::new()),
        }
    }

    pub fn increment(&self) {
        self.inner.increment();
    }

    /// Mark one tracked job as finished.
    ///
    /// # Panics
    ///
    /// Panics if called more times than [`increment`](Self::increment).
    pub fn decrement(&self) {
        self.inner.decrement();
    }

    /// Increment now and decrement when the returned guard is dropped.
    pub fn track(&self) -> JobGuard {
        self.inner.increment();
        JobGuard {
            counter: self.inner.clone(),
        }
    }

    /// Block until the count is exactly zero.
    pub fn wait_for_completion(&self) {
        self.inner.wait_for_zero();
    }

    /// Current count; advisory only under concurrent use.
    pub fn count(&self) -> usize {
        self.inner.count()
    }
}

/// Decrements its [`JobCounter`] exactly once when dropped.
///
/// Drop it only after releasing any locks the tracked work holds.
#[derive(Debug)]
#[must_use = "dropping the guard immediately marks the job as finished"]
pub struct JobGuard {
    counter: Arc<CompletionCounter>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}
