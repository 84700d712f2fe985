use std::sync::Arc;

use super::completion::CompletionCounter;
use super::job::{BoxedJob, Job};
use super::pool::WorkerPool;

/// Submits jobs to a shared [`WorkerPool`] and waits for only those jobs.
///
/// Several executors can share one pool; [`drain`](Self::drain) on one of them
/// ignores jobs submitted through the others or directly to the pool.
///
/// ```rust
/// use jobpool::{JobsExecutor, WorkerPool};
///
/// let pool = WorkerPool::new(4)?;
/// let indexing = JobsExecutor::new(&pool);
/// let thumbnails = JobsExecutor::new(&pool);
///
/// indexing.submit(|| { /* ... */ });
/// thumbnails.submit(|| { /* ... */ });
///
/// indexing.drain(); // thumbnails may still be running
/// # thumbnails.drain();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct JobsExecutor<'pool> {
    pool: &'pool WorkerPool,
    pending: Arc<CompletionCounter>,
}

/// Marks a tracked job finished, even when the job unwinds.
struct Pending(Arc<CompletionCounter>);

impl Drop for Pending {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

impl<'pool> JobsExecutor<'pool> {
    pub fn new(pool: &'pool WorkerPool) -> Self {
        Self {
            pool,
            pending: Arc::new(CompletionCounter::new()),
        }
    }

    pub fn submit<J: Job>(&self, job: J) {
        let job: BoxedJob = Box::new(job);
        let pending = self.pending.clone();
        pending.increment();
        self.pool.submit_boxed(Box::new(move || {
            let _finished = Pending(pending);
            job.run();
        }));
    }

    /// Block until every job submitted through this executor has finished.
    pub fn drain(&self) {
        self.pending.wait_for_zero();
    }

    /// Jobs submitted through this executor that have not finished yet.
    pub fn pending(&self) -> usize {
        self.pending.count()
    }

    pub fn pool(&self) -> &'pool WorkerPool {
        self.pool
    }
}
