use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

use super::completion::{lock, wait_while};
use super::job::{BoxedJob, Job, JobFailure, panic_message};
use crate::config::{DEFAULT_THREAD_NAME, PanicPolicy, PoolConfig, resolve_worker_count};

/// State shared by every worker, guarded by a single mutex
struct QueueState {
    jobs: VecDeque<BoxedJob>,
    busy: usize,
    terminate: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    job_available: Condvar,
    completion: Condvar,
    on_panic: PanicPolicy,
    failures: Sender<JobFailure>,
}

/// A fixed-size pool of worker threads consuming a shared FIFO job queue.
///
/// Workers are spawned in the constructor and joined when the pool is dropped.
/// Dropping the pool does **not** wait for queued jobs: call
/// [`drain`](Self::drain) first if every submitted job must run.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    num_workers: usize,
    failures: Receiver<JobFailure>,
}

impl WorkerPool {
    /// Create a pool with `workers` threads; `0` picks one per CPU.
    pub fn new(workers: usize) -> Result<Self> {
        Self::named(workers, DEFAULT_THREAD_NAME)
    }

    /// Create a pool whose threads are named `"{prefix}-{index}"`.
    pub fn named(workers: usize, prefix: &str) -> Result<Self> {
        Self::with_config(&PoolConfig {
            workers,
            thread_name: prefix.to_string(),
            ..PoolConfig::default()
        })
    }

    /// Create a pool from a [`PoolConfig`].
    ///
    /// Fails on an invalid configuration. If a worker thread cannot be spawned,
    /// the workers already started are shut down and joined before the error
    /// is returned.
    pub fn with_config(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        let num_workers = resolve_worker_count(config.workers);
        let (failure_tx, failure_rx) = unbounded();

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                busy: 0,
                terminate: false,
            }),
            job_available: Condvar::new(),
            completion: Condvar::new(),
            on_panic: config.on_panic,
            failures: failure_tx,
        });

        // Built incrementally so that Drop cleans up after a failed spawn
        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(num_workers),
            num_workers,
            failures: failure_rx,
        };

        for index in 0..num_workers {
            let shared = pool.shared.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, index))
                .spawn(move || shared.run_worker(index))
                .with_context(|| format!("Failed to spawn worker thread {index}"))?;
            pool.workers.push(handle);
        }

        debug!(
            workers = num_workers,
            thread_name = %config.thread_name,
            on_panic = ?config.on_panic,
            "worker pool started"
        );
        Ok(pool)
    }

    /// Queue a job and wake one idle worker. Never blocks on execution.
    pub fn submit<J: Job>(&self, job: J) {
        self.submit_boxed(Box::new(job));
    }

    pub(crate) fn submit_boxed(&self, job: BoxedJob) {
        let mut state = lock(&self.shared.state);
        state.jobs.push_back(job);
        self.shared.job_available.notify_one();
    }

    /// Block until the queue is empty and no worker is executing a job.
    ///
    /// Calling this from inside a job running on the same pool never returns.
    pub fn drain(&self) {
        let state = lock(&self.shared.state);
        let _state = wait_while(&self.shared.completion, state, |state| {
            !state.jobs.is_empty() || state.busy > 0
        });
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Number of workers currently running a job. Advisory only.
    pub fn num_busy_workers(&self) -> usize {
        lock(&self.shared.state).busy
    }

    /// Number of jobs waiting for a worker. Advisory only.
    pub fn num_queued_jobs(&self) -> usize {
        lock(&self.shared.state).jobs.len()
    }

    /// Take the failures reported by panicking jobs since the last call.
    ///
    /// Failures accumulate until taken.
    pub fn take_failures(&self) -> Vec<JobFailure> {
        self.failures.try_iter().collect()
    }

    /// Number of failures waiting to be taken.
    pub fn num_failures(&self) -> usize {
        self.failures.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        lock(&self.shared.state).terminate = true;
        self.shared.job_available.notify_all();

        for (index, worker) in self.workers.drain(..).enumerate() {
            if worker.join().is_err() {
                error!(worker = index, "worker thread panicked outside of a job");
            }
        }

        let abandoned = lock(&self.shared.state).jobs.len();
        if abandoned > 0 {
            debug!(abandoned, "worker pool dropped with queued jobs");
        }
        let untaken = self.num_failures();
        if untaken > 0 {
            warn!(untaken, "worker pool dropped with job failures never taken");
        }
        debug!(workers = self.num_workers, "worker pool stopped");
    }
}

impl Shared {
    fn run_worker(&self, index: usize) {
        trace!(worker = index, "worker started");
        while let Some(job) = self.next_job() {
            self.execute(job, index);

            let mut state = lock(&self.state);
            state.busy -= 1;
            self.completion.notify_all();
        }
        trace!(worker = index, "worker stopped");
    }

    /// Wait for a job and mark this worker busy, or return `None` once terminating.
    fn next_job(&self) -> Option<BoxedJob> {
        let state = lock(&self.state);
        let mut state = wait_while(&self.job_available, state, |state| {
            state.jobs.is_empty() && !state.terminate
        });
        if state.terminate {
            return None;
        }
        let job = state.jobs.pop_front()?;
        state.busy += 1;
        Some(job)
    }

    fn execute(&self, job: BoxedJob, worker: usize) {
        let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job.run())) else {
            return;
        };
        let message = panic_message(&*payload);

        match self.on_panic {
            PanicPolicy::Report => {
                error!(worker, %message, "job panicked");
                // The receiver lives in the pool, which outlives its workers
                let _ = self.failures.send(JobFailure { worker, message });
            }
            PanicPolicy::Abort => {
                error!(worker, %message, "job panicked, aborting process");
                std::process::abort();
            }
        }
    }
}
