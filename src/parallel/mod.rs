//! Fixed-size worker pool and completion tracking
//!
//! This module provides a pool of long-lived worker threads consuming a shared
//! job queue, plus two ways of waiting for a subset of the work it runs.
//!
//! # Components
//!
//! - [`WorkerPool`]: N worker threads, created once and joined on drop, pulling
//!   jobs from one FIFO queue. `drain()` blocks until the queue is empty **and**
//!   no worker is executing a job.
//! - [`JobsExecutor`]: borrows a pool and waits only for the jobs submitted
//!   through it. Several executors can share one pool.
//! - [`JobCounter`]: a pool-independent counter with increment, decrement and
//!   wait-until-zero, for callers that do their own bookkeeping.
//!
//! ```text
//! ┌──────────────┐ submit  ┌──────────────────────────┐
//! │ JobsExecutor │───────▶│ WorkerPool               │
//! └──────────────┘         │  ┌────────────────────┐  │
//! ┌──────────────┐ submit  │  │ VecDeque<Box<Job>> │  │
//! │ caller       │───────▶│  └─────────┬──────────┘  │
//! └──────────────┘         │     worker-0 … worker-N  │
//!                          └──────────────────────────┘
//! ```
//!
//! # Job failures
//!
//! Every job runs inside `catch_unwind` on its worker. Depending on the pool's
//! [`PanicPolicy`](crate::config::PanicPolicy) a panic is either reported as a
//! [`JobFailure`] (see [`WorkerPool::take_failures`]) or aborts the process.
//! Either way the worker's busy slot is released, so `drain()` never hangs on
//! a failed job.
//!
//! # Example Usage
//!
//! ```rust
//! use jobpool::WorkerPool;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let pool = WorkerPool::new(4)?;
//! let done = Arc::new(AtomicUsize::new(0));
//! for _ in 0..100 {
//!     let done = done.clone();
//!     pool.submit(move || {
//!         done.fetch_add(1, Ordering::Relaxed);
//!     });
//! }
//! pool.drain();
//! assert_eq!(done.load(Ordering::Relaxed), 100);
//! # Ok::<(), anyhow::Error>(())
//! ```

mod completion;
pub mod counter;
pub mod executor;
pub mod job;
pub mod pool;

// Re-export main types for easier access
pub use counter::{JobCounter, JobGuard};
pub use executor::JobsExecutor;
pub use job::{Job, JobFailure};
pub use pool::WorkerPool;
