//! # jobpool - Fixed-size worker thread pool with scoped completion tracking
//!
//! jobpool runs closures on a fixed set of long-lived worker threads and lets
//! callers wait for exactly the work they care about:
//!
//! - **`WorkerPool`**: N workers pulling jobs from one FIFO queue, with a
//!   `drain()` that returns once the queue is empty and every worker is idle
//! - **`JobsExecutor`**: waits only for the jobs submitted through it, so
//!   several independent callers can share one pool
//! - **`JobCounter`**: a standalone increment/decrement/wait-for-zero barrier
//!   for callers that manage their own submission
//!
//! ## Quick Start
//!
//! ```rust
//! use jobpool::{JobsExecutor, WorkerPool};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let pool = WorkerPool::new(0)?; // one worker per CPU
//! let executor = JobsExecutor::new(&pool);
//! let processed = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..32 {
//!     let processed = processed.clone();
//!     executor.submit(move || {
//!         processed.fetch_add(1, Ordering::Relaxed);
//!     });
//! }
//!
//! executor.drain();
//! assert_eq!(processed.load(Ordering::Relaxed), 32);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Configuration
//!
//! Pools can be configured in code or from `jobpool.toml` and `JOBPOOL_*`
//! environment variables:
//!
//! ```toml
//! workers = 8                 # 0 = one per CPU
//! thread_name = "indexer"     # threads are named indexer-0, indexer-1, ...
//! on_panic = "report"         # or "abort"
//! ```
//!
//! ## Shutdown
//!
//! Dropping a `WorkerPool` stops the workers after their current job and
//! discards whatever is still queued. Call `drain()` first when every
//! submitted job has to run.

pub mod cli;
pub mod config;
pub mod parallel;

pub use config::{PanicPolicy, PoolConfig};
pub use parallel::{Job, JobCounter, JobFailure, JobGuard, JobsExecutor, WorkerPool};

/// Result type alias for jobpool operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
