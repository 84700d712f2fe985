use std::any::Any;

/// A unit of work that can be handed to a [`WorkerPool`](super::WorkerPool).
///
/// Every `FnOnce() + Send + 'static` closure is a job. Types that carry their
/// own state can implement the trait directly:
///
/// ```rust
/// use jobpool::{Job, WorkerPool};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct Tally(Arc<AtomicUsize>);
///
/// impl Job for Tally {
///     fn run(self: Box<Self>) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let pool = WorkerPool::new(2)?;
/// let hits = Arc::new(AtomicUsize::new(0));
/// pool.submit(Tally(hits.clone()));
/// pool.drain();
/// assert_eq!(hits.load(Ordering::Relaxed), 1);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub trait Job: Send + 'static {
    /// Consume the job and execute it on the calling thread.
    fn run(self: Box<Self>);
}

impl<F> Job for F
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) {
        (*self)()
    }
}

/// Ownership-erased job as stored in the queue
pub(crate) type BoxedJob = Box<dyn Job>;

/// A job that panicked while running on a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Index of the worker that ran the job
    pub worker: usize,
    /// Panic payload rendered as text
    pub message: String,
}

/// Render a panic payload the way the default panic hook does.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Add {
        target: Arc<AtomicUsize>,
        amount: usize,
    }

    impl Job for Add {
        fn run(self: Box<Self>) {
            self.target.fetch_add(self.amount, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_closure_is_a_job() {
        let counter = Arc::new(AtomicUsize::new(0));
        let captured = counter.clone();
        let job: BoxedJob = Box::new(move || {
            captured.fetch_add(1, Ordering::SeqCst);
        });
        job.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_struct_job() {
        let counter = Arc::new(AtomicUsize::new(0));
        let job: BoxedJob = Box::new(Add {
            target: counter.clone(),
            amount: 5,
        });
        job.run();
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_panic_message_payloads() {
        let payload = panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(&*payload), "static message");

        let payload = panic::catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        assert_eq!(panic_message(&*payload), "formatted 42");

        let payload = panic::catch_unwind(|| panic::panic_any(7_u8)).unwrap_err();
        assert_eq!(panic_message(&*payload), "Box<dyn Any>");
    }
}
