use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// Jobs never run while one of our locks is held, so the guarded state is
/// consistent even after a poisoning panic.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Block on `condvar` until `keep_waiting` returns false.
pub(crate) fn wait_while<'a, T, F>(
    condvar: &Condvar,
    guard: MutexGuard<'a, T>,
    keep_waiting: F,
) -> MutexGuard<'a, T>
where
    F: FnMut(&mut T) -> bool,
{
    condvar
        .wait_while(guard, keep_waiting)
        .unwrap_or_else(PoisonError::into_inner)
}

/// A count of outstanding work with a block-until-zero operation.
///
/// This is the building block behind [`JobsExecutor`](super::JobsExecutor) and
/// [`JobCounter`](super::JobCounter): an integer guarded by a mutex, and a
/// condition variable that is notified whenever the count drops to zero.
#[derive(Debug, Default)]
pub(crate) struct CompletionCounter {
    count: Mutex<usize>,
    zero: Condvar,
}

impl CompletionCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn increment(&self) {
        *lock(&self.count) += 1;
    }

    /// Panics if the count is already zero.
    pub(crate) fn decrement(&self) {
        let mut count = lock(&self.count);
        if *count == 0 {
            // release before panicking so the mutex is not poisoned
            drop(count);
            panic!("JobCounter decremented below zero");
        }
        *count -= 1;
        if *count == 0 {
            self.zero.notify_all();
        }
    }

    pub(crate) fn wait_for_zero(&self) {
        let count = lock(&self.count);
        let _count = wait_while(&self.zero, count, |count| *count > 0);
    }

    pub(crate) fn count(&self) -> usize {
        *lock(&self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::{RecvTimeoutError, bounded};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_returns_at_zero() {
        let counter = CompletionCounter::new();
        counter.wait_for_zero();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_increment_decrement() {
        let counter = CompletionCounter::new();
        counter.increment();
        counter.increment();
        assert_eq!(counter.count(), 2);
        counter.decrement();
        assert_eq!(counter.count(), 1);
        counter.decrement();
        counter.wait_for_zero();
    }

    #[test]
    fn test_wait_blocks_until_last_decrement() {
        let counter = Arc::new(CompletionCounter::new());
        counter.increment();

        let (done_tx, done_rx) = bounded(1);
        let waiter = {
            let counter = counter.clone();
            thread::spawn(move || {
                counter.wait_for_zero();
                done_tx.send(()).unwrap();
            })
        };

        assert_eq!(
            done_rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Timeout)
        );
        counter.decrement();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();
    }

    #[test]
    #[should_panic(expected = "decremented below zero")]
    fn test_decrement_past_zero_panics() {
        CompletionCounter::new().decrement();
    }

    #[test]
    fn test_usable_after_contract_violation() {
        let counter = Arc::new(CompletionCounter::new());
        let violating = counter.clone();
        assert!(thread::spawn(move || violating.decrement()).join().is_err());

        counter.increment();
        counter.decrement();
        counter.wait_for_zero();
    }
}
