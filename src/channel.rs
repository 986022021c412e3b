use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex},
    time::{Duration, Instant},
};

/// A thread-safe queue with blocking receive, built on Mutex and Condvar.
///
/// This is not a full-featured channel, but provides the handoff guarantees
/// needed for transition notifications: every sent value is received by
/// exactly one receiver, in send order.
///
/// This type is used for signaling phase transitions between threads.
#[derive(Debug)]
pub struct BlockingChannel<T> {
    queue: Mutex<VecDeque<T>>,
    cond_var: Condvar,
}

impl<T> BlockingChannel<T> {
    pub fn new() -> Self {
        BlockingChannel {
            queue: Mutex::new(VecDeque::new()),
            cond_var: Condvar::new(),
        }
    }

    /// Enqueues a value and wakes one waiting receiver. Never blocks.
    pub fn send(&self, value: T) {
        let mut guard = self.queue.lock().unwrap();
        guard.push_back(value);
        drop(guard);
        self.cond_var.notify_one();
    }

    /// Blocks until a value is available, then dequeues the oldest one.
    ///
    /// The emptiness condition is re-checked on every wakeup, so a spurious
    /// wakeup or a competing receiver draining the queue first sends the
    /// caller back to waiting rather than returning a stale value.
    pub fn recv(&self) -> T {
        let mut guard = self.queue.lock().unwrap();
        loop {
            if let Some(value) = guard.pop_front() {
                return value;
            }
            guard = self.cond_var.wait(guard).unwrap();
        }
    }

    /// Like [`BlockingChannel::recv`], but gives up once `timeout` has
    /// elapsed and returns `None`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;

        let mut guard = self.queue.lock().unwrap();
        loop {
            if let Some(value) = guard.pop_front() {
                return Some(value);
            }

            let remaining = deadline.checked_duration_since(Instant::now())?;
            let (next_guard, result) = self.cond_var.wait_timeout(guard, remaining).unwrap();
            guard = next_guard;

            if result.timed_out() {
                return guard.pop_front();
            }
        }
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }
}

impl<T> Default for BlockingChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}
