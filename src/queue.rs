//! Shared FIFO queue with an end-of-production flag.
//!
//! `SharedQueue` is the only state the producer and the consumers share. The item
//! sequence and the `finished` flag sit behind one mutex so that "empty and still
//! producing" versus "empty and done" is decided in a single critical section.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::errors::{PipelineError, Result};

/// Outcome of [`SharedQueue::pop_or_wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pop<T> {
    /// The head of the queue, now owned by the caller.
    Item(T),
    /// The queue is empty and production is finished.
    Done,
}

struct QueueState<T> {
    items: VecDeque<T>,
    finished: bool,
}

/// Unbounded FIFO shared by one producer and many consumers.
pub struct SharedQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> Default for SharedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                finished: false,
            }),
            available: Condvar::new(),
        }
    }

    // No caller code runs while the lock is held, so a poisoned lock still
    // guards consistent state.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item` to the tail and wakes one waiting consumer.
    ///
    /// Fails with [`PipelineError::QueueFinished`] once [`mark_finished`](Self::mark_finished)
    /// has been called; the item is dropped in that case.
    pub fn push(&self, item: T) -> Result<()> {
        {
            let mut state = self.lock();
            if state.finished {
                return Err(PipelineError::QueueFinished);
            }
            state.items.push_back(item);
        }
        // One new item, so one waiter is enough.
        self.available.notify_one();
        Ok(())
    }

    /// Removes the head item, blocking while the queue is empty and production
    /// is still running.
    ///
    /// Returns [`Pop::Done`] once the queue is drained and finished. The lock is
    /// released before returning, so the caller works on the item unlocked.
    pub fn pop_or_wait(&self) -> Pop<T> {
        let guard = self.lock();
        // wait_while re-checks the predicate after every wakeup, spurious or not.
        let mut state = self
            .available
            .wait_while(guard, |s| s.items.is_empty() && !s.finished)
            .unwrap_or_else(PoisonError::into_inner);

        match state.items.pop_front() {
            Some(item) => Pop::Item(item),
            None => Pop::Done,
        }
    }

    /// Records the end of production and wakes every waiting consumer.
    ///
    /// The flag never resets; calling this again has no further effect.
    pub fn mark_finished(&self) {
        {
            let mut state = self.lock();
            if state.finished {
                tracing::debug!("queue already marked finished");
                return;
            }
            state.finished = true;
        }
        // No more pushes will come, so every waiter must re-check.
        self.available.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = SharedQueue::new();
        for i in 0..5 {
            queue.push(i).unwrap();
        }
        queue.mark_finished();

        let drained: Vec<_> = std::iter::from_fn(|| match queue.pop_or_wait() {
            Pop::Item(i) => Some(i),
            Pop::Done => None,
        })
        .collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_items_pushed_before_finish_are_still_delivered() {
        let queue = SharedQueue::new();
        queue.push("a").unwrap();
        queue.mark_finished();

        assert_eq!(queue.pop_or_wait(), Pop::Item("a"));
        assert_eq!(queue.pop_or_wait(), Pop::Done);
        // Done is sticky.
        assert_eq!(queue.pop_or_wait(), Pop::Done);
    }

    #[test]
    fn test_push_after_finish_is_rejected() {
        let queue = SharedQueue::new();
        queue.mark_finished();
        assert!(matches!(queue.push(1), Err(PipelineError::QueueFinished)));
        assert_eq!(queue.pop_or_wait(), Pop::Done);
    }

    #[test]
    fn test_mark_finished_is_idempotent() {
        let queue: SharedQueue<u8> = SharedQueue::new();
        queue.mark_finished();
        queue.mark_finished();
        assert_eq!(queue.pop_or_wait(), Pop::Done);
    }

    #[test]
    fn test_blocked_consumer_wakes_on_push() {
        let queue = Arc::new(SharedQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_or_wait())
        };

        thread::sleep(Duration::from_millis(50));
        queue.push(7).unwrap();

        assert_eq!(consumer.join().unwrap(), Pop::Item(7));
    }

    #[test]
    fn test_mark_finished_wakes_all_waiters() {
        let queue: Arc<SharedQueue<u32>> = Arc::new(SharedQueue::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || queue.pop_or_wait())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        queue.mark_finished();

        for w in waiters {
            assert_eq!(w.join().unwrap(), Pop::Done);
        }
    }

    #[test]
    fn test_each_item_popped_once_across_consumers() {
        let queue: Arc<SharedQueue<usize>> = Arc::new(SharedQueue::new());
        let consumers: Vec<_> = (0..8)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Pop::Item(i) = queue.pop_or_wait() {
                        seen.push(i);
                    }
                    seen
                })
            })
            .collect();

        for i in 0..1000 {
            queue.push(i).unwrap();
        }
        queue.mark_finished();

        let mut all: Vec<usize> = consumers
            .into_iter()
            .flat_map(|c| c.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..1000).collect::<Vec<_>>());
    }
}
