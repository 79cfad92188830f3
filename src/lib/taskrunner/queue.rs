//! Blocking multi-producer multi-consumer queue with a one-way close.
//!
//! A [`ConcurrentQueue`] starts [`QueueState::Open`]. Once producers call
//! [`ConcurrentQueue::disable_push`] it becomes `Draining`: no new items are
//! accepted, but consumers keep popping until it is empty, at which point it is
//! `Closed` and every blocked popper wakes with `None`.
//!
//! # Example
//!
//! ```
//! use kmerpack_lib::taskrunner::ConcurrentQueue;
//!
//! let queue = ConcurrentQueue::new();
//! queue.wait_and_push(1).unwrap();
//! queue.disable_push();
//! assert!(queue.try_push(2).is_err());
//! assert_eq!(queue.wait_and_pop(), Some(1));
//! assert_eq!(queue.wait_and_pop(), None);
//! ```

use std::collections::VecDeque;

use log::debug;
use parking_lot::{Condvar, Mutex};

/// Lifecycle of a [`ConcurrentQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Accepting pushes.
    Open,
    /// Push disabled, items remain.
    Draining,
    /// Push disabled and empty.
    Closed,
}

struct Inner<T> {
    items: VecDeque<T>,
    open: bool,
}

/// Thread-safe FIFO queue guarded by a mutex and two condition variables.
///
/// Each accepted item is delivered to exactly one popper.
pub struct ConcurrentQueue<T> {
    inner: Mutex<Inner<T>>,
    /// Signalled when an item arrives or pushing is disabled.
    available: Condvar,
    /// Signalled when an item leaves a bounded queue or pushing is disabled.
    not_full: Condvar,
    capacity: Option<usize>,
}

impl<T> ConcurrentQueue<T> {
    /// Create an unbounded queue.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a queue holding at most `capacity` items.
    ///
    /// # Arguments
    /// * `capacity` - Maximum queued items; zero is raised to one
    ///
    /// # Examples
    ///
    /// ```
    /// use kmerpack_lib::taskrunner::ConcurrentQueue;
    ///
    /// let queue = ConcurrentQueue::with_capacity(1);
    /// assert!(queue.try_push('a').is_ok());
    /// assert_eq!(queue.try_push('b'), Err('b'));
    /// assert_eq!(queue.try_pop(), Some('a'));
    /// assert!(queue.try_push('b').is_ok());
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Some(capacity.max(1)))
    }

    fn build(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: capacity.map_or_else(VecDeque::new, VecDeque::with_capacity),
                open: true,
            }),
            available: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    fn is_full(&self, inner: &Inner<T>) -> bool {
        self.capacity.is_some_and(|cap| inner.items.len() >= cap)
    }

    /// Push without waiting for space.
    ///
    /// # Errors
    ///
    /// Returns the item if pushing is disabled or a bounded queue is full.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        let mut inner = self.inner.lock();
        if !inner.open || self.is_full(&inner) {
            return Err(item);
        }
        inner.items.push_back(item);
        drop(inner);
        self.available.notify_one();
        Ok(())
    }

    /// Push, waiting while a bounded queue is full and still open.
    ///
    /// A producer blocked on a full queue wakes when a consumer pops or when
    /// [`ConcurrentQueue::disable_push`] is called, whichever comes first.
    ///
    /// # Errors
    ///
    /// Returns the item if pushing is disabled, including while waiting.
    pub fn wait_and_push(&self, item: T) -> Result<(), T> {
        let mut inner = self.inner.lock();
        while inner.open && self.is_full(&inner) {
            self.not_full.wait(&mut inner);
        }
        if !inner.open {
            return Err(item);
        }
        inner.items.push_back(item);
        drop(inner);
        self.available.notify_one();
        Ok(())
    }

    /// Pop the oldest item, waiting until one is available.
    ///
    /// # Returns
    /// The oldest item, or `None` once the queue is closed (push disabled and
    /// empty). Items queued before [`ConcurrentQueue::disable_push`] are still
    /// delivered.
    pub fn wait_and_pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Some(item);
            }
            if !inner.open {
                return None;
            }
            self.available.wait(&mut inner);
        }
    }

    /// Pop the oldest item if one is present.
    pub fn try_pop(&self) -> Option<T> {
        let item = self.inner.lock().items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Stop accepting items and wake every waiter. Idempotent.
    pub fn disable_push(&self) {
        let mut inner = self.inner.lock();
        if !inner.open {
            return;
        }
        inner.open = false;
        debug!("Queue push disabled with {} items remaining", inner.items.len());
        drop(inner);
        self.available.notify_all();
        self.not_full.notify_all();
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// True if no items are queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// True while pushing is enabled.
    pub fn can_push(&self) -> bool {
        self.inner.lock().open
    }

    /// True while a pop could still yield an item: items are queued or pushing is
    /// enabled.
    pub fn can_pop(&self) -> bool {
        let inner = self.inner.lock();
        inner.open || !inner.items.is_empty()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueueState {
        let inner = self.inner.lock();
        match (inner.open, inner.items.is_empty()) {
            (true, _) => QueueState::Open,
            (false, false) => QueueState::Draining,
            (false, true) => QueueState::Closed,
        }
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
