//! Task queue and demand-driven scheduling.
//!
//! Producers wrap units of work as [`Task`]s and submit them to a [`Runner`];
//! the runner's coordinator hands each task to exactly one pool worker as soon as
//! a worker is free, until submissions are disabled and the queue has drained.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use kmerpack_lib::taskrunner::{DynamicRunner, Runner};
//!
//! let hits = AtomicUsize::new(0);
//! let runner = DynamicRunner::new(2).unwrap();
//! for _ in 0..10 {
//!     runner.add(|| {
//!         hits.fetch_add(1, Ordering::Relaxed);
//!     });
//! }
//! runner.disable_add();
//! let summary = runner.run();
//! assert_eq!(summary.total, 10);
//! assert_eq!(hits.load(Ordering::Relaxed), 10);
//! ```

pub mod dynamic;
pub mod queue;

pub use dynamic::DynamicRunner;
pub use queue::{ConcurrentQueue, QueueState};

use std::any::Any;

/// A unit of work executed once by a single worker.
pub trait Runnable: Send {
    /// Execute the work, consuming it.
    fn run(self: Box<Self>);
}

impl<F: FnOnce() + Send> Runnable for F {
    fn run(self: Box<Self>) {
        (*self)();
    }
}

/// A boxed task that may borrow data living at least as long as `'a`.
pub type Task<'a> = Box<dyn Runnable + 'a>;

/// Counts reported by [`Runner::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks completed by each worker, indexed by worker id.
    pub per_worker: Vec<u64>,
    /// Tasks completed in total, including panicked ones.
    pub total: u64,
    /// Tasks that panicked.
    pub panicked: u64,
}

/// A scheduler that executes submitted tasks on a pool of workers.
pub trait Runner<'a> {
    /// Submit a task. Returns `false` if submissions are disabled.
    fn add_task(&self, task: Task<'a>) -> bool;

    /// Number of queued tasks not yet handed to a worker.
    fn task_count(&self) -> usize;

    /// True once [`Runner::disable_add`] has been called.
    fn is_add_disabled(&self) -> bool;

    /// Stop accepting tasks so that [`Runner::run`] can finish.
    fn disable_add(&self);

    /// Block until every worker has reached the same barrier.
    fn synchronize(&self);

    /// Execute queued tasks until submissions are disabled and the queue is empty.
    fn run(&self) -> RunSummary;
}

/// Extract a readable message from a panic payload.
pub fn extract_panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
