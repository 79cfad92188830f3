//! Demand-driven runner over a dedicated rayon pool.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Barrier;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::bounded;
use crossbeam_utils::CachePadded;
use log::{debug, error, info};
use rayon::ThreadPool;

use crate::errors::{KmerError, Result};
use crate::taskrunner::queue::ConcurrentQueue;
use crate::taskrunner::{RunSummary, Runner, Task, extract_panic_message};

/// Runs queued tasks on a fixed pool, one task per free worker.
///
/// The thread calling [`Runner::run`] is the only coordinator: it pops a task
/// whenever fewer than `num_threads` tasks are in flight and spawns it on the pool.
/// Producers may keep adding tasks from other threads while `run` executes; `run`
/// returns after [`Runner::disable_add`] once the queue has drained and every
/// spawned task has finished.
pub struct DynamicRunner<'a> {
    pool: ThreadPool,
    num_threads: usize,
    queue: ConcurrentQueue<Task<'a>>,
}

impl<'a> DynamicRunner<'a> {
    /// Create a runner with `num_threads` workers and an unbounded queue.
    ///
    /// # Errors
    ///
    /// Returns [`KmerError::SchedulerUnavailable`] if `num_threads` is zero or the
    /// pool cannot be built.
    pub fn new(num_threads: usize) -> Result<Self> {
        Self::build(num_threads, ConcurrentQueue::new())
    }

    /// Create a runner whose queue holds at most `capacity` tasks, so that
    /// [`Runner::add_task`] blocks while it is full.
    ///
    /// # Errors
    ///
    /// See [`DynamicRunner::new`].
    pub fn with_queue_capacity(num_threads: usize, capacity: usize) -> Result<Self> {
        Self::build(num_threads, ConcurrentQueue::with_capacity(capacity))
    }

    fn build(num_threads: usize, queue: ConcurrentQueue<Task<'a>>) -> Result<Self> {
        if num_threads == 0 {
            return Err(KmerError::SchedulerUnavailable {
                reason: "at least one worker thread is required".to_string(),
            });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("kmerpack-worker-{i}"))
            .build()
            .map_err(|e| KmerError::SchedulerUnavailable { reason: e.to_string() })?;
        Ok(Self { pool, num_threads, queue })
    }

    /// Number of pool workers.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Submit a closure as a task.
    pub fn add<F>(&self, work: F) -> bool
    where
        F: FnOnce() + Send + 'a,
    {
        self.add_task(Box::new(work))
    }
}

impl<'a> Runner<'a> for DynamicRunner<'a> {
    fn add_task(&self, task: Task<'a>) -> bool {
        self.queue.wait_and_push(task).is_ok()
    }

    fn task_count(&self) -> usize {
        self.queue.len()
    }

    fn is_add_disabled(&self) -> bool {
        !self.queue.can_push()
    }

    fn disable_add(&self) {
        self.queue.disable_push();
    }

    /// Callable from outside the pool or from a running task. At most one task
    /// may be inside `synchronize` at a time, since each call parks every worker.
    fn synchronize(&self) {
        let barrier = Barrier::new(self.num_threads);
        self.pool.broadcast(|_| {
            barrier.wait();
        });
    }

    fn run(&self) -> RunSummary {
        let completed: Vec<CachePadded<AtomicU64>> =
            (0..self.num_threads).map(|_| CachePadded::new(AtomicU64::new(0))).collect();
        let panicked = AtomicU64::new(0);
        // One token per in-flight task; sending blocks while every worker is busy.
        let (acquire, release) = bounded::<()>(self.num_threads);

        self.pool.in_place_scope(|scope| {
            while self.queue.can_pop() {
                if acquire.send(()).is_err() {
                    break;
                }
                let Some(task) = self.queue.wait_and_pop() else {
                    let _ = release.try_recv();
                    break;
                };

                let release = release.clone();
                let completed = &completed;
                let panicked = &panicked;
                scope.spawn(move |_| {
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || task.run())) {
                        panicked.fetch_add(1, Ordering::Relaxed);
                        error!("Task panicked: {}", extract_panic_message(payload));
                    }
                    if let Some(worker) = rayon::current_thread_index() {
                        completed[worker].fetch_add(1, Ordering::Relaxed);
                    }
                    let _ = release.recv();
                });
            }
        });

        let per_worker: Vec<u64> = completed.iter().map(|c| c.load(Ordering::Relaxed)).collect();
        let total = per_worker.iter().sum();
        let panicked = panicked.into_inner();
        debug!("Per-worker task counts: {per_worker:?}");
        info!("Dynamic runner completed {total} tasks");
        if panicked > 0 {
            error!("{panicked} tasks panicked");
        }
        RunSummary { per_worker, total, panicked }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_zero_threads_unavailable() {
        assert!(matches!(DynamicRunner::new(0), Err(KmerError::SchedulerUnavailable { .. })));
    }

    #[test]
    fn test_runs_every_task_once() {
        let hits: Vec<AtomicUsize> = (0..100).map(|_| AtomicUsize::new(0)).collect();
        let runner = DynamicRunner::new(4).unwrap();
        for hit in &hits {
            assert!(runner.add(move || {
                hit.fetch_add(1, Ordering::Relaxed);
            }));
        }
        assert_eq!(runner.task_count(), 100);
        runner.disable_add();
        let summary = runner.run();

        assert_eq!(summary.total, 100);
        assert_eq!(summary.per_worker.len(), 4);
        assert_eq!(summary.per_worker.iter().sum::<u64>(), 100);
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
        assert_eq!(runner.task_count(), 0);
    }

    #[test]
    fn test_add_after_disable_is_rejected() {
        let runner = DynamicRunner::new(1).unwrap();
        runner.disable_add();
        assert!(runner.is_add_disabled());
        assert!(!runner.add(|| {}));
        assert_eq!(runner.run(), RunSummary { per_worker: vec![0], total: 0, panicked: 0 });
    }

    #[test]
    fn test_concurrent_producer() {
        let count = AtomicUsize::new(0);
        let runner = DynamicRunner::new(3).unwrap();
        let summary = thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..50 {
                    runner.add(|| {
                        count.fetch_add(1, Ordering::Relaxed);
                    });
                    thread::sleep(Duration::from_micros(200));
                }
                runner.disable_add();
            });
            runner.run()
        });
        assert_eq!(summary.total, 50);
        assert_eq!(count.load(Ordering::Relaxed), 50);
    }

    #[test]
    fn test_in_flight_never_exceeds_workers() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let runner = DynamicRunner::new(2).unwrap();
        for _ in 0..20 {
            runner.add(|| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(2));
                in_flight.fetch_sub(1, Ordering::SeqCst);
            });
        }
        runner.disable_add();
        runner.run();
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_panicking_task_is_counted() {
        let runner = DynamicRunner::new(2).unwrap();
        runner.add(|| panic!("bad task"));
        runner.add(|| {});
        runner.disable_add();
        let summary = runner.run();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.panicked, 1);
    }

    #[test]
    fn test_bounded_queue_with_producer() {
        let count = AtomicUsize::new(0);
        let runner = DynamicRunner::with_queue_capacity(2, 1).unwrap();
        let summary = thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..30 {
                    assert!(runner.add(|| {
                        count.fetch_add(1, Ordering::Relaxed);
                    }));
                }
                runner.disable_add();
            });
            runner.run()
        });
        assert_eq!(summary.total, 30);
        assert_eq!(count.load(Ordering::Relaxed), 30);
    }

    #[test]
    fn test_synchronize_between_runs() {
        let count = AtomicUsize::new(0);
        let runner = DynamicRunner::new(3).unwrap();
        runner.synchronize();
        for _ in 0..9 {
            runner.add(|| {
                count.fetch_add(1, Ordering::Relaxed);
            });
        }
        runner.synchronize();
        assert_eq!(runner.task_count(), 9);
        runner.disable_add();
        assert_eq!(runner.run().total, 9);
        assert_eq!(count.load(Ordering::Relaxed), 9);
    }

    #[test]
    fn test_synchronize_from_inside_a_task() {
        // Tasks must be 'static to borrow the runner they run on.
        let runner: &'static DynamicRunner<'static> =
            Box::leak(Box::new(DynamicRunner::new(2).unwrap()));
        let synced = Arc::new(AtomicUsize::new(0));
        let plain = Arc::new(AtomicUsize::new(0));

        let in_task = Arc::clone(&synced);
        runner.add(move || {
            runner.synchronize();
            in_task.fetch_add(1, Ordering::SeqCst);
        });
        for _ in 0..4 {
            let plain = Arc::clone(&plain);
            runner.add(move || {
                plain.fetch_add(1, Ordering::SeqCst);
            });
        }
        runner.disable_add();

        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let _ = tx.send(runner.run());
        });
        let summary =
            rx.recv_timeout(Duration::from_secs(5)).expect("run did not finish after synchronize");

        assert_eq!(summary.total, 5);
        assert_eq!(summary.panicked, 0);
        assert_eq!(synced.load(Ordering::SeqCst), 1);
        assert_eq!(plain.load(Ordering::SeqCst), 4);
    }
}
