//! Concurrency tests for the task queue and the dynamic runner.
//!
//! These tests verify that every submitted task runs exactly once, that producers
//! and the coordinator can overlap, and that the queue hands out each item once
//! under contention.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use kmerpack_lib::taskrunner::{ConcurrentQueue, DynamicRunner, QueueState, Runner};
use parking_lot::Mutex;

#[test]
fn test_multiple_producers_single_run() {
    let seen = Mutex::new(Vec::new());
    let runner = DynamicRunner::new(4).unwrap();

    let summary = thread::scope(|s| {
        let producers: Vec<_> = (0..3)
            .map(|p| {
                let (runner, seen) = (&runner, &seen);
                s.spawn(move || {
                    for i in 0..100 {
                        runner.add(move || seen.lock().push(p * 1000 + i));
                    }
                })
            })
            .collect();
        s.spawn(|| {
            for producer in producers {
                producer.join().unwrap();
            }
            runner.disable_add();
        });
        runner.run()
    });
    drop(runner);

    let mut seen = seen.into_inner();
    seen.sort_unstable();
    let expected: Vec<i32> =
        (0..3).flat_map(|p| (0..100).map(move |i| p * 1000 + i)).collect();
    assert_eq!(seen, expected);
    assert_eq!(summary.total, 300);
    assert_eq!(summary.per_worker.iter().sum::<u64>(), 300);
}

#[test]
fn test_work_spreads_across_workers() {
    let runner = DynamicRunner::new(4).unwrap();
    for _ in 0..40 {
        runner.add(|| thread::sleep(Duration::from_millis(2)));
    }
    runner.disable_add();
    let summary = runner.run();

    assert_eq!(summary.total, 40);
    let busy = summary.per_worker.iter().filter(|&&n| n > 0).count();
    assert!(busy >= 2, "only {busy} workers ran tasks: {:?}", summary.per_worker);
}

#[test]
fn test_panics_do_not_stop_the_run() {
    let done = AtomicUsize::new(0);
    let runner = DynamicRunner::new(2).unwrap();
    for i in 0..20 {
        let done = &done;
        runner.add(move || {
            assert!(i % 5 != 0, "task {i} fails");
            done.fetch_add(1, Ordering::Relaxed);
        });
    }
    runner.disable_add();
    let summary = runner.run();

    assert_eq!(summary.total, 20);
    assert_eq!(summary.panicked, 4);
    assert_eq!(done.load(Ordering::Relaxed), 16);
}

#[test]
fn test_bounded_runner_with_slow_consumer() {
    let count = AtomicUsize::new(0);
    let runner = DynamicRunner::with_queue_capacity(2, 3).unwrap();

    let summary = thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..30 {
                assert!(runner.add(|| {
                    thread::sleep(Duration::from_micros(300));
                    count.fetch_add(1, Ordering::Relaxed);
                }));
                assert!(runner.task_count() <= 3);
            }
            runner.disable_add();
        });
        runner.run()
    });

    assert_eq!(summary.total, 30);
    assert_eq!(count.load(Ordering::Relaxed), 30);
}

#[test]
fn test_queue_many_consumers_each_item_once() {
    let queue = Arc::new(ConcurrentQueue::with_capacity(16));
    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut got = Vec::new();
                while let Some(item) = queue.wait_and_pop() {
                    got.push(item);
                }
                got
            })
        })
        .collect();

    for i in 0..1_000u32 {
        queue.wait_and_push(i).unwrap();
    }
    queue.disable_push();

    let mut all: Vec<u32> = consumers.into_iter().flat_map(|c| c.join().unwrap()).collect();
    all.sort_unstable();
    assert_eq!(all, (0..1_000).collect::<Vec<_>>());
    assert_eq!(queue.state(), QueueState::Closed);
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    // Property: with producers and consumers interleaved, every pushed item is
    // popped exactly once and nothing is accepted after push is disabled.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn proptest_queue_delivers_every_item_once(
            producers in 1usize..4,
            consumers in 1usize..4,
            per_producer in 0usize..200,
            capacity in prop::option::of(1usize..32),
        ) {
            let queue = match capacity {
                Some(cap) => ConcurrentQueue::with_capacity(cap),
                None => ConcurrentQueue::new(),
            };
            let popped = Mutex::new(Vec::new());

            thread::scope(|s| {
                let consumer_handles: Vec<_> = (0..consumers)
                    .map(|_| {
                        s.spawn(|| {
                            while let Some(item) = queue.wait_and_pop() {
                                popped.lock().push(item);
                            }
                        })
                    })
                    .collect();
                let producer_handles: Vec<_> = (0..producers)
                    .map(|p| {
                        let queue = &queue;
                        s.spawn(move || {
                            for i in 0..per_producer {
                                queue.wait_and_push(p * 10_000 + i).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in producer_handles {
                    handle.join().unwrap();
                }
                queue.disable_push();
                for handle in consumer_handles {
                    handle.join().unwrap();
                }
            });

            prop_assert!(queue.try_push(0).is_err());
            let popped = popped.into_inner();
            let unique: HashSet<usize> = popped.iter().copied().collect();
            prop_assert_eq!(popped.len(), producers * per_producer);
            prop_assert_eq!(unique.len(), popped.len());
        }
    }

    // Property: the runner executes each submitted task exactly once for any
    // thread count and task count.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn proptest_runner_runs_each_task_once(threads in 1usize..6, tasks in 0usize..150) {
            let hits: Vec<AtomicUsize> = (0..tasks).map(|_| AtomicUsize::new(0)).collect();
            let runner = DynamicRunner::new(threads).unwrap();
            for hit in &hits {
                runner.add(move || {
                    hit.fetch_add(1, Ordering::Relaxed);
                });
            }
            runner.disable_add();
            let summary = runner.run();

            prop_assert_eq!(summary.total, tasks as u64);
            prop_assert_eq!(summary.per_worker.len(), threads);
            prop_assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
        }
    }
}
