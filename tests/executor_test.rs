mod common;

use futures::executor::ThreadPool;
use futures::future::FutureObj;
use futures::task::{Spawn, SpawnError};
use promise_out::{Error, Executor, ExecutorConfig, Promise, State};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use common::init_test_logging;

/// Delegates to a pool and counts what it was handed.
struct CountingSpawner {
    pool: ThreadPool,
    spawned: Arc<AtomicUsize>,
}

impl Spawn for CountingSpawner {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        self.pool.spawn_obj(future)
    }
}

struct ShutDown;

impl Spawn for ShutDown {
    fn spawn_obj(&self, _future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        Err(SpawnError::shutdown())
    }
}

#[test]
fn test_concurrent_settlement_has_one_winner() {
    init_test_logging();
    let promise = Promise::<usize>::new();
    let barrier = Arc::new(Barrier::new(16));
    let racers: Vec<_> = (0..16)
        .map(|i| {
            let promise = promise.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let won = if i % 2 == 0 {
                    promise.resolve(i)
                } else {
                    promise.reject(format!("racer {i}"))
                };
                (i, won)
            })
        })
        .collect();

    let winners: Vec<usize> = racers
        .into_iter()
        .map(|racer| racer.join().expect("A racer thread has panicked"))
        .filter_map(|(i, won)| won.then_some(i))
        .collect();
    assert_eq!(winners.len(), 1);

    let winner = winners[0];
    match promise.outcome() {
        Some(Ok(value)) => assert_eq!(*value, winner),
        Some(Err(err)) => assert_eq!(err.to_string(), format!("racer {winner}")),
        None => panic!("promise still pending after every racer finished"),
    }
}

#[test]
fn test_children_inherit_executor() {
    init_test_logging();
    let spawned = Arc::new(AtomicUsize::new(0));
    let executor = Executor::from_spawner(CountingSpawner {
        pool: ThreadPool::builder().pool_size(2).create().unwrap(),
        spawned: spawned.clone(),
    });

    let promise = Promise::<i32>::with_executor(executor);
    let terminal = promise
        .then(|v| Ok(v + 1))
        .catch(Err)
        .finally(|| ());
    promise.resolve(1);

    assert_eq!(terminal.wait().unwrap(), 2);
    assert_eq!(spawned.load(Ordering::SeqCst), 3);
}

#[test]
fn test_unschedulable_continuation_is_rejected() {
    init_test_logging();
    let promise = Promise::<i32>::with_executor(Executor::from_spawner(ShutDown));
    let child = promise.then(|v| Ok(v * 2));

    assert_eq!(child.state(), State::Rejected);
    match child.error() {
        Some(Error::Spawn(cause)) => assert!(cause.is_shutdown()),
        other => panic!("expected a spawn failure, got {other:?}"),
    }
    // The parent is untouched and can still be settled.
    assert!(promise.resolve(4));
}

#[test]
fn test_thread_per_task_executor() {
    let promise = Promise::<u8>::with_executor(Executor::thread_per_task());
    let doubled = promise.then(|v| Ok(v * 2));
    promise.resolve(21);
    assert_eq!(doubled.wait().unwrap(), 42);
}

#[test]
fn test_named_pool_threads() {
    let pool = Executor::new(&ExecutorConfig::default().pool_size(1).name_prefix("chain-")).unwrap();
    let promise = Promise::<u8>::with_executor(pool);
    let name = promise.then(|_| Ok(thread::current().name().map(str::to_owned)));
    promise.resolve(0);
    let name = name.wait().unwrap().unwrap();
    assert!(name.starts_with("chain-"), "unexpected thread name {name}");
}
