//! Barriers and buckets (spec.md §8 properties 9, 10; a small-scale
//! analogue of scenario S4).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use csp_rt::barrier::Barrier;
use csp_rt::bucket::Bucket;
use csp_rt::{Process, ScopedForking};

#[test]
fn nth_sync_releases_every_previously_parked_participant() {
    let barrier = Arc::new(Barrier::new());
    let releases = Arc::new(Mutex::new(Vec::new()));

    let mut scope = ScopedForking::new();
    for id in 0..4 {
        let end = barrier.enrolled_end();
        let releases = Arc::clone(&releases);
        scope
            .fork(Process::new(move || {
                end.sync();
                releases.lock().unwrap().push(id);
            }))
            .unwrap();
    }
    drop(scope);

    let releases = releases.lock().unwrap();
    assert_eq!(releases.len(), 4);
}

#[test]
fn barrier_supports_repeated_rounds() {
    let barrier = Arc::new(Barrier::new());
    let rounds_completed = Arc::new(Mutex::new(0usize));

    let mut scope = ScopedForking::new();
    for _ in 0..3 {
        let end = barrier.enrolled_end();
        let rounds_completed = Arc::clone(&rounds_completed);
        scope
            .fork(Process::new(move || {
                for _ in 0..50 {
                    end.sync();
                }
                *rounds_completed.lock().unwrap() += 1;
                end.resign();
            }))
            .unwrap();
    }
    drop(scope);

    assert_eq!(*rounds_completed.lock().unwrap(), 3);
}

#[test]
fn resign_completes_a_round_left_waiting_on_by_the_others() {
    let barrier = Arc::new(Barrier::new());
    let released = Arc::new(Mutex::new(false));

    let end_a = barrier.enrolled_end();
    let end_b = barrier.enrolled_end();

    let mut scope = ScopedForking::new();
    {
        let released = Arc::clone(&released);
        scope
            .fork(Process::new(move || {
                end_a.sync();
                *released.lock().unwrap() = true;
            }))
            .unwrap();
    }
    std::thread::sleep(Duration::from_millis(30));
    assert!(!*released.lock().unwrap());

    scope.fork(Process::new(move || end_b.resign())).unwrap();
    drop(scope);

    assert!(*released.lock().unwrap());
}

#[test]
fn bucket_flush_releases_everyone_parked_at_that_moment() {
    let bucket = Bucket::new();
    let released = Arc::new(Mutex::new(0usize));

    let mut scope = ScopedForking::new();
    for _ in 0..5 {
        let bucket = Arc::clone(&bucket);
        let released = Arc::clone(&released);
        scope
            .fork(Process::new(move || {
                bucket.fall_into();
                *released.lock().unwrap() += 1;
            }))
            .unwrap();
    }
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(bucket.holding(), 5);

    bucket.flush();
    drop(scope);

    assert_eq!(*released.lock().unwrap(), 5);
}
