//! The alternative construct: priority selection, the enable-race, and
//! fair rotation (spec.md §8 properties 6, 7, 8; scenario S2).

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use csp_rt::alt::{Alt, AbsoluteTimeoutGuard, ChannelInputGuard, RelativeTimeoutGuard, SkipGuard};
use csp_rt::channel::one2one;
use csp_rt::{Process, ScopedForking, Time};

#[test]
fn pri_select_returns_the_lowest_ready_index() {
    let (r0, w0) = one2one::<i32>();
    let (r1, w1) = one2one::<i32>();
    let (r2, w2) = one2one::<i32>();
    let (r3, w3) = one2one::<i32>();

    let mut scope = ScopedForking::new();
    // Ready set S = {1, 3}: writers park on channels 1 and 3, nothing
    // arrives on 0 or 2.
    scope.fork(Process::new(move || w1.write(10).unwrap())).unwrap();
    scope.fork(Process::new(move || w3.write(30).unwrap())).unwrap();
    std::thread::sleep(Duration::from_millis(30));

    let chosen = Arc::new(Mutex::new(None));
    {
        let chosen = Arc::clone(&chosen);
        scope
            .fork(Process::new(move || {
                let alt = Alt::new(vec![
                    Box::new(ChannelInputGuard::new(r0)),
                    Box::new(ChannelInputGuard::new(r1.clone())),
                    Box::new(ChannelInputGuard::new(r2)),
                    Box::new(ChannelInputGuard::new(r3.clone())),
                ]);
                let index = alt.pri_select();
                *chosen.lock().unwrap() = Some(index);
                match index {
                    1 => {
                        r1.read().unwrap();
                    }
                    3 => {
                        r3.read().unwrap();
                    }
                    other => panic!("unexpected guard index {other}"),
                }
            }))
            .unwrap();
    }
    drop(scope);

    assert_eq!(chosen.lock().unwrap().unwrap(), 1);
}

#[test]
fn select_does_not_wait_when_a_guard_fires_during_enable() {
    // spec.md property 7: a guard firing anywhere during the enable pass
    // (not just the first one) must still be picked up at disable time
    // without the alter ever parking.
    let (reader, writer) = one2one::<i32>();
    let (never_reader, _never_writer) = one2one::<i32>();

    let mut scope = ScopedForking::new();
    scope
        .fork(Process::new(move || {
            std::thread::sleep(Duration::from_millis(20));
            writer.write(5).unwrap();
        }))
        .unwrap();

    let chosen = Arc::new(Mutex::new(None));
    {
        let chosen = Arc::clone(&chosen);
        scope
            .fork(Process::new(move || {
                let alt = Alt::new(vec![
                    Box::new(ChannelInputGuard::new(reader.clone())),
                    Box::new(ChannelInputGuard::new(never_reader)),
                ]);
                let index = alt.pri_select();
                *chosen.lock().unwrap() = Some(index);
                assert_eq!(index, 0);
                reader.read().unwrap();
            }))
            .unwrap();
    }
    drop(scope);

    assert_eq!(chosen.lock().unwrap().unwrap(), 0);
}

#[test]
fn fair_select_rotates_round_robin_across_calls() {
    let selections = Arc::new(Mutex::new(Vec::new()));
    let selections_for_process = Arc::clone(&selections);

    let mut scope = ScopedForking::new();
    scope
        .fork(Process::new(move || {
            let alt = Alt::new(vec![
                Box::new(SkipGuard::new()),
                Box::new(SkipGuard::new()),
                Box::new(SkipGuard::new()),
                Box::new(SkipGuard::new()),
            ]);
            for _ in 0..8 {
                selections_for_process.lock().unwrap().push(alt.fair_select());
            }
        }))
        .unwrap();
    drop(scope);

    assert_eq!(*selections.lock().unwrap(), vec![0, 1, 2, 3, 0, 1, 2, 3]);
}

#[test]
fn alt_poison_precedence_over_a_never_written_channel() {
    // spec.md scenario S2: c1 poisoned, c0 has no writer; priSelect must
    // return 1, and reading c1 afterwards must report poison.
    let (r0, _w0) = one2one::<i32>();
    let (r1, w1) = one2one::<i32>();
    w1.poison();

    let chosen = Arc::new(Mutex::new(None));
    let read_was_poisoned = Arc::new(Mutex::new(false));
    {
        let chosen = Arc::clone(&chosen);
        let read_was_poisoned = Arc::clone(&read_was_poisoned);
        let mut scope = ScopedForking::new();
        scope
            .fork(Process::new(move || {
                let alt = Alt::new(vec![
                    Box::new(ChannelInputGuard::new(r0)),
                    Box::new(ChannelInputGuard::new(r1.clone())),
                ]);
                let index = alt.pri_select();
                *chosen.lock().unwrap() = Some(index);
                *read_was_poisoned.lock().unwrap() = r1.read().is_err();
            }))
            .unwrap();
    }

    assert_eq!(chosen.lock().unwrap().unwrap(), 1);
    assert!(*read_was_poisoned.lock().unwrap());
}

#[test]
fn relative_timeout_guard_recomputes_its_deadline_on_each_reuse() {
    // spec.md §4.3: reusing a RelativeTimeoutGuard across rounds of the
    // same Alt must re-wait the full delta each time, not just once.
    const DELTA: Duration = Duration::from_millis(60);
    let elapsed = Arc::new(Mutex::new(Vec::new()));

    let elapsed_for_process = Arc::clone(&elapsed);
    let mut scope = ScopedForking::new();
    scope
        .fork(Process::new(move || {
            let alt = Alt::new(vec![Box::new(RelativeTimeoutGuard::new(DELTA))]);
            for _ in 0..2 {
                let started = Instant::now();
                let index = alt.pri_select();
                assert_eq!(index, 0);
                elapsed_for_process.lock().unwrap().push(started.elapsed());
            }
        }))
        .unwrap();
    drop(scope);

    let elapsed = elapsed.lock().unwrap();
    assert_eq!(elapsed.len(), 2);
    assert!(elapsed[0] >= DELTA, "first round fired early: {:?}", elapsed[0]);
    assert!(elapsed[1] >= DELTA, "second round fired early: {:?}", elapsed[1]);
}

#[test]
fn absolute_timeout_guard_fires_once_the_deadline_passes() {
    const DELTA: Duration = Duration::from_millis(60);
    let fired_after = Arc::new(Mutex::new(None::<Duration>));

    let fired_after_for_process = Arc::clone(&fired_after);
    let mut scope = ScopedForking::new();
    scope
        .fork(Process::new(move || {
            let deadline = Time::now() + DELTA;
            let alt = Alt::new(vec![Box::new(AbsoluteTimeoutGuard::new(deadline))]);
            let started = Instant::now();
            let index = alt.pri_select();
            assert_eq!(index, 0);
            *fired_after_for_process.lock().unwrap() = Some(started.elapsed());
        }))
        .unwrap();
    drop(scope);

    let fired_after = fired_after.lock().unwrap().unwrap();
    assert!(fired_after >= DELTA, "fired before its deadline: {fired_after:?}");
}
