//! End-to-end ring scenario (spec.md §8, scenario S1), run at a reduced
//! scale suited to a test rather than the million-iteration benchmark the
//! scenario describes.

use std::sync::{Arc, Mutex};

use csp_rt::channel::one2one;
use csp_rt::demos::{prefix, seq_delta, successor};
use csp_rt::{Process, ScopedForking};

const ITERATIONS: i32 = 200;

#[test]
fn commstime_ring_produces_the_natural_numbers_and_terminates_on_poison() {
    let (prefix_in, loopback_out) = one2one::<i32>();
    let (delta_in, prefix_out) = one2one::<i32>();
    let (successor_in, delta_out0) = one2one::<i32>();
    let (tap_in, delta_out1) = one2one::<i32>();

    let observed = Arc::new(Mutex::new(Vec::new()));

    let mut scope = ScopedForking::new();
    scope
        .fork(Process::new(move || prefix(prefix_in, prefix_out, 0, 1)))
        .unwrap();
    scope
        .fork(Process::new(move || seq_delta(delta_in, delta_out0, delta_out1)))
        .unwrap();
    scope
        .fork(Process::new(move || successor(successor_in, loopback_out, |t: &mut i32| *t += 1)))
        .unwrap();
    {
        let observed = Arc::clone(&observed);
        scope
            .fork(Process::new(move || {
                for _ in 0..ITERATIONS {
                    observed.lock().unwrap().push(tap_in.read().unwrap());
                }
                // Tear the ring down: every other process will notice this
                // channel is gone on its next communication and propagate
                // poison around the rest of the cycle.
                tap_in.poison();
            }))
            .unwrap();
    }
    drop(scope);

    let observed = observed.lock().unwrap();
    assert_eq!(*observed, (0..ITERATIONS).collect::<Vec<_>>());
}
