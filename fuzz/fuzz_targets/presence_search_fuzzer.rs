//! Fuzz target for Presence Search over arbitrary step sequences
//!
//! # Invariants
//!
//! - Result is the largest round in `[t1, t2]` whose counter equals `v(t1)`
//! - The round after the result has a different counter
//! - Queries never leave `(t1, t2]`

#![no_main]

use arbitrary::Arbitrary;
use beacon_core::{Error, find_last_unchanged};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    /// Per-round increments; each is clamped to 0 or 1
    steps: Vec<bool>,
    t1: u8,
    t2: u8,
}

fuzz_target!(|input: Input| {
    let mut values = vec![0u64];
    for step in &input.steps {
        values.push(values[values.len() - 1] + u64::from(*step));
    }
    let last = values.len() as u64 - 1;

    let t1 = u64::from(input.t1).min(last);
    let t2 = u64::from(input.t2).min(last);
    if t1 >= t2 || values[t1 as usize] == values[t2 as usize] {
        return;
    }
    let v1 = values[t1 as usize];

    let found = find_last_unchanged(
        |t| {
            assert!(t > t1 && t <= t2, "query {t} outside ({t1}, {t2}]");
            Ok::<_, Error>(values[t as usize])
        },
        t1,
        v1,
        t2,
    )
    .expect("search over in-memory counters cannot fail");

    assert_eq!(values[found as usize], v1);
    assert_ne!(values[found as usize + 1], v1);
});
