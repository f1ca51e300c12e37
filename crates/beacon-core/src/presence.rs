//! Presence Search.
//!
//! Binary search over a recipient's counter sequence `v(t)`. The sequence is
//! a non-decreasing step function, so "`v(t) == v(t1)`" holds on a prefix of
//! `[t1, t2]` and the search finds the end of that prefix.
//!
//! The midpoint is `ceil((t1 + t2) / 2)`. It decides which rounds get queried
//! and therefore which round numbers appear in query logs; keep it exact.

use crate::{ConfigError, Error};

/// Find the last round in `[t1, t2]` whose counter still equals `v1`.
///
/// `counter(t)` yields `v(t)`. Returns `t*` such that `v(t*) == v1` and, when
/// `v(t2) != v1`, `t* + 1` is the first round whose counter differs. Costs at
/// most `ceil(log2(t2 - t1 + 1))` counter evaluations.
///
/// # Invariants
///
/// - Pre: `v(t1) == v1`, `v` is non-decreasing on `[t1, t2]`
/// - Post: `t1 <= t* <= t2`
///
/// The result is unspecified for sequences that are not step functions.
///
/// # Errors
///
/// - `Config(InvalidRange)`: `t1 > t2`
/// - any error returned by `counter`
pub fn find_last_unchanged<F>(mut counter: F, t1: u64, v1: u64, t2: u64) -> Result<u64, Error>
where
    F: FnMut(u64) -> Result<u64, Error>,
{
    if t1 > t2 {
        return Err(ConfigError::InvalidRange { from: t1, to: t2 }.into());
    }

    let (mut lo, mut hi) = (t1, t2);
    while lo < hi {
        let m = lo + (hi - lo).div_ceil(2);
        let vm = counter(m)?;

        tracing::debug!(lo, hi, query = m, unchanged = vm == v1, "presence query");

        if vm == v1 {
            lo = m;
        } else {
            hi = m - 1;
        }
    }

    debug_assert!(t1 <= lo && lo <= t2);

    Ok(lo)
}
