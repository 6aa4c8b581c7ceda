//! Poison-intolerant wrappers over the std synchronization primitives.
//!
//! The game has no safe degraded mode once coordination state may be
//! corrupt, so a poisoned mutex or a failed condition wait is fatal: the
//! panic carries a diagnostic and the binary's panic hook restores the
//! terminal before it prints.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Lock `mutex`, treating poisoning as a fatal coordination failure.
pub fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{what} mutex poisoned; coordination state is corrupt"),
    }
}

/// Block on `cond`, treating poisoning as fatal.
pub fn wait<'a, T>(cond: &Condvar, guard: MutexGuard<'a, T>, what: &str) -> MutexGuard<'a, T> {
    match cond.wait(guard) {
        Ok(guard) => guard,
        Err(_) => panic!("{what} condition wait failed; coordination state is corrupt"),
    }
}

/// Timed wait on `cond`. Returns the guard and whether the wait timed out.
///
/// Callers that need an absolute deadline recompute the remaining duration
/// each time around their predicate loop, so a spurious wakeup here is
/// harmless.
pub fn wait_timeout<'a, T>(
    cond: &Condvar,
    guard: MutexGuard<'a, T>,
    timeout: Duration,
    what: &str,
) -> (MutexGuard<'a, T>, bool) {
    match cond.wait_timeout(guard, timeout) {
        Ok((guard, result)) => (guard, result.timed_out()),
        Err(_) => panic!("{what} condition wait failed; coordination state is corrupt"),
    }
}
