//! Per-hole mutual exclusion.
//!
//! Each of the nine holes has its own lock. Whoever holds a hole's lock
//! (a mole worker, or the misfire overlay) is the only party allowed to
//! draw into that hole's screen region. Guards release on drop, so a hole
//! can never leak claimed.

use std::sync::{Mutex, MutexGuard};

use tui_wam_types::{HOLE_CLAIM_BACKOFF_MS, MOLE_HOLES};

use crate::rng::SharedRng;
use crate::sync;

/// Exclusive claim on one hole. Releases on drop.
#[derive(Debug)]
pub struct HoleGuard<'a> {
    hole: usize,
    _guard: MutexGuard<'a, ()>,
}

impl HoleGuard<'_> {
    /// Which hole this guard owns.
    pub fn hole(&self) -> usize {
        self.hole
    }
}

/// The nine hole locks.
#[derive(Debug, Default)]
pub struct HoleSet {
    locks: [Mutex<()>; MOLE_HOLES],
}

impl HoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `hole`, blocking until it is free.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range hole index.
    pub fn claim(&self, hole: usize) -> HoleGuard<'_> {
        assert!(hole < MOLE_HOLES, "hole number ({hole}) out of range");
        HoleGuard {
            hole,
            _guard: sync::lock(&self.locks[hole], "hole"),
        }
    }

    /// Claim `hole` only if it is currently free.
    pub fn try_claim(&self, hole: usize) -> Option<HoleGuard<'_>> {
        assert!(hole < MOLE_HOLES, "hole number ({hole}) out of range");
        match self.locks[hole].try_lock() {
            Ok(guard) => Some(HoleGuard {
                hole,
                _guard: guard,
            }),
            Err(std::sync::TryLockError::WouldBlock) => None,
            Err(std::sync::TryLockError::Poisoned(_)) => {
                panic!("hole mutex poisoned; coordination state is corrupt")
            }
        }
    }

    /// Claim a random free hole. Draws a fresh candidate each attempt and
    /// backs off briefly between failed attempts rather than blocking on any
    /// single hole, so contending workers spread out over the playfield.
    pub fn claim_random(&self, rng: &SharedRng) -> HoleGuard<'_> {
        loop {
            let hole = rng.next_range(MOLE_HOLES as u32) as usize;
            if let Some(guard) = self.try_claim(hole) {
                return guard;
            }
            std::thread::sleep(std::time::Duration::from_millis(HOLE_CLAIM_BACKOFF_MS));
        }
    }

    /// Whether `hole` is currently claimed. Test/diagnostic helper only; the
    /// answer can be stale by the time the caller looks at it.
    pub fn is_claimed(&self, hole: usize) -> bool {
        assert!(hole < MOLE_HOLES, "hole number ({hole}) out of range");
        matches!(
            self.locks[hole].try_lock(),
            Err(std::sync::TryLockError::WouldBlock)
        )
    }
}
