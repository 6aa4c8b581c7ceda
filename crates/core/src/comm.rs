//! Shared slot records and the status/acknowledgment protocol.
//!
//! One mutex guards all three slot records plus the moles-remaining
//! counter. Workers publish status changes through [`GameComm::set_status`],
//! which enforces the lifecycle transition table and blocks until the
//! display coordinator has acknowledged any status that carries a visual
//! effect. Key strikes travel the other way through per-slot condition
//! variables.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Instant;

use tui_wam_types::{MoleStatus, CONCURRENT_MOLES};

use crate::anim::AnimationRequest;
use crate::sync;

/// Everything the engine threads need to know about one worker slot.
#[derive(Debug, Clone, Default)]
pub struct SlotState {
    /// Lifecycle state, written by the worker (and the dispatcher for
    /// scares) under the state lock.
    pub status: MoleStatus,
    /// Last status the display coordinator has acted on. Trails `status`
    /// until the coordinator catches up.
    pub display_ack: MoleStatus,
    /// Mole number this slot is currently running.
    pub mole: u32,
    /// Full cycle time for this mole in milliseconds.
    pub duration_ms: u64,
    /// How long this mole stays up, 30-80% of the cycle time.
    pub up_ms: u64,
    /// Hole the worker has claimed, once it has one.
    pub hole: Option<usize>,
    /// Key the player struck at this slot, consumed by the worker.
    pub key_struck: Option<char>,
    /// Popup sync count captured at the moment of a whack, before the
    /// popup animation is cancelled. Feeds the timing-bonus stage.
    pub struck_tick: u32,
    /// Set by the dispatcher when a misfire scares this mole.
    pub scared: bool,
    /// When this slot's mole was last scared. Survives reset so the pool
    /// controller can observe the reuse cooldown.
    pub scared_at: Option<Instant>,
    /// Ledger index of this mole's scored event, once recorded.
    pub score_idx: Option<usize>,
    /// The animation currently attached to this slot, shared with the
    /// running task through its progress/cancel handles.
    pub anim: Option<AnimationRequest>,
}

impl SlotState {
    /// Clear the record for reuse. `scared_at` is deliberately kept.
    fn reset(&mut self) {
        let scared_at = self.scared_at;
        *self = SlotState::default();
        self.scared_at = scared_at;
    }
}

/// State behind the single coordination mutex.
#[derive(Debug, Default)]
pub struct Shared {
    pub slots: [SlotState; CONCURRENT_MOLES],
    /// Moles not yet resolved. Counts down as moles are whacked, escape,
    /// or are scared off.
    pub moles_remaining: i32,
}

/// The coordination hub shared by workers, the display coordinator, the
/// input dispatcher, and the pool controller.
#[derive(Debug, Default)]
pub struct GameComm {
    state: Mutex<Shared>,
    key_cond: [Condvar; CONCURRENT_MOLES],
    disp_cond: [Condvar; CONCURRENT_MOLES],
}

impl GameComm {
    pub fn new(mole_count: i32) -> Self {
        let comm = Self::default();
        sync::lock(&comm.state, "slot state").moles_remaining = mole_count;
        comm
    }

    /// Take the state lock.
    pub fn lock(&self) -> MutexGuard<'_, Shared> {
        sync::lock(&self.state, "slot state")
    }

    /// Publish a status change for `slot` and, for statuses that carry a
    /// visual effect, block until the display coordinator acknowledges it.
    /// Takes and returns the guard because the wait releases the lock.
    ///
    /// # Panics
    ///
    /// Panics when `new` is not a legal successor of the slot's current
    /// status. The lifecycle is a closed state machine; an illegal step
    /// means slot bookkeeping is corrupt and play cannot continue.
    pub fn set_status<'a>(
        &'a self,
        mut guard: MutexGuard<'a, Shared>,
        slot: usize,
        new: MoleStatus,
    ) -> MutexGuard<'a, Shared> {
        let current = guard.slots[slot].status;
        assert!(
            new.may_follow(current),
            "illegal mole state transition {current:?} -> {new:?} in slot {slot}"
        );
        guard.slots[slot].status = new;
        if new == MoleStatus::Available {
            guard.slots[slot].reset();
            return guard;
        }
        if new.needs_ack() {
            while guard.slots[slot].display_ack != new {
                guard = sync::wait(&self.disp_cond[slot], guard, "display ack");
            }
        }
        guard
    }

    /// Record that the display coordinator has acted on `slot`'s current
    /// status, releasing any worker blocked in [`set_status`].
    pub fn acknowledge(&self, guard: &mut MutexGuard<'_, Shared>, slot: usize) {
        guard.slots[slot].display_ack = guard.slots[slot].status;
        self.disp_cond[slot].notify_all();
    }

    /// Deliver a key strike to `slot` and wake its worker.
    pub fn signal_key(&self, guard: &mut MutexGuard<'_, Shared>, slot: usize, key: char) {
        guard.slots[slot].key_struck = Some(key);
        self.key_cond[slot].notify_all();
    }

    /// Wake `slot`'s worker without delivering a key. Used on misfire
    /// scares so an UP mole stops waiting for a strike that will not come.
    pub fn wake_worker(&self, slot: usize) {
        self.key_cond[slot].notify_all();
    }

    /// Wait until a key is struck at `slot` or `deadline` passes. The
    /// remaining time is recomputed on every wakeup, so spurious wakeups
    /// and scare notifications cannot stretch the deadline.
    pub fn wait_key_until<'a>(
        &'a self,
        mut guard: MutexGuard<'a, Shared>,
        slot: usize,
        deadline: Instant,
    ) -> (MutexGuard<'a, Shared>, bool) {
        loop {
            if guard.slots[slot].key_struck.is_some() || guard.slots[slot].scared {
                return (guard, false);
            }
            let now = Instant::now();
            if now >= deadline {
                return (guard, true);
            }
            let (g, _timed_out) = sync::wait_timeout(
                &self.key_cond[slot],
                guard,
                deadline.duration_since(now),
                "key wait",
            );
            guard = g;
        }
    }

    /// Consistent copy of all slot records and the remaining count.
    pub fn snapshot(&self) -> ([SlotState; CONCURRENT_MOLES], i32) {
        let guard = self.lock();
        (guard.slots.clone(), guard.moles_remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn status_publication_blocks_until_acknowledged() {
        let comm = Arc::new(GameComm::new(10));
        // Walk slot 0 to Assigned first (no ack needed).
        let guard = comm.lock();
        let guard = comm.set_status(guard, 0, MoleStatus::Assigned);
        drop(guard);

        let worker = {
            let comm = Arc::clone(&comm);
            thread::spawn(move || {
                let guard = comm.lock();
                // Blocks until the ack below.
                let guard = comm.set_status(guard, 0, MoleStatus::Hiding);
                assert_eq!(guard.slots[0].display_ack, MoleStatus::Hiding);
            })
        };

        // Let the worker reach the wait, then acknowledge.
        thread::sleep(Duration::from_millis(50));
        let mut guard = comm.lock();
        assert_eq!(guard.slots[0].status, MoleStatus::Hiding);
        comm.acknowledge(&mut guard, 0);
        drop(guard);
        worker.join().unwrap();
    }

    #[test]
    #[should_panic(expected = "illegal mole state transition")]
    fn illegal_transition_is_fatal() {
        let comm = GameComm::new(1);
        let guard = comm.lock();
        // Available -> Up skips Assigned and Hiding.
        drop(comm.set_status(guard, 0, MoleStatus::Up));
    }

    #[test]
    fn reset_on_available_keeps_the_scare_timestamp() {
        let comm = GameComm::new(1);
        let mut guard = comm.lock();
        let when = Instant::now();
        guard.slots[1].scared_at = Some(when);
        guard.slots[1].mole = 7;
        guard.slots[1].key_struck = Some('5');
        // Walk the full lifecycle, pre-acking each rendered status so the
        // single-threaded test never blocks in set_status.
        guard = comm.set_status(guard, 1, MoleStatus::Assigned);
        for status in [
            MoleStatus::Hiding,
            MoleStatus::Up,
            MoleStatus::Whacked,
            MoleStatus::Terminating,
        ] {
            guard.slots[1].display_ack = status; // pre-ack so set_status returns
            guard = comm.set_status(guard, 1, status);
        }
        guard = comm.set_status(guard, 1, MoleStatus::Complete);
        guard = comm.set_status(guard, 1, MoleStatus::Available);
        assert_eq!(guard.slots[1].scared_at, Some(when));
        assert_eq!(guard.slots[1].mole, 0);
        assert_eq!(guard.slots[1].key_struck, None);
    }

    #[test]
    fn key_wait_returns_on_delivery() {
        let comm = Arc::new(GameComm::new(1));
        let waiter = {
            let comm = Arc::clone(&comm);
            thread::spawn(move || {
                let guard = comm.lock();
                let deadline = Instant::now() + Duration::from_secs(10);
                let (guard, timed_out) = comm.wait_key_until(guard, 2, deadline);
                assert!(!timed_out);
                assert_eq!(guard.slots[2].key_struck, Some('9'));
            })
        };
        thread::sleep(Duration::from_millis(50));
        let mut guard = comm.lock();
        comm.signal_key(&mut guard, 2, '9');
        drop(guard);
        waiter.join().unwrap();
    }

    #[test]
    fn key_wait_times_out_at_the_deadline() {
        let comm = GameComm::new(1);
        let guard = comm.lock();
        let deadline = Instant::now() + Duration::from_millis(30);
        let (guard, timed_out) = comm.wait_key_until(guard, 0, deadline);
        assert!(timed_out);
        assert_eq!(guard.slots[0].key_struck, None);
    }

    #[test]
    fn scare_interrupts_the_key_wait() {
        let comm = Arc::new(GameComm::new(1));
        let waiter = {
            let comm = Arc::clone(&comm);
            thread::spawn(move || {
                let guard = comm.lock();
                let deadline = Instant::now() + Duration::from_secs(10);
                let (guard, timed_out) = comm.wait_key_until(guard, 0, deadline);
                assert!(!timed_out);
                assert!(guard.slots[0].scared);
            })
        };
        thread::sleep(Duration::from_millis(50));
        let mut guard = comm.lock();
        guard.slots[0].scared = true;
        drop(guard);
        comm.wake_worker(0);
        waiter.join().unwrap();
    }
}
