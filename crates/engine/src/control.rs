//! Pool controller: feeds moles through the fixed worker slots.
//!
//! Round-robins over the slots, assigning the next mole to any AVAILABLE
//! slot and joining any COMPLETE one, until the requested number of moles
//! has been resolved. A slot whose last mole was scared off sits out the
//! scare cooldown before it is touched again.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tui_wam_core::types::{
    MoleStatus, CONCURRENT_MOLES, MAX_CYCLE_MS, MAX_MOLE_COUNT, MIN_CYCLE_MS, POOL_SCAN_SLEEP_MS,
    SCARED_COOLDOWN_MS,
};

use crate::{mole, GameCtx};

/// Run `count` moles with the given cycle time, returning when the last
/// worker has been joined. Arguments are clamped to sane ranges.
///
/// A worker panic (a broken lifecycle invariant) is resumed on this
/// thread so the game dies loudly instead of hanging on a dead slot.
pub fn run(ctx: &Arc<GameCtx>, count: u32, cycle_ms: u64) {
    let count = count.clamp(1, MAX_MOLE_COUNT);
    let cycle_ms = cycle_ms.clamp(MIN_CYCLE_MS, MAX_CYCLE_MS);

    ctx.comm.lock().moles_remaining = count as i32;

    let mut workers: [Option<JoinHandle<()>>; CONCURRENT_MOLES] = Default::default();
    let mut started = 0u32;
    let mut completed = 0u32;
    let mut slot = 0usize;

    while completed < count {
        let guard = ctx.comm.lock();
        let status = guard.slots[slot].status;
        let cooled = guard.slots[slot]
            .scared_at
            .is_none_or(|at| at.elapsed() >= Duration::from_millis(SCARED_COOLDOWN_MS));

        if cooled && status == MoleStatus::Available && started < count {
            let mut guard = guard;
            guard.slots[slot].mole = started + 1;
            guard.slots[slot].duration_ms = cycle_ms;
            let guard = ctx.comm.set_status(guard, slot, MoleStatus::Assigned);
            drop(guard);

            let worker_ctx = Arc::clone(ctx);
            workers[slot] = Some(thread::spawn(move || mole::run(&worker_ctx, slot)));
            started += 1;
        } else if cooled && status == MoleStatus::Complete {
            drop(guard);
            if let Some(handle) = workers[slot].take() {
                if let Err(panic) = handle.join() {
                    std::panic::resume_unwind(panic);
                }
            }
            let guard = ctx.comm.lock();
            let guard = ctx.comm.set_status(guard, slot, MoleStatus::Available);
            drop(guard);
            completed += 1;
        } else {
            drop(guard);
        }

        slot += 1;
        if slot == CONCURRENT_MOLES {
            slot = 0;
            thread::sleep(Duration::from_millis(POOL_SCAN_SLEEP_MS));
        }
    }
}
