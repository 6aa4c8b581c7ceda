//! Mole worker: one thread, one mole, one trip through the lifecycle.
//!
//! The worker claims a hole, splits its cycle time into hiding and up
//! phases, publishes each phase through the slot record, and waits on the
//! animations the display coordinator attaches in response. It ends by
//! releasing the hole and walking the slot to COMPLETE so the pool
//! controller can join it.

use std::thread;
use std::time::{Duration, Instant};

use tui_wam_core::types::{
    MoleStatus, PlayResult, GRACE_PERIOD_MS, MOLE_START_DELAY_MAX_MS, MOLE_START_DELAY_MIN_MS,
    SYNC_POLL_MS,
};

use crate::GameCtx;

/// Run one mole to completion in the calling thread. `slot` must already
/// be ASSIGNED with its mole number and cycle time filled in.
pub fn run(ctx: &GameCtx, slot: usize) {
    let (mole, duration_ms) = {
        let guard = ctx.comm.lock();
        (guard.slots[slot].mole, guard.slots[slot].duration_ms)
    };

    // Stagger starts so the pool does not pop all at once. The first mole
    // starts quickly so the game never looks hung.
    let startle = if mole == 1 {
        MOLE_START_DELAY_MIN_MS
    } else {
        ctx.rng
            .next_between(MOLE_START_DELAY_MIN_MS, MOLE_START_DELAY_MAX_MS)
    };
    thread::sleep(Duration::from_millis(startle));

    let hole_claim = ctx.holes.claim_random(&ctx.rng);
    let hole = hole_claim.hole();

    // Up for 30-80% of the cycle, hiding for the rest.
    let up_ms = (ctx.rng.next_range(5000) as u64 + 3000) * duration_ms / 10_000;

    let mut guard = ctx.comm.lock();
    guard.slots[slot].hole = Some(hole);
    guard.slots[slot].up_ms = up_ms;
    let guard = ctx.comm.set_status(guard, slot, MoleStatus::Hiding);
    drop(guard);

    wait_animation_finished(ctx, slot);

    let scared_while_hiding = ctx.comm.lock().slots[slot].scared;
    if scared_while_hiding {
        let mut guard = ctx.comm.lock();
        guard.moles_remaining -= 1;
        let idx = ctx
            .ledger
            .record(mole as i32, hole as i32, None, 0, PlayResult::ScaredOff);
        guard.slots[slot].score_idx = Some(idx);
        let guard = ctx.comm.set_status(guard, slot, MoleStatus::Scared);
        drop(guard);
        wait_animation_finished(ctx, slot);
    } else {
        let deadline = Instant::now() + Duration::from_millis(up_ms);
        let mut guard = ctx.comm.lock();
        guard.slots[slot].key_struck = None;
        let guard = ctx.comm.set_status(guard, slot, MoleStatus::Up);
        let (mut guard, timed_out) = ctx.comm.wait_key_until(guard, slot, deadline);
        guard.moles_remaining -= 1;

        if timed_out {
            let idx = ctx
                .ledger
                .record(mole as i32, hole as i32, None, 0, PlayResult::Escape);
            guard.slots[slot].score_idx = Some(idx);
            let guard = ctx.comm.set_status(guard, slot, MoleStatus::Expired);
            drop(guard);
            // Debounce: double strikes on a just-expired mole are common.
            thread::sleep(Duration::from_millis(GRACE_PERIOD_MS));
        } else {
            let own_key = ctx.keys.key_for(hole);
            let whacked =
                guard.slots[slot].key_struck == Some(own_key) && !guard.slots[slot].scared;
            if whacked {
                // Which fifth of the exposure the strike landed in comes
                // from the popup sync count the dispatcher captured before
                // cancelling the animation.
                let stage = guard.slots[slot].struck_tick.saturating_sub(1) as usize;
                let idx =
                    ctx.ledger
                        .record(mole as i32, hole as i32, Some(own_key), stage, PlayResult::Whack);
                guard.slots[slot].score_idx = Some(idx);
                let guard = ctx.comm.set_status(guard, slot, MoleStatus::Whacked);
                drop(guard);
                thread::sleep(Duration::from_millis(GRACE_PERIOD_MS));
            } else {
                // Woken by a misfire broadcast rather than our own key.
                let idx =
                    ctx.ledger
                        .record(mole as i32, hole as i32, None, 0, PlayResult::ScaredOff);
                guard.slots[slot].score_idx = Some(idx);
                let guard = ctx.comm.set_status(guard, slot, MoleStatus::Scared);
                drop(guard);
            }
        }
        wait_animation_finished(ctx, slot);
    }

    drop(hole_claim);

    let guard = ctx.comm.lock();
    let guard = ctx.comm.set_status(guard, slot, MoleStatus::Terminating);
    let guard = ctx.comm.set_status(guard, slot, MoleStatus::Complete);
    drop(guard);
}

/// Poll until the animation attached to `slot` reaches its final sync
/// point. Status acknowledgment guarantees the coordinator installed the
/// animation before the worker gets here, so the poll observes the right
/// one.
fn wait_animation_finished(ctx: &GameCtx, slot: usize) {
    loop {
        {
            let guard = ctx.comm.lock();
            if guard.slots[slot]
                .anim
                .as_ref()
                .is_some_and(|a| a.progress.finished())
            {
                return;
            }
        }
        thread::sleep(Duration::from_millis(SYNC_POLL_MS));
    }
}
