//! Input dispatcher: classifies keystrokes against the live slots.
//!
//! A key that matches an UP, acknowledged, animation-in-flight mole is a
//! whack. A key that matches a just-resolved mole (or one whose popup has
//! already run out) is a near miss and is swallowed. Anything else is a
//! misfire: every hiding or up mole is scared, and a hiding mole whose own
//! key was struck turns the misfire into TOO SOON.

use std::sync::Arc;
use std::time::Instant;

use tui_wam_core::types::{MoleStatus, PlayResult, CONCURRENT_MOLES, DISPLAY_POLL_MS};
use tui_wam_core::KeySource;

use crate::GameCtx;

/// Poll `keys` until a stop is requested, feeding mapped keys through
/// [`handle_key`]. Unmapped keys are dropped, and anything buffered
/// behind a read is discarded: only the freshest keystroke matters, so a
/// key mash cannot multiply into a volley of misfires.
pub fn run(ctx: &Arc<GameCtx>, keys: &dyn KeySource) {
    while !ctx.stop_requested() {
        if let Some(key) = keys.next_key(DISPLAY_POLL_MS as i64) {
            if ctx.keys.contains(key) {
                handle_key(ctx, key);
            }
            keys.drain();
        }
    }
}

/// Classify one mapped key and act on it.
pub fn handle_key(ctx: &GameCtx, key: char) {
    let mut guard = ctx.comm.lock();
    let mut handled = false;

    for slot in 0..CONCURRENT_MOLES {
        let (status, ack, hole, key_struck) = {
            let s = &guard.slots[slot];
            (s.status, s.display_ack, s.hole, s.key_struck)
        };
        let Some(hole) = hole else { continue };
        if ctx.keys.key_for(hole) != key {
            continue;
        }
        let in_flight = guard.slots[slot].anim.as_ref().is_some_and(|a| a.in_flight());

        if status == MoleStatus::Up
            && ack == MoleStatus::Up
            && key_struck != Some(key)
            && in_flight
        {
            // A whack. Capture the popup's progress for the timing bonus,
            // then cancel it and wake the worker.
            if let Some(anim) = guard.slots[slot].anim.clone() {
                guard.slots[slot].struck_tick = anim.progress.count();
                anim.cancel.cancel();
            }
            ctx.comm.signal_key(&mut guard, slot, key);
            handled = true;
        } else if matches!(status, MoleStatus::Whacked | MoleStatus::Expired)
            || (status == MoleStatus::Up && !in_flight)
        {
            // Near miss: a just-resolved mole, or a double strike on a
            // popup that already ran out. No score either way.
            handled = true;
        }
    }

    if handled {
        return;
    }

    // Misfire. Scare every hiding or up mole; a hiding mole hit on its own
    // key upgrades the verdict to TOO SOON.
    let mut result = PlayResult::Misfire;
    let now = Instant::now();
    for slot in 0..CONCURRENT_MOLES {
        let hiding_match = guard.slots[slot].status == MoleStatus::Hiding
            && guard.slots[slot].hole.map(|h| ctx.keys.key_for(h)) == Some(key);
        if hiding_match {
            result = PlayResult::TooSoon;
        }
        if matches!(guard.slots[slot].status, MoleStatus::Hiding | MoleStatus::Up) {
            guard.slots[slot].scared = true;
            guard.slots[slot].scared_at = Some(now);
        }
    }
    drop(guard);

    let hole = ctx.keys.hole_for(key).map_or(-1, |h| h as i32);
    ctx.ledger.record(-1, hole, Some(key), 0, result);
}
