//! Display coordinator.
//!
//! Single thread that owns the mapping from game state to pixels. Each
//! iteration it snapshots the slot records, turns unacknowledged status
//! changes into animation tasks, acknowledges them, replays new ledger
//! events onto the score readout, and maintains the misfire overlays.
//!
//! Acknowledgment ordering is the load-bearing part: the animation request
//! is stored in the slot record before the ack, so by the time a worker
//! returns from publishing a status it can poll the right animation.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tui_wam_core::types::{
    AnimationKind, MoleStatus, PlayResult, CONCURRENT_MOLES, DISPLAY_POLL_MS, MISFIRE_DISPLAY_MS,
    MOLE_HOLES, RESULT_DISPLAY_MS, SCARE_DISPLAY_MS,
};
use tui_wam_core::{task, AnimationRequest, HoleGuard, SlotState};

use crate::GameCtx;

/// Run the coordinator until a stop is requested and no misfire overlay is
/// pending.
pub fn run(ctx: &Arc<GameCtx>) {
    let mut anim_handles: [Option<JoinHandle<()>>; CONCURRENT_MOLES] = Default::default();
    let mut overlay_until: [Option<Instant>; MOLE_HOLES] = [None; MOLE_HOLES];
    let mut overlay_claims: [Option<HoleGuard<'_>>; MOLE_HOLES] = Default::default();
    let mut known_events = 0usize;

    loop {
        let (slots, remaining) = ctx.comm.snapshot();
        ctx.renderer.set_remaining(remaining.max(0));

        for (slot, snap) in slots.iter().enumerate() {
            if snap.display_ack != snap.status {
                handle_status_change(ctx, &mut anim_handles, slot, snap);
            }
        }

        for event in ctx.ledger.events_from(known_events) {
            if matches!(event.result, PlayResult::Misfire | PlayResult::TooSoon) {
                handle_misfire(ctx, event.key);
                if let Ok(hole) = usize::try_from(event.hole) {
                    overlay_until[hole] =
                        Some(Instant::now() + Duration::from_millis(MISFIRE_DISPLAY_MS));
                }
            }
            ctx.renderer.set_score(event.end_score);
            known_events += 1;
        }

        let overlay_pending =
            maintain_overlays(ctx, &mut overlay_until, &mut overlay_claims);

        if ctx.stop_requested() && !overlay_pending {
            break;
        }
        thread::sleep(Duration::from_millis(DISPLAY_POLL_MS));
    }

    for handle in &mut anim_handles {
        if let Some(handle) = handle.take() {
            let _ = handle.join();
        }
    }
}

/// React to one slot's new status: retire the previous animation, start
/// the next one, store its request in the slot, and acknowledge.
fn handle_status_change(
    ctx: &Arc<GameCtx>,
    anim_handles: &mut [Option<JoinHandle<()>>; CONCURRENT_MOLES],
    slot: usize,
    snap: &SlotState,
) {
    let request = match snap.status {
        MoleStatus::Hiding => snap.hole.map(|hole| {
            AnimationRequest::new(
                AnimationKind::Hiding,
                hole,
                snap.duration_ms.saturating_sub(snap.up_ms),
            )
        }),
        MoleStatus::Up => snap.hole.map(|hole| {
            retire_animation(ctx, &mut anim_handles[slot], hole);
            AnimationRequest::new(AnimationKind::Popup, hole, snap.up_ms)
        }),
        MoleStatus::Whacked => snap.hole.map(|hole| {
            retire_animation(ctx, &mut anim_handles[slot], hole);
            let (points, bonus) = snap
                .score_idx
                .and_then(|idx| ctx.ledger.get(idx))
                .map_or((0, 0), |e| (e.whacked_score, e.bonus_score));
            AnimationRequest::with_scores(
                AnimationKind::Whacked,
                hole,
                RESULT_DISPLAY_MS,
                points,
                bonus,
            )
        }),
        MoleStatus::Expired => snap.hole.map(|hole| {
            retire_animation(ctx, &mut anim_handles[slot], hole);
            let penalty = snap
                .score_idx
                .and_then(|idx| ctx.ledger.get(idx))
                .map_or(0, |e| e.missed_score);
            AnimationRequest::with_scores(
                AnimationKind::Escaped,
                hole,
                RESULT_DISPLAY_MS,
                penalty,
                0,
            )
        }),
        MoleStatus::Scared => snap.hole.map(|hole| {
            retire_animation(ctx, &mut anim_handles[slot], hole);
            // A mole scared while hiding gets the misfire hammer on its
            // own hole if that is where the player struck; anything else
            // gets the plain scare flashes.
            let kind = if snap.display_ack == MoleStatus::Hiding
                && snap.key_struck == Some(ctx.keys.key_for(hole))
            {
                AnimationKind::MisfireScared
            } else {
                AnimationKind::Scared
            };
            AnimationRequest::new(kind, hole, SCARE_DISPLAY_MS)
        }),
        MoleStatus::Terminating => {
            if let Some(hole) = snap.hole {
                retire_animation(ctx, &mut anim_handles[slot], hole);
            }
            None
        }
        _ => None,
    };

    let mut guard = ctx.comm.lock();
    if guard.slots[slot].status != snap.status {
        // The slot moved on between snapshot and lock (its previous mole
        // finished and a new one started hiding). Acking the live status
        // here would leave it without an animation; the next pass handles
        // the newer status instead.
        return;
    }
    if let Some(request) = request {
        guard.slots[slot].anim = Some(request.clone());
        anim_handles[slot] = Some(task::spawn(
            Arc::clone(&ctx.renderer),
            ctx.rng.clone(),
            request,
        ));
    } else if snap.status == MoleStatus::Terminating {
        guard.slots[slot].anim = None;
    }
    ctx.comm.acknowledge(&mut guard, slot);
}

/// Join the slot's previous animation task and blank its hole. The task
/// is either finished or cancelled by now, so the join is short.
fn retire_animation(ctx: &GameCtx, handle: &mut Option<JoinHandle<()>>, hole: usize) {
    if let Some(handle) = handle.take() {
        let _ = handle.join();
    }
    ctx.renderer.clear_hole(hole);
}

/// A misfire scares the playfield: cancel every hiding/popup animation in
/// flight and broadcast the struck key so waiting workers wake up and see
/// their scare flags.
fn handle_misfire(ctx: &GameCtx, key: Option<char>) {
    let mut guard = ctx.comm.lock();
    for slot in 0..CONCURRENT_MOLES {
        if let Some(anim) = guard.slots[slot].anim.clone() {
            if matches!(anim.kind, AnimationKind::Hiding | AnimationKind::Popup)
                && anim.in_flight()
            {
                anim.cancel.cancel();
                anim.progress.force_finish();
            }
        }
    }
    if let Some(key) = key {
        for slot in 0..CONCURRENT_MOLES {
            ctx.comm.signal_key(&mut guard, slot, key);
        }
    }
}

/// Claim, draw, and expire the misfire overlays. An overlay only claims a
/// free hole; a misfire on a hiding mole's hole is rendered by that slot's
/// scare animation instead. Returns whether any overlay is still up.
fn maintain_overlays<'a>(
    ctx: &'a GameCtx,
    overlay_until: &mut [Option<Instant>; MOLE_HOLES],
    overlay_claims: &mut [Option<HoleGuard<'a>>; MOLE_HOLES],
) -> bool {
    let now = Instant::now();
    let mut pending = false;
    for hole in 0..MOLE_HOLES {
        let active = overlay_until[hole].is_some_and(|until| until > now);
        if active {
            if overlay_claims[hole].is_none() {
                if let Some(claim) = ctx.holes.try_claim(hole) {
                    ctx.renderer.show_result(hole, PlayResult::Misfire, 0, 0);
                    overlay_claims[hole] = Some(claim);
                }
            }
        } else {
            if overlay_claims[hole].take().is_some() {
                ctx.renderer.clear_hole(hole);
            }
            overlay_until[hole] = None;
        }
        pending |= overlay_claims[hole].is_some();
    }
    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_wam_core::{Renderer, SharedRng};

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn show_mole(&self, _hole: usize, _level: u8) {}
        fn show_result(&self, _hole: usize, _result: PlayResult, _s1: i32, _s2: i32) {}
        fn show_text(&self, _hole: usize, _text: &str) {}
        fn set_score(&self, _score: i32) {}
        fn set_remaining(&self, _remaining: i32) {}
    }

    fn ctx() -> Arc<GameCtx> {
        GameCtx::new(Arc::new(NullRenderer), SharedRng::with_seed(1))
    }

    #[test]
    fn status_change_installs_the_animation_before_acking() {
        let ctx = ctx();
        {
            let mut guard = ctx.comm.lock();
            guard.slots[0].status = MoleStatus::Hiding;
            guard.slots[0].hole = Some(3);
            guard.slots[0].duration_ms = 100;
            guard.slots[0].up_ms = 60;
        }
        let (snaps, _) = ctx.comm.snapshot();
        let mut handles: [Option<JoinHandle<()>>; CONCURRENT_MOLES] = Default::default();
        handle_status_change(&ctx, &mut handles, 0, &snaps[0]);

        let guard = ctx.comm.lock();
        assert_eq!(guard.slots[0].display_ack, MoleStatus::Hiding);
        let anim = guard.slots[0].anim.clone().expect("animation installed");
        assert_eq!(anim.kind, AnimationKind::Hiding);
        drop(guard);

        handles[0].take().unwrap().join().unwrap();
        assert!(anim.progress.finished());
    }

    #[test]
    fn stale_snapshot_is_not_acknowledged() {
        let ctx = ctx();
        // Snapshot caught the slot completing its previous mole.
        let (snaps, _) = ctx.comm.snapshot();
        let mut stale = snaps[0].clone();
        stale.status = MoleStatus::Complete;
        stale.display_ack = MoleStatus::Terminating;

        // By the time the coordinator acts, a new mole is already hiding.
        {
            let mut guard = ctx.comm.lock();
            guard.slots[0].status = MoleStatus::Hiding;
            guard.slots[0].hole = Some(1);
            guard.slots[0].duration_ms = 5000;
            guard.slots[0].up_ms = 2000;
        }
        let mut handles: [Option<JoinHandle<()>>; CONCURRENT_MOLES] = Default::default();
        handle_status_change(&ctx, &mut handles, 0, &stale);

        let guard = ctx.comm.lock();
        assert_eq!(
            guard.slots[0].display_ack,
            MoleStatus::Available,
            "a stale status must not be acknowledged"
        );
        assert!(guard.slots[0].anim.is_none());
        assert!(handles[0].is_none());
    }
}
