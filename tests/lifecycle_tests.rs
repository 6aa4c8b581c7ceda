//! End-to-end engine runs with a recording renderer and scripted players.
//!
//! These tests spin up the real thread ensemble (display coordinator,
//! input dispatcher, pool controller, mole workers) against short cycle
//! times and check the ledger and slot bookkeeping afterwards.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tui_wam::core::types::{MoleStatus, PlayResult, MOLE_HOLES, SCARED_COOLDOWN_MS};
use tui_wam::core::{KeySource, Renderer, SharedRng};
use tui_wam::engine::{control, dispatch, display, GameCtx};

/// Renderer that keeps the readout values instead of drawing them.
#[derive(Default)]
struct RecordingRenderer {
    scores: Mutex<Vec<i32>>,
    remaining: AtomicI32,
}

impl RecordingRenderer {
    fn last_score(&self) -> Option<i32> {
        self.scores.lock().unwrap().last().copied()
    }
}

impl Renderer for RecordingRenderer {
    fn show_mole(&self, _hole: usize, _level: u8) {}
    fn show_result(&self, _hole: usize, _result: PlayResult, _s1: i32, _s2: i32) {}
    fn show_text(&self, _hole: usize, _text: &str) {}
    fn set_score(&self, score: i32) {
        self.scores.lock().unwrap().push(score);
    }
    fn set_remaining(&self, remaining: i32) {
        self.remaining.store(remaining, Ordering::Relaxed);
    }
}

/// Player that whacks every mole early in its popup and never misfires.
///
/// Only strikes while the popup is in its first couple of sync stages, so
/// the key always lands well before the exposure deadline.
struct AutoPlayer {
    ctx: Arc<GameCtx>,
}

impl KeySource for AutoPlayer {
    fn next_key(&self, max_wait_ms: i64) -> Option<char> {
        let (slots, _) = self.ctx.comm.snapshot();
        for slot in &slots {
            if slot.status != MoleStatus::Up
                || slot.display_ack != MoleStatus::Up
                || slot.key_struck.is_some()
                || slot.scared
            {
                continue;
            }
            if let (Some(hole), Some(anim)) = (slot.hole, slot.anim.as_ref()) {
                if anim.in_flight() && anim.progress.count() <= 2 {
                    return Some(self.ctx.keys.key_for(hole));
                }
            }
        }
        if max_wait_ms > 0 {
            thread::sleep(Duration::from_millis((max_wait_ms as u64).min(5)));
        }
        None
    }

    fn next_key_blocking(&self) -> char {
        loop {
            if let Some(key) = self.next_key(10) {
                return key;
            }
        }
    }
}

/// Player that never touches the keyboard.
struct NeverKeys;

impl KeySource for NeverKeys {
    fn next_key(&self, max_wait_ms: i64) -> Option<char> {
        if max_wait_ms > 0 {
            thread::sleep(Duration::from_millis(max_wait_ms as u64));
        }
        None
    }

    fn next_key_blocking(&self) -> char {
        unreachable!("no keys in this run")
    }
}

/// Start the display coordinator and input dispatcher; returns once both
/// are live, mirroring the binary's startup handshake.
fn spawn_engine<K: KeySource + 'static>(
    ctx: &Arc<GameCtx>,
    keys: K,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let barrier = Arc::new(Barrier::new(3));
    let display_thread = {
        let ctx = Arc::clone(ctx);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            display::run(&ctx);
        })
    };
    let input_thread = {
        let ctx = Arc::clone(ctx);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            dispatch::run(&ctx, &keys);
        })
    };
    barrier.wait();
    (display_thread, input_thread)
}

fn assert_engine_drained(ctx: &GameCtx) {
    let (slots, remaining) = ctx.comm.snapshot();
    assert_eq!(remaining, 0, "every mole must be resolved");
    for slot in &slots {
        assert_eq!(slot.status, MoleStatus::Available);
    }
    for hole in 0..MOLE_HOLES {
        assert!(!ctx.holes.is_claimed(hole), "hole {hole} still claimed");
    }
}

#[test]
fn sharp_player_whacks_every_mole() {
    let renderer = Arc::new(RecordingRenderer::default());
    let ctx = GameCtx::new(
        Arc::clone(&renderer) as Arc<dyn Renderer>,
        SharedRng::from_entropy(),
    );
    let player = AutoPlayer {
        ctx: Arc::clone(&ctx),
    };
    let (display_thread, input_thread) = spawn_engine(&ctx, player);

    control::run(&ctx, 4, 1000);
    ctx.request_stop();
    input_thread.join().unwrap();
    display_thread.join().unwrap();

    let events = ctx.ledger.snapshot();
    assert_eq!(events.len(), 4);
    let mut moles = Vec::new();
    for event in &events {
        assert_eq!(event.result, PlayResult::Whack, "unexpected {event:?}");
        assert_eq!(event.whacked_score, 20);
        assert!(event.key.is_some());
        moles.push(event.mole);
    }
    moles.sort_unstable();
    assert_eq!(moles, vec![1, 2, 3, 4], "each mole scores exactly once");

    let total: i32 = events.iter().map(|e| e.delta()).sum();
    assert_eq!(ctx.ledger.current_score(), total);
    // The score readout ends on the final total.
    assert_eq!(renderer.last_score(), Some(total));

    assert_engine_drained(&ctx);
}

#[test]
fn idle_player_lets_every_mole_escape() {
    let renderer = Arc::new(RecordingRenderer::default());
    let ctx = GameCtx::new(
        Arc::clone(&renderer) as Arc<dyn Renderer>,
        SharedRng::from_entropy(),
    );
    let (display_thread, input_thread) = spawn_engine(&ctx, NeverKeys);

    control::run(&ctx, 3, 1000);
    ctx.request_stop();
    input_thread.join().unwrap();
    display_thread.join().unwrap();

    let events = ctx.ledger.snapshot();
    assert_eq!(events.len(), 3);
    for (idx, event) in events.iter().enumerate() {
        assert_eq!(event.result, PlayResult::Escape, "unexpected {event:?}");
        assert_eq!(event.key, None);
        // With nothing on the board, penalties clamp to zero.
        assert_eq!(event.missed_score, 0);
        assert_eq!(event.end_score, 0);
        assert_eq!(ctx.ledger.get(idx).unwrap(), *event);
    }
    assert_eq!(ctx.ledger.current_score(), 0);
    assert_eq!(renderer.remaining.load(Ordering::Relaxed), 0);

    assert_engine_drained(&ctx);
}

#[test]
fn scared_slots_sit_out_the_cooldown_before_reuse() {
    let renderer = Arc::new(RecordingRenderer::default());
    let ctx = GameCtx::new(
        Arc::clone(&renderer) as Arc<dyn Renderer>,
        SharedRng::from_entropy(),
    );

    // Every slot was just scared; the controller must not touch any of
    // them until the cooldown has fully elapsed.
    let scare_time = Instant::now();
    {
        let mut guard = ctx.comm.lock();
        for slot in guard.slots.iter_mut() {
            slot.scared_at = Some(scare_time);
        }
    }

    let (display_thread, input_thread) = spawn_engine(&ctx, NeverKeys);
    let controller = {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || control::run(&ctx, 1, 1000))
    };

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let (slots, _) = ctx.comm.snapshot();
        if slots.iter().any(|s| s.status != MoleStatus::Available) {
            break;
        }
        assert!(Instant::now() < deadline, "mole was never assigned");
        thread::sleep(Duration::from_millis(5));
    }
    assert!(
        scare_time.elapsed() >= Duration::from_millis(SCARED_COOLDOWN_MS),
        "slot reused {}ms after a scare",
        scare_time.elapsed().as_millis()
    );

    controller.join().unwrap();
    ctx.request_stop();
    input_thread.join().unwrap();
    display_thread.join().unwrap();
    assert_engine_drained(&ctx);
}

#[test]
fn striking_a_hiding_moles_key_is_too_soon_and_scares_it_off() {
    let renderer = Arc::new(RecordingRenderer::default());
    let ctx = GameCtx::new(
        Arc::clone(&renderer) as Arc<dyn Renderer>,
        SharedRng::from_entropy(),
    );
    let (display_thread, input_thread) = spawn_engine(&ctx, NeverKeys);

    let controller = {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || control::run(&ctx, 1, 3000))
    };

    // Wait for the mole to claim its hole and start hiding, then strike
    // that hole's key while it is still underground.
    let deadline = Instant::now() + Duration::from_secs(5);
    let hole = loop {
        let (slots, _) = ctx.comm.snapshot();
        if slots[0].status == MoleStatus::Hiding {
            break slots[0].hole.expect("hiding mole has a hole");
        }
        assert!(Instant::now() < deadline, "mole never started hiding");
        thread::sleep(Duration::from_millis(5));
    };
    dispatch::handle_key(&ctx, ctx.keys.key_for(hole));

    controller.join().unwrap();
    ctx.request_stop();
    input_thread.join().unwrap();
    display_thread.join().unwrap();

    let events = ctx.ledger.snapshot();
    assert_eq!(events.len(), 2, "verdict then scared-off: {events:?}");
    assert_eq!(events[0].result, PlayResult::TooSoon);
    assert_eq!(events[0].mole, -1);
    assert_eq!(events[0].hole, hole as i32);
    assert_eq!(events[0].key, Some(ctx.keys.key_for(hole)));
    assert_eq!(events[1].result, PlayResult::ScaredOff);
    assert_eq!(events[1].mole, 1);

    // The scare timestamp survives the slot reset for the reuse cooldown.
    let (slots, _) = ctx.comm.snapshot();
    assert!(slots[0].scared_at.is_some());

    assert_engine_drained(&ctx);
}
