//! Animation tasks.
//!
//! Each visual effect runs on a dedicated thread and reports progress
//! through its request's sync points. Cancellation is cooperative: every
//! sleep is sliced so a raised cancel flag is noticed within a few
//! milliseconds, and a cancelled effect jumps its counter to the final tick
//! on the way out so nobody waiting on it hangs.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tui_wam_types::{AnimationKind, PlayResult};

use crate::anim::{AnimationRequest, CancelToken};
use crate::ports::Renderer;
use crate::rng::SharedRng;

const NAP_SLICE_MS: u64 = 25;

/// Scare flash frame, shown in place of the mole art.
pub const SCARED_FLASH: &str = "!SCARED!";

/// Sleep for `ms`, waking early if `cancel` is raised. Returns true when
/// the sleep was interrupted.
pub fn nap(cancel: &CancelToken, ms: u64) -> bool {
    let deadline = Instant::now() + Duration::from_millis(ms);
    loop {
        if cancel.is_cancelled() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        let left = deadline.duration_since(now);
        thread::sleep(left.min(Duration::from_millis(NAP_SLICE_MS)));
    }
}

/// Run `request` on its own thread.
pub fn spawn(
    renderer: Arc<dyn Renderer>,
    rng: SharedRng,
    request: AnimationRequest,
) -> JoinHandle<()> {
    thread::spawn(move || run(renderer.as_ref(), &rng, &request))
}

/// Run `request` to completion (or cancellation) on the current thread.
/// The final sync point is guaranteed to be reached either way.
pub fn run(renderer: &dyn Renderer, rng: &SharedRng, request: &AnimationRequest) {
    match request.kind {
        AnimationKind::Hiding => hiding(renderer, rng, request),
        AnimationKind::Popup => popup(renderer, request, false),
        AnimationKind::Splash => popup(renderer, request, true),
        AnimationKind::Whacked => whacked(renderer, request),
        AnimationKind::Escaped => escaped(renderer, request),
        AnimationKind::MisfireScared => misfire_scared(renderer, request),
        AnimationKind::Scared => scared(renderer, request),
    }
    request.progress.force_finish();
}

/// Ears bob out of the hole now and then while the mole hides. Each round
/// is three 200ms steps (the first always up, the other two up with 1/3
/// chance) followed by a random 800-2000ms quiet spell.
fn hiding(renderer: &dyn Renderer, rng: &SharedRng, request: &AnimationRequest) {
    request.progress.advance_to(1);
    let mut remaining = request.duration_ms as i64;
    while remaining > 0 {
        if remaining < 600 {
            nap(&request.cancel, remaining as u64);
            break;
        }
        renderer.show_mole(request.hole, 1);
        if nap(&request.cancel, 200) {
            return;
        }
        for _ in 0..2 {
            let level = if rng.one_in(3) { 1 } else { 0 };
            renderer.show_mole(request.hole, level);
            if nap(&request.cancel, 200) {
                return;
            }
        }
        remaining -= 600;

        renderer.show_mole(request.hole, 0);
        let mut quiet = rng.next_between(800, 2000) as i64;
        if quiet > remaining {
            quiet = remaining;
        }
        if nap(&request.cancel, quiet as u64) {
            return;
        }
        remaining -= quiet;
    }
}

/// The mole rises five levels in 150ms, stays at full height for one fifth
/// of the duration, then sinks one level per fifth. The descent ticks 2..=5
/// feed the timing-bonus stages; the splash variant stops at full height.
fn popup(renderer: &dyn Renderer, request: &AnimationRequest, rise_only: bool) {
    request.progress.advance_to(1);
    for level in 1..=5u8 {
        renderer.show_mole(request.hole, level);
        if nap(&request.cancel, 30) {
            return;
        }
    }
    if rise_only {
        return;
    }

    let level_time = request.duration_ms / 5;
    if nap(&request.cancel, level_time.saturating_sub(150)) {
        return;
    }
    for level in (1..=4u8).rev() {
        renderer.show_mole(request.hole, level);
        request.progress.advance_to(6 - u32::from(level));
        if nap(&request.cancel, level_time) {
            return;
        }
    }
    renderer.show_mole(request.hole, 0);
}

/// Whack art for half a second, then the score panel for the rest.
fn whacked(renderer: &dyn Renderer, request: &AnimationRequest) {
    request.progress.advance_to(1);
    renderer.show_result(request.hole, PlayResult::Whack, 0, 0);
    if nap(&request.cancel, 500) {
        return;
    }
    renderer.show_result(request.hole, PlayResult::Whack, request.score1, request.score2);
    request.progress.advance_to(2);
    if nap(&request.cancel, request.duration_ms.saturating_sub(500)) {
        return;
    }
    renderer.clear_hole(request.hole);
}

/// Brief blank, escape art, then the penalty panel.
fn escaped(renderer: &dyn Renderer, request: &AnimationRequest) {
    request.progress.advance_to(1);
    renderer.clear_hole(request.hole);
    if nap(&request.cancel, 250) {
        return;
    }
    renderer.show_result(request.hole, PlayResult::Escape, 0, 0);
    if nap(&request.cancel, 500) {
        return;
    }
    renderer.show_result(request.hole, PlayResult::Escape, request.score1, request.score2);
    request.progress.advance_to(2);
    if nap(&request.cancel, request.duration_ms.saturating_sub(750)) {
        return;
    }
    renderer.clear_hole(request.hole);
}

/// Misfire hammer on the hole where the mole was hiding, then the scare
/// flashes and the scared-off panel.
fn misfire_scared(renderer: &dyn Renderer, request: &AnimationRequest) {
    request.progress.advance_to(1);
    let duration = request.duration_ms;
    renderer.show_result(request.hole, PlayResult::Misfire, 0, 0);
    if nap(&request.cancel, duration / 4) {
        return;
    }
    if flash_scared(renderer, request, duration / 20) {
        return;
    }
    renderer.show_result(request.hole, PlayResult::ScaredOff, 0, 0);
    if nap(&request.cancel, duration / 4) {
        return;
    }
    renderer.show_text(request.hole, SCARED_FLASH);
    if nap(&request.cancel, duration * 2 / 10) {
        return;
    }
    renderer.clear_hole(request.hole);
}

/// Scare flashes for a mole that was up (or hiding in another hole) when a
/// misfire landed.
fn scared(renderer: &dyn Renderer, request: &AnimationRequest) {
    request.progress.advance_to(1);
    let duration = request.duration_ms;
    if flash_scared(renderer, request, duration / 20) {
        return;
    }
    renderer.show_result(request.hole, PlayResult::ScaredOff, 0, 0);
    if nap(&request.cancel, duration / 2) {
        return;
    }
    renderer.show_text(request.hole, SCARED_FLASH);
    if nap(&request.cancel, duration * 2 / 10) {
        return;
    }
    renderer.clear_hole(request.hole);
}

/// Three alternating flash/blank frames. Returns true on cancellation.
fn flash_scared(renderer: &dyn Renderer, request: &AnimationRequest, frame_ms: u64) -> bool {
    for _ in 0..3 {
        renderer.show_text(request.hole, SCARED_FLASH);
        if nap(&request.cancel, frame_ms) {
            return true;
        }
        renderer.clear_hole(request.hole);
        if nap(&request.cancel, frame_ms) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FrameLog {
        frames: Mutex<Vec<String>>,
    }

    impl FrameLog {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.frames.lock().unwrap())
        }

        fn push(&self, frame: String) {
            self.frames.lock().unwrap().push(frame);
        }
    }

    impl Renderer for FrameLog {
        fn show_mole(&self, hole: usize, level: u8) {
            self.push(format!("mole {hole} {level}"));
        }
        fn show_result(&self, hole: usize, result: PlayResult, score1: i32, score2: i32) {
            self.push(format!("result {hole} {result:?} {score1} {score2}"));
        }
        fn show_text(&self, hole: usize, text: &str) {
            self.push(format!("text {hole} {text}"));
        }
        fn set_score(&self, _score: i32) {}
        fn set_remaining(&self, _remaining: i32) {}
    }

    #[test]
    fn nap_reports_cancellation() {
        let cancel = CancelToken::new();
        assert!(!nap(&cancel, 1));
        cancel.cancel();
        let start = Instant::now();
        assert!(nap(&cancel, 60_000));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn popup_descends_through_all_stages() {
        let log = FrameLog::default();
        let request = AnimationRequest::new(AnimationKind::Popup, 4, 200);
        run(&log, &SharedRng::with_seed(1), &request);
        assert!(request.progress.finished());
        let frames = log.take();
        // Rise 1..=5, descend 4..=1, final blank.
        let expected: Vec<String> = [1, 2, 3, 4, 5, 4, 3, 2, 1, 0]
            .iter()
            .map(|l| format!("mole 4 {l}"))
            .collect();
        assert_eq!(frames, expected);
    }

    #[test]
    fn splash_rises_and_stays_up() {
        let log = FrameLog::default();
        let request = AnimationRequest::new(AnimationKind::Splash, 0, 0);
        run(&log, &SharedRng::with_seed(1), &request);
        assert!(request.progress.finished());
        assert_eq!(log.take().last().unwrap(), "mole 0 5");
    }

    #[test]
    fn whacked_shows_art_then_scores() {
        let log = FrameLog::default();
        let request = AnimationRequest::with_scores(AnimationKind::Whacked, 2, 600, 20, 80);
        run(&log, &SharedRng::with_seed(1), &request);
        let frames = log.take();
        assert_eq!(frames[0], "result 2 Whack 0 0");
        assert_eq!(frames[1], "result 2 Whack 20 80");
        assert_eq!(frames[2], "text 2 ");
        assert!(request.progress.finished());
    }

    #[test]
    fn cancelled_popup_still_reaches_its_final_tick() {
        let log = FrameLog::default();
        let request = AnimationRequest::new(AnimationKind::Popup, 1, 60_000);
        request.cancel.cancel();
        let start = Instant::now();
        run(&log, &SharedRng::with_seed(1), &request);
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(request.progress.finished());
    }

    #[test]
    fn scare_flashes_alternate() {
        let log = FrameLog::default();
        let request = AnimationRequest::new(AnimationKind::Scared, 7, 40);
        run(&log, &SharedRng::with_seed(1), &request);
        let frames = log.take();
        assert_eq!(frames[0], format!("text 7 {SCARED_FLASH}"));
        assert_eq!(frames[1], "text 7 ");
        assert!(frames.contains(&"result 7 ScaredOff 0 0".to_string()));
        assert!(request.progress.finished());
    }
}
