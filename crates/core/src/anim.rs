//! Animation requests, sync points, and cancellation tokens.
//!
//! Every visual effect runs on its own short-lived task. The parties that
//! care about its progress (the worker that owns the slot, the input
//! dispatcher, the display coordinator) observe it through two lock-free
//! handles: a monotonic sync-point counter and a one-shot cancel flag.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tui_wam_types::AnimationKind;

/// Monotonic progress counter for one animation.
///
/// An effect with `total` sync points ticks 1..=total as it passes its
/// internal milestones; the first tick means the effect has started drawing
/// and the last that it has finished (or was forced finished). The counter
/// only ever moves forward.
#[derive(Debug, Clone)]
pub struct SyncPoints {
    count: Arc<AtomicU32>,
    total: u32,
}

impl SyncPoints {
    pub fn new(total: u32) -> Self {
        Self {
            count: Arc::new(AtomicU32::new(0)),
            total,
        }
    }

    /// Current tick count.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whether the effect has started drawing.
    pub fn started(&self) -> bool {
        self.count() >= 1
    }

    /// Whether the effect has passed its final sync point.
    pub fn finished(&self) -> bool {
        self.count() >= self.total
    }

    /// Move the counter forward to `tick`. Ticks are monotonic, so a racing
    /// `force_finish` can never be undone by a late-arriving earlier tick.
    pub fn advance_to(&self, tick: u32) {
        self.count.fetch_max(tick, Ordering::AcqRel);
    }

    /// Jump straight to the final tick, releasing anyone polling for
    /// completion. Used when an effect is cancelled mid-flight.
    pub fn force_finish(&self) {
        self.advance_to(self.total);
    }
}

/// One-shot cancellation flag shared between an animation task and whoever
/// may need to stop it (the dispatcher on a whack, the coordinator on a
/// misfire scare).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns true only for the first caller, so exactly
    /// one party wins the right to act on the cancellation.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Everything an animation task needs: what to draw, where, for how long,
/// plus the shared progress and cancellation handles.
///
/// Cloning shares the handles, so a stored copy of the request observes the
/// same progress as the running task.
#[derive(Debug, Clone)]
pub struct AnimationRequest {
    pub kind: AnimationKind,
    pub hole: usize,
    pub duration_ms: u64,
    /// First score panel value (whack points or miss penalty).
    pub score1: i32,
    /// Second score panel value (timing bonus).
    pub score2: i32,
    pub progress: SyncPoints,
    pub cancel: CancelToken,
}

impl AnimationRequest {
    pub fn new(kind: AnimationKind, hole: usize, duration_ms: u64) -> Self {
        Self {
            kind,
            hole,
            duration_ms,
            score1: 0,
            score2: 0,
            progress: SyncPoints::new(kind.sync_points()),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_scores(
        kind: AnimationKind,
        hole: usize,
        duration_ms: u64,
        score1: i32,
        score2: i32,
    ) -> Self {
        Self {
            score1,
            score2,
            ..Self::new(kind, hole, duration_ms)
        }
    }

    /// Whether the effect is past its first sync point, not past its last,
    /// and not cancelled. This is the window in which a key strike on the
    /// mole counts.
    pub fn in_flight(&self) -> bool {
        self.progress.started() && !self.progress.finished() && !self.cancel.is_cancelled()
    }
}
