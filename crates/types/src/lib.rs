//! Shared types module - constants, enums, and the hole/key layout
//!
//! This crate defines the fundamental types used throughout the game.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (engine threads, rendering, tests).
//!
//! # Playfield
//!
//! The playfield is a fixed 3x3 grid of nine holes. Up to three moles are
//! live at the same time, each driven by its own worker thread.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_CYCLE_MS` | 1000 | Lower clamp on a mole's full cycle time |
//! | `MAX_CYCLE_MS` | 15000 | Upper clamp on a mole's full cycle time |
//! | `GRACE_PERIOD_MS` | 500 | Debounce window after a whack or escape |
//! | `SCARED_COOLDOWN_MS` | 2000 | Slot reuse delay after a scare |
//! | `MISFIRE_DISPLAY_MS` | 1500 | How long the misfire overlay owns a hole |
//!
//! # Scoring
//!
//! A whacked mole earns `WHACKED_MOLE_SCORE` plus a timing bonus keyed to
//! which fifth of the exposure had elapsed at the strike (`BONUS_POINTS`).
//! Escaped and scared-off moles cost an escalating penalty that is capped
//! at `MISSED_MOLE_CAP` and can never drive the running score negative.

/// Number of holes on the playfield (fixed 3x3 grid).
pub const MOLE_HOLES: usize = 9;

/// Size of the worker pool: how many moles are live at once.
pub const CONCURRENT_MOLES: usize = 3;

/// Upper clamp on the number of moles in one game.
pub const MAX_MOLE_COUNT: u32 = 100;

/// Lower clamp on a mole's full cycle time (hiding + up) in milliseconds.
pub const MIN_CYCLE_MS: u64 = 1000;

/// Upper clamp on a mole's full cycle time in milliseconds.
pub const MAX_CYCLE_MS: u64 = 15_000;

/// Debounce window applied after a whack or escape, so a double strike on a
/// just-resolved mole is not treated as a misfire.
pub const GRACE_PERIOD_MS: u64 = 500;

/// How long a slot stays out of rotation after its mole was scared off.
pub const SCARED_COOLDOWN_MS: u64 = 2000;

/// How long the misfire overlay is shown (and its hole kept claimed).
pub const MISFIRE_DISPLAY_MS: u64 = 1500;

/// Duration of the whacked/escaped result animations.
pub const RESULT_DISPLAY_MS: u64 = 1500;

/// Duration of the scare animations.
pub const SCARE_DISPLAY_MS: u64 = 2000;

/// Minimum startle delay before a mole claims a hole. The very first mole
/// uses exactly this value so the game does not appear to hang at start.
pub const MOLE_START_DELAY_MIN_MS: u64 = 250;

/// Maximum startle delay before a mole claims a hole.
pub const MOLE_START_DELAY_MAX_MS: u64 = 3000;

/// Backoff between non-blocking hole claim attempts.
pub const HOLE_CLAIM_BACKOFF_MS: u64 = 10;

/// Sleep between display coordinator iterations.
pub const DISPLAY_POLL_MS: u64 = 10;

/// Sleep between full pool-controller scans.
pub const POOL_SCAN_SLEEP_MS: u64 = 100;

/// Sleep between sync-point polls while a worker waits on an animation.
pub const SYNC_POLL_MS: u64 = 1;

/// Points for a successfully whacked mole.
pub const WHACKED_MOLE_SCORE: i32 = 20;

/// Base penalty per escaped mole; multiplied by the running miss count.
pub const MISSED_MOLE_SCORE: i32 = -10;

/// Most negative a single miss penalty can get.
pub const MISSED_MOLE_CAP: i32 = -50;

/// Number of exposure fifths the timing bonus is keyed to.
pub const BONUS_SLICES: usize = 5;

/// Timing bonus per exposure fifth: lightning reflexes up front, nerves of
/// steel at the end, nothing in the middle.
pub const BONUS_POINTS: [i32; BONUS_SLICES] = [25, 0, 0, 20, 80];

/// Scores rendered inside a hole must fit the 8-character art panels.
pub const SCORE_ART_MIN: i32 = -99;

/// See [`SCORE_ART_MIN`].
pub const SCORE_ART_MAX: i32 = 99;

/// Lifecycle state of one worker slot.
///
/// Legal transitions (anything else is a fatal invariant breach):
///
/// ```text
/// AVAILABLE -> ASSIGNED -> HIDING -> UP -> {WHACKED | EXPIRED}
/// HIDING | UP -> SCARED
/// {WHACKED | EXPIRED | SCARED} -> TERMINATING -> COMPLETE -> AVAILABLE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoleStatus {
    /// Slot may be assigned to a new mole.
    #[default]
    Available,
    /// Assigned by the pool controller; worker not yet running the cycle.
    Assigned,
    /// Worker owns a hole; mole has not popped up yet.
    Hiding,
    /// Mole is up, waiting for its key.
    Up,
    /// Mole was struck in time.
    Whacked,
    /// Mole timed out, but its key is not yet considered a misfire.
    Expired,
    /// Mole was scared away by a misfire.
    Scared,
    /// Worker performing final scorekeeping and cleanup.
    Terminating,
    /// Worker is done and may be joined.
    Complete,
}

impl MoleStatus {
    /// Whether `self` is a legal successor of `prev`.
    pub fn may_follow(self, prev: MoleStatus) -> bool {
        use MoleStatus::*;
        match self {
            Available => prev == Complete,
            Assigned => prev == Available,
            Hiding => prev == Assigned,
            Up => prev == Hiding,
            Whacked | Expired => prev == Up,
            Scared => prev == Hiding || prev == Up,
            Terminating => matches!(prev, Whacked | Expired | Scared),
            Complete => prev == Terminating,
        }
    }

    /// Whether a worker must block until the display coordinator has
    /// acknowledged this status before proceeding.
    ///
    /// `Scared` is acknowledged too; see DESIGN.md for the rationale behind
    /// making it symmetric with its sibling transitions.
    pub fn needs_ack(self) -> bool {
        use MoleStatus::*;
        matches!(self, Hiding | Up | Whacked | Expired | Scared | Terminating)
    }
}

/// Outcome of one scored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayResult {
    /// Mole hit successfully.
    Whack,
    /// Mole missed.
    Escape,
    /// Key hit when no mole was up in that hole.
    Misfire,
    /// Key hit while the mole in that hole was still hiding.
    TooSoon,
    /// Mole scared off by a misfire.
    ScaredOff,
}

impl PlayResult {
    /// Human-readable label used by the score sheet.
    pub fn label(self) -> &'static str {
        match self {
            PlayResult::Whack => "Whacked Mole!",
            PlayResult::Escape => "Mole Escaped",
            PlayResult::Misfire => "Bad Aim",
            PlayResult::TooSoon => "Hit Too Soon",
            PlayResult::ScaredOff => "Mole Scared Away",
        }
    }
}

/// Which visual effect an animation task renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Mole hiding in its hole; ears bob up and down occasionally.
    Hiding,
    /// Mole pops up quickly, then sinks level by level until it escapes.
    Popup,
    /// Whack panel followed by the score/bonus panel.
    Whacked,
    /// "Poof" panel followed by the penalty panel.
    Escaped,
    /// Misfire hammer on the hole of a hiding mole, then the scare flashes.
    MisfireScared,
    /// Scare flashes on a mole that was up (or hiding elsewhere).
    Scared,
    /// Pop-up-and-stay, used by the splash screen.
    Splash,
}

impl AnimationKind {
    /// Number of sync points this effect reports. The first tick means
    /// "started", the last means "finished".
    pub fn sync_points(self) -> u32 {
        match self {
            AnimationKind::Hiding => 2,
            AnimationKind::Popup => 6,
            AnimationKind::Whacked => 3,
            AnimationKind::Escaped => 3,
            AnimationKind::MisfireScared => 2,
            AnimationKind::Scared => 2,
            AnimationKind::Splash => 2,
        }
    }
}

/// Game modes. Only the fixed-count mode is implemented; selecting the
/// timed mode is a fatal unsupported-configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Fixed number of moles.
    Base,
    /// Unlimited moles in a fixed amount of time. Unimplemented.
    Timed,
}

/// Key assignment for the nine holes.
///
/// The default layout mirrors the numpad onto the 3x3 playfield, so hole 0
/// (top-left) is `7` and hole 8 (bottom-right) is `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleKeys {
    keys: [char; MOLE_HOLES],
}

impl Default for HoleKeys {
    fn default() -> Self {
        Self {
            keys: ['7', '8', '9', '4', '5', '6', '1', '2', '3'],
        }
    }
}

impl HoleKeys {
    /// The key assigned to `hole`.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range hole index; that is a programming error.
    pub fn key_for(&self, hole: usize) -> char {
        assert!(hole < MOLE_HOLES, "hole number ({hole}) out of range");
        self.keys[hole]
    }

    /// The hole mapped to `key`, if any.
    pub fn hole_for(&self, key: char) -> Option<usize> {
        self.keys.iter().position(|&k| k == key)
    }

    /// Whether `key` maps to any hole.
    pub fn contains(&self, key: char) -> bool {
        self.hole_for(key).is_some()
    }
}
