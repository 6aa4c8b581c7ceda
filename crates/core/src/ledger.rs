//! Score ledger - append-only record of every scored event.
//!
//! The ledger is the single authority on the player's score. Events are
//! immutable once appended, indices are dense and strictly increasing, and
//! the running total can never go negative: miss penalties are clamped to
//! whatever score is actually available.
//!
//! Scoring rule:
//! - Whack: +20 base, plus a timing bonus keyed to which fifth of the
//!   exposure had elapsed at the strike ({<20%: +25, 60-80%: +20,
//!   80-100%: +80}, nothing in between).
//! - Escape / scared off: a running miss counter increments; the penalty is
//!   -10 x counter, floored at -50, and clamped so the cumulative score
//!   stays >= 0.
//! - Misfire / too soon: recorded, zero score impact.

use std::sync::Mutex;

use tui_wam_types::{
    PlayResult, BONUS_POINTS, BONUS_SLICES, MISSED_MOLE_CAP, MISSED_MOLE_SCORE, WHACKED_MOLE_SCORE,
};

use crate::sync;

/// One scored event. Immutable once appended.
///
/// At most one of the four score components is non-zero for any event, and
/// `start_score` plus all components always equals `end_score`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEvent {
    /// Mole number, or -1 when not applicable (misfires).
    pub mole: i32,
    /// Hole number, or -1 when not applicable.
    pub hole: i32,
    /// Key the player pressed, if any.
    pub key: Option<char>,
    /// Cumulative score before this event.
    pub start_score: i32,
    /// Penalty for an escaped or scared-off mole (non-positive).
    pub missed_score: i32,
    /// Points for whacking the mole.
    pub whacked_score: i32,
    /// Timing bonus for the whack.
    pub bonus_score: i32,
    /// Penalty for a misfire (zero in this version, kept for the sheet).
    pub penalty_score: i32,
    /// Cumulative score after this event.
    pub end_score: i32,
    /// Outcome tag.
    pub result: PlayResult,
}

impl ScoreEvent {
    /// Net score change carried by this event.
    pub fn delta(&self) -> i32 {
        self.missed_score + self.whacked_score + self.bonus_score + self.penalty_score
    }
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<ScoreEvent>,
    missed_count: i32,
}

/// Mutex-guarded growable event log. Lives for the duration of one game.
#[derive(Debug, Default)]
pub struct ScoreLedger {
    inner: Mutex<Inner>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the score for `result` and append the event.
    ///
    /// `bonus_stage` is which fifth of the exposure animation had elapsed
    /// when the mole was struck (0..=4); it is ignored for non-whacks.
    /// Returns the index assigned to the event.
    pub fn record(
        &self,
        mole: i32,
        hole: i32,
        key: Option<char>,
        bonus_stage: usize,
        result: PlayResult,
    ) -> usize {
        let mut inner = sync::lock(&self.inner, "score ledger");
        let start_score = inner.events.last().map_or(0, |e| e.end_score);

        let mut missed_score = 0;
        let mut whacked_score = 0;
        let mut bonus_score = 0;
        let penalty_score = 0; // misfires carry no penalty in this version

        match result {
            PlayResult::Whack => {
                whacked_score = WHACKED_MOLE_SCORE;
                bonus_score = BONUS_POINTS[bonus_stage.min(BONUS_SLICES - 1)];
            }
            PlayResult::Escape | PlayResult::ScaredOff => {
                inner.missed_count += 1;
                missed_score = (inner.missed_count * MISSED_MOLE_SCORE).max(MISSED_MOLE_CAP);
                if -missed_score > start_score {
                    missed_score = -start_score;
                }
            }
            PlayResult::Misfire | PlayResult::TooSoon => {}
        }

        let event = ScoreEvent {
            mole,
            hole,
            key,
            start_score,
            missed_score,
            whacked_score,
            bonus_score,
            penalty_score,
            end_score: start_score + missed_score + whacked_score + bonus_score + penalty_score,
            result,
        };
        inner.events.push(event);
        inner.events.len() - 1
    }

    /// Number of events appended so far.
    pub fn len(&self) -> usize {
        sync::lock(&self.inner, "score ledger").events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the event at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<ScoreEvent> {
        sync::lock(&self.inner, "score ledger")
            .events
            .get(index)
            .cloned()
    }

    /// Copies of all events appended at or after `index`, in order.
    pub fn events_from(&self, index: usize) -> Vec<ScoreEvent> {
        let inner = sync::lock(&self.inner, "score ledger");
        inner.events.get(index..).unwrap_or(&[]).to_vec()
    }

    /// Current cumulative score.
    pub fn current_score(&self) -> i32 {
        sync::lock(&self.inner, "score ledger")
            .events
            .last()
            .map_or(0, |e| e.end_score)
    }

    /// Copy of the full event log, for the score sheet.
    pub fn snapshot(&self) -> Vec<ScoreEvent> {
        sync::lock(&self.inner, "score ledger").events.clone()
    }
}
