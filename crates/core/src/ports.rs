//! Collaborator traits between the engine and its environment.
//!
//! The engine never talks to a terminal directly; it renders through
//! [`Renderer`] and reads keys through [`KeySource`]. Tests substitute
//! recording and scripted implementations.

use tui_wam_types::PlayResult;

/// Drawing surface for the playfield. Implementations serialize their own
/// output; callers may invoke these from any thread.
pub trait Renderer: Send + Sync {
    /// Draw the bottom `level` rows of the mole in `hole` (0 blanks it).
    fn show_mole(&self, hole: usize, level: u8);

    /// Draw the result panel for `hole`: the outcome art followed by the
    /// score panels.
    fn show_result(&self, hole: usize, result: PlayResult, score1: i32, score2: i32);

    /// Draw a raw text panel centered in `hole` (scare flashes, misfire
    /// hammer).
    fn show_text(&self, hole: usize, text: &str);

    /// Blank `hole` entirely.
    fn clear_hole(&self, hole: usize) {
        self.show_text(hole, "");
    }

    /// Update the running score readout.
    fn set_score(&self, score: i32);

    /// Update the moles-remaining readout.
    fn set_remaining(&self, remaining: i32);
}

/// Source of player keystrokes.
pub trait KeySource: Send + Sync {
    /// Next key, waiting at most `max_wait_ms`. Returns `None` on timeout.
    fn next_key(&self, max_wait_ms: i64) -> Option<char>;

    /// Next key, waiting indefinitely.
    fn next_key_blocking(&self) -> char;

    /// Throw away anything already buffered.
    fn drain(&self) {
        while self.next_key(0).is_some() {}
    }
}
