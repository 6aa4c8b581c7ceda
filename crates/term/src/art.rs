//! Ascii art frames and hole screen geometry.
//!
//! Every hole panel is 8 columns wide and up to 5 rows tall. The playfield
//! is a 3x3 grid of holes; each grid row occupies 7 screen rows.

use tui_wam_core::types::MOLE_HOLES;

/// Width of every art panel, in columns.
pub const PANEL_WIDTH: usize = 8;

/// A blank panel row.
pub const BLANK_ROW: &str = "        ";

/// The mole, top to bottom. Level n shows the top n rows, bottom-aligned
/// in the hole.
pub const MOLE: [&str; 5] = [
    " ^=--=^ ",
    " | oO | ",
    " (\"||\") ",
    " / \\/ \\ ",
    "(((  )))",
];

pub const WHACK: [&str; 5] = [
    " *   *  ",
    "  * *   ",
    "*WHACK!*",
    "  * *   ",
    " *   *  ",
];

pub const ESCAPE: [&str; 5] = [
    "  .  .  ",
    " . .. . ",
    "  poof  ",
    " . .. . ",
    "  .  .  ",
];

pub const MISFIRE: [&str; 5] = [
    " \\\\  // ",
    "  \\\\//  ",
    "   //   ",
    "  //\\\\  ",
    " //  \\\\ ",
];

pub const SCARED: [&str; 5] = [
    " ^\\^^/^ ",
    " |(OO)| ",
    " ( __ ) ",
    " /    \\ ",
    "'''  '''",
];

/// Screen column of the left edge of `hole`'s panel.
pub fn hole_left(hole: usize) -> u16 {
    assert!(hole < MOLE_HOLES, "hole number ({hole}) out of range");
    4 + 14 * (hole % 3) as u16
}

/// Screen row of the top of a mole drawn at `level` (1..=5) in `hole`.
pub fn mole_top(hole: usize, level: u8) -> u16 {
    assert!(hole < MOLE_HOLES, "hole number ({hole}) out of range");
    assert!((1..=5).contains(&level), "mole level ({level}) out of range");
    7 * (hole / 3) as u16 + 7 - u16::from(level)
}

/// Screen row of the top of a full-height (5 row) panel in `hole`.
pub fn panel_top(hole: usize) -> u16 {
    mole_top(hole, 5)
}
