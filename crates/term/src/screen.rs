//! Terminal setup and the production renderer.
//!
//! [`Screen`] owns stdout behind a mutex so the animation tasks, the
//! display coordinator, and the view code can all draw without tearing
//! each other's output. Raw mode and the alternate screen are entered on
//! [`Screen::enter`] and must be left via [`Screen::exit`] (or
//! [`emergency_restore`] from a panic hook).

use std::io::{self, Stdout, Write};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use crossterm::style::Print;
use crossterm::{cursor, execute, queue, terminal};

use tui_wam_core::sync;
use tui_wam_core::types::{GameMode, HoleKeys, PlayResult, SCORE_ART_MAX, SCORE_ART_MIN};
use tui_wam_core::Renderer;

use crate::art;

/// Smallest terminal the fixed layout fits in.
pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 25;

/// Shared handle to the terminal.
pub struct Screen {
    out: Mutex<Stdout>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(io::stdout()),
        }
    }

    /// Check the terminal size, then switch to raw mode on the alternate
    /// screen with the cursor hidden.
    pub fn enter(&self) -> Result<()> {
        let (cols, rows) = terminal::size().context("query terminal size")?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            bail!("terminal is {cols}x{rows}; need at least {MIN_COLS}x{MIN_ROWS}");
        }
        terminal::enable_raw_mode().context("enable raw mode")?;
        let mut out = sync::lock(&self.out, "terminal output");
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )
        .context("enter alternate screen")?;
        Ok(())
    }

    /// Undo [`enter`](Screen::enter).
    pub fn exit(&self) -> Result<()> {
        let mut out = sync::lock(&self.out, "terminal output");
        execute!(out, cursor::Show, terminal::LeaveAlternateScreen)
            .context("leave alternate screen")?;
        terminal::disable_raw_mode().context("disable raw mode")?;
        Ok(())
    }

    pub fn clear(&self) {
        let mut out = sync::lock(&self.out, "terminal output");
        let _ = execute!(
            out,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        );
    }

    /// Print `text` at (col, row). Draw errors are not actionable mid-game
    /// and are dropped.
    pub fn print_at(&self, col: u16, row: u16, text: &str) {
        let mut out = sync::lock(&self.out, "terminal output");
        let _ = queue!(out, cursor::MoveTo(col, row), Print(text));
        let _ = out.flush();
    }

    /// Draw a full-height 5-row panel into `hole` in one flush.
    fn draw_panel<S: AsRef<str>>(&self, hole: usize, rows: &[S; 5]) {
        let left = art::hole_left(hole);
        let top = art::panel_top(hole);
        let mut out = sync::lock(&self.out, "terminal output");
        for (i, row) in rows.iter().enumerate() {
            let _ = queue!(out, cursor::MoveTo(left, top + i as u16), Print(row.as_ref()));
        }
        let _ = out.flush();
    }

    /// Draw the empty playfield: hole outlines, optionally the key labels,
    /// a banner message, and the score/moles readouts.
    pub fn draw_playfield(
        &self,
        mode: GameMode,
        keys: Option<&HoleKeys>,
        msg: Option<&str>,
        stats: bool,
    ) -> Result<()> {
        if mode == GameMode::Timed {
            bail!("unsupported game mode");
        }
        self.clear();
        let mut out = sync::lock(&self.out, "terminal output");
        for grid_row in 0..3u16 {
            let base = 7 * grid_row + 1;
            let labels: Vec<String> = (0..3)
                .map(|grid_col| {
                    keys.map_or(" ".to_string(), |k| {
                        k.key_for((grid_row * 3) as usize + grid_col).to_string()
                    })
                })
                .collect();
            let rows = [
                "  ________      ________      ________   ".to_string(),
                format!(
                    " /        \\{}   /        \\{}   /        \\{} ",
                    labels[0], labels[1], labels[2]
                ),
                "/          \\  /          \\  /          \\ ".to_string(),
                "|          |  |          |  |          | ".to_string(),
                "|          |  |          |  |          | ".to_string(),
                "\\          /  \\          /  \\          / ".to_string(),
                " \\________/    \\________/    \\________/  ".to_string(),
            ];
            for (i, row) in rows.iter().enumerate() {
                let _ = queue!(out, cursor::MoveTo(2, base + i as u16), Print(row));
            }
        }
        if let Some(msg) = msg {
            let col = 60u16.saturating_sub(msg.chars().count() as u16 / 2);
            let _ = queue!(out, cursor::MoveTo(col, 2), Print(msg));
        }
        if stats {
            let _ = queue!(
                out,
                cursor::MoveTo(53, 6),
                Print("   MOLES:   "),
                cursor::MoveTo(53, 9),
                Print("==============="),
                cursor::MoveTo(53, 10),
                Print("   SCORE: 0"),
                cursor::MoveTo(53, 11),
                Print("===============")
            );
        }
        out.flush().context("flush playfield")?;
        Ok(())
    }
}

impl Renderer for Screen {
    /// Blank the hole, then draw the bottom `level` rows of the mole.
    fn show_mole(&self, hole: usize, level: u8) {
        let left = art::hole_left(hole);
        let top = art::panel_top(hole);
        let mut out = sync::lock(&self.out, "terminal output");
        for i in 0..5u16 {
            let _ = queue!(out, cursor::MoveTo(left, top + i), Print(art::BLANK_ROW));
        }
        if level > 0 {
            let mole_top = art::mole_top(hole, level);
            for (i, row) in art::MOLE.iter().take(level as usize).enumerate() {
                let _ = queue!(out, cursor::MoveTo(left, mole_top + i as u16), Print(row));
            }
        }
        let _ = out.flush();
    }

    /// Draw a result panel. With zero scores the outcome art is shown;
    /// otherwise the score panel.
    ///
    /// # Panics
    ///
    /// Panics when a score does not fit the 8-column panels. The scoring
    /// rules cannot produce such a value, so this is a programming error.
    fn show_result(&self, hole: usize, result: PlayResult, score1: i32, score2: i32) {
        let displayable = SCORE_ART_MIN..=SCORE_ART_MAX;
        assert!(
            displayable.contains(&score1) && displayable.contains(&score2),
            "score ({score1}/{score2}) outside displayable range"
        );
        match result {
            PlayResult::Whack if score1 != 0 => {
                self.draw_panel(
                    hole,
                    &[
                        art::BLANK_ROW.to_string(),
                        " WHACK! ".to_string(),
                        art::BLANK_ROW.to_string(),
                        format!("{:<8.8}", format!("Score:{score1}")),
                        format!("{:<8.8}", format!("Bonus:{score2}")),
                    ],
                );
            }
            PlayResult::Whack => self.draw_panel(hole, &art::WHACK),
            PlayResult::Escape if score1 != 0 => {
                self.draw_panel(
                    hole,
                    &[
                        art::BLANK_ROW.to_string(),
                        " ESCAPE ".to_string(),
                        art::BLANK_ROW.to_string(),
                        " Score  ".to_string(),
                        format!("{:<8.8}", format!("  {score1}")),
                    ],
                );
            }
            PlayResult::Escape => self.draw_panel(hole, &art::ESCAPE),
            PlayResult::Misfire | PlayResult::TooSoon => self.draw_panel(hole, &art::MISFIRE),
            PlayResult::ScaredOff => self.draw_panel(hole, &art::SCARED),
        }
    }

    /// Blank panel with `text` centered on the middle row.
    fn show_text(&self, hole: usize, text: &str) {
        self.draw_panel(
            hole,
            &[
                art::BLANK_ROW.to_string(),
                art::BLANK_ROW.to_string(),
                format!("{text:>8.8}"),
                art::BLANK_ROW.to_string(),
                art::BLANK_ROW.to_string(),
            ],
        );
    }

    fn set_score(&self, score: i32) {
        self.print_at(53, 10, &format!("   SCORE: {score} "));
    }

    fn set_remaining(&self, remaining: i32) {
        self.print_at(63, 6, &format!("{remaining:<4} "));
    }
}

/// Best-effort terminal restore for the panic hook. Safe to call whether
/// or not raw mode is active.
pub fn emergency_restore() {
    let mut out = io::stdout();
    let _ = execute!(out, cursor::Show, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}
