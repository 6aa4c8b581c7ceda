//! Full-screen views: splash, instructions, countdown, game over, and the
//! paginated score sheet.
//!
//! These draw through [`Screen`] directly; key handling stays with the
//! caller so the views can be rendered and inspected without a keyboard.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tui_wam_core::types::{
    AnimationKind, GameMode, HoleKeys, BONUS_POINTS, CONCURRENT_MOLES, MISSED_MOLE_CAP,
    MISSED_MOLE_SCORE, MOLE_HOLES, WHACKED_MOLE_SCORE,
};
use tui_wam_core::{task, AnimationRequest, KeySource, Renderer, ScoreEvent, SharedRng};

use crate::screen::Screen;

/// Version string shown on the title screens.
pub const VERSION: &str = concat!("V", env!("CARGO_PKG_VERSION"));

/// Rows of score sheet data per page on the 25-row minimum terminal.
pub const SHEET_PAGE_SIZE: usize = 13;
const SHEET_DATA_ROW: u16 = 9;

/// Number of instructions pages.
pub const INSTRUCTION_PAGES: usize = 4;

/// Draw the splash screen: title over the playfield, all nine moles
/// popping up in a staggered wave, then the menu.
pub fn splash(screen: &Arc<Screen>, rng: &SharedRng) {
    let _ = screen.draw_playfield(GameMode::Base, None, None, false);
    screen.print_at(43, 4, &format!("        Whack-A-Mole {VERSION}"));

    let renderer: Arc<dyn Renderer> = Arc::clone(screen) as Arc<dyn Renderer>;
    let mut waves = Vec::with_capacity(MOLE_HOLES);
    for hole in 0..MOLE_HOLES {
        let request = AnimationRequest::new(AnimationKind::Splash, hole, 0);
        waves.push(task::spawn(Arc::clone(&renderer), rng.clone(), request));
        thread::sleep(Duration::from_millis(150));
    }
    for wave in waves {
        let _ = wave.join();
    }

    for (i, line) in [
        "   A Rust / crossterm implementation ",
        "   of the classic electromechanical  ",
        "   arcade game, using native threads.",
        "",
        "",
        "         ==================          ",
        "         Please select one:          ",
        "",
        "           I)nstructions             ",
        "           P)lay                     ",
        "",
        "         ==================          ",
    ]
    .iter()
    .enumerate()
    {
        screen.print_at(43, 7 + i as u16, line);
    }
}

/// Draw one instructions page (0-based).
pub fn instructions(screen: &Screen, keys: &HoleKeys, page: usize) {
    match page {
        0 => {
            screen.clear();
            header(screen, page);
            let active = format!("   Up to {CONCURRENT_MOLES} moles may be active at   ");
            for (i, line) in [
                "              OVERVIEW               ",
                "",
                "   Score points by whacking the      ",
                "   moles when they pop up in the     ",
                "   holes.                            ",
                "",
                "   A penalty score is assessed for   ",
                "   any missed moles.                 ",
                "",
                active.as_str(),
                "   the same time.                    ",
                "",
                "",
                "   ===============================   ",
                "        Options: (N)ext pg,          ",
                "                 (S)tart game        ",
                "   ===============================   ",
            ]
            .iter()
            .enumerate()
            {
                screen.print_at(22, 3 + i as u16, line);
            }
        }
        1 => {
            let _ = screen.draw_playfield(GameMode::Base, Some(keys), None, false);
            header(screen, page);
            for (i, line) in [
                "              PLAYFIELD              ",
                "",
                "   This is the playfield for the     ",
                "   game.                             ",
                "",
                "   The key assigned to each hole is  ",
                "   displayed to the upper right of   ",
                "   the hole.                         ",
                "",
                "   Press that key to swing your      ",
                "   virtual hammer at the hole.       ",
                "",
                "   HINT: Make sure numlock is on.    ",
                "",
                "   ==============================    ",
                "   Options: (N)ext pg, (P)rev pg,    ",
                "            (S)tart game             ",
                "   ==============================    ",
            ]
            .iter()
            .enumerate()
            {
                screen.print_at(43, 3 + i as u16, line);
            }
        }
        2 => {
            screen.clear();
            header(screen, page);
            let lines = [
                "              SCORING                ".to_string(),
                String::new(),
                "   Each whacked mole earns you       ".to_string(),
                format!("   {WHACKED_MOLE_SCORE} points.                         "),
                String::new(),
                "   Whack it at the right moment      ".to_string(),
                "   for a timing bonus:               ".to_string(),
                String::new(),
                format!("     Lightning reflexes     +{:<3}    ", BONUS_POINTS[0]),
                format!("     On its way back down   +{:<3}    ", BONUS_POINTS[3]),
                format!("     Nerves of steel        +{:<3}    ", BONUS_POINTS[4]),
                String::new(),
                "   Anything in between earns no      ".to_string(),
                "   bonus.                            ".to_string(),
                String::new(),
                "   ==============================    ".to_string(),
                "   Options: (N)ext pg, (P)rev pg,    ".to_string(),
                "            (S)tart game             ".to_string(),
                "   ==============================    ".to_string(),
            ];
            for (i, line) in lines.iter().enumerate() {
                screen.print_at(22, 3 + i as u16, line);
            }
        }
        _ => {
            screen.clear();
            header(screen, page);
            let lines = [
                "             PENALTIES               ".to_string(),
                String::new(),
                "   The first mole to escape costs    ".to_string(),
                format!("   you {} points. Each additional    ", -MISSED_MOLE_SCORE),
                "   escape raises the penalty by      ".to_string(),
                format!("   another {} points, up to a cap    ", -MISSED_MOLE_SCORE),
                format!("   of {} points.                     ", -MISSED_MOLE_CAP),
                String::new(),
                "   A penalty never takes your        ".to_string(),
                "   score below zero.                 ".to_string(),
                String::new(),
                "   Scared moles (your hammer         ".to_string(),
                "   slamming the ground) count as     ".to_string(),
                "   escaped.                          ".to_string(),
                String::new(),
                "   ==============================    ".to_string(),
                "   Options: (P)rev pg,               ".to_string(),
                "            (S)tart game             ".to_string(),
                "   ==============================    ".to_string(),
            ];
            for (i, line) in lines.iter().enumerate() {
                screen.print_at(22, 3 + i as u16, line);
            }
        }
    }
}

fn header(screen: &Screen, page: usize) {
    screen.print_at(0, 0, &format!("Whack-A-Mole {VERSION}"));
    screen.print_at(
        80 - 18,
        0,
        &format!("[Instructions {}/{INSTRUCTION_PAGES}]", page + 1),
    );
}

/// Five-second countdown before the moles come out.
pub fn countdown(screen: &Screen) {
    let row = 8;
    let col = 32;
    screen.clear();
    screen.print_at(col, row, "===============");
    screen.print_at(col, row + 1, "GAME STARTS IN:");
    screen.print_at(col, row + 5, "===============");
    for i in (1..=5).rev() {
        screen.print_at(col + 5, row + 2, "+---+");
        screen.print_at(col + 5, row + 3, &format!("| {i} |"));
        screen.print_at(col + 5, row + 4, "+---+");
        thread::sleep(Duration::from_millis(300));
        screen.print_at(col + 5, row + 2, "     ");
        screen.print_at(col + 5, row + 3, &format!("  {i}  "));
        screen.print_at(col + 5, row + 4, "     ");
        thread::sleep(Duration::from_millis(300));
    }
}

/// Flash the GAME OVER banner until any key is pressed.
pub fn game_over(screen: &Screen, keys: &dyn KeySource) {
    let row = 13;
    let col = 53;
    keys.drain();
    let mut i = 0u32;
    loop {
        if i < 11 {
            if i % 2 == 0 {
                screen.print_at(col, row, "===============");
                screen.print_at(col, row + 1, "   GAME OVER");
                screen.print_at(col, row + 2, "===============");
            } else {
                screen.print_at(col, row, "               ");
                screen.print_at(col, row + 1, "            ");
                screen.print_at(col, row + 2, "               ");
            }
            screen.print_at(col, row + 3, " Press any key");
        } else if i % 2 == 0 {
            screen.print_at(col, row + 3, " Press any key");
        } else {
            screen.print_at(col, row + 3, "              ");
        }
        if keys.next_key(500).is_some() {
            break;
        }
        i += 1;
    }
    keys.drain();
}

/// Reassign sequential mole numbers to the sheet's copy of the events.
/// Workers number moles at assignment, so with three running at once the
/// ledger order need not match; the sheet renumbers so the player is not
/// confused. Misfire rows (mole <= 0) are left alone.
pub fn renumber(events: &mut [ScoreEvent]) {
    let mut next = 1;
    for event in events {
        if event.mole > 0 {
            event.mole = next;
            next += 1;
        }
    }
}

/// Number of score sheet pages for `n` events.
pub fn sheet_pages(n: usize) -> usize {
    n.div_ceil(SHEET_PAGE_SIZE).max(1)
}

/// Draw one page of the score sheet.
pub fn score_sheet_page(
    screen: &Screen,
    events: &[ScoreEvent],
    keys: &HoleKeys,
    page: usize,
    final_score: i32,
    moles: u32,
) {
    screen.clear();
    screen.print_at(0, 0, "===================");
    screen.print_at(0, 1, &format!("Your score was {final_score}"));
    screen.print_at(
        0,
        2,
        &if moles == 1 {
            "for 1 mole".to_string()
        } else {
            format!("for {moles} moles")
        },
    );
    screen.print_at(0, 3, "===================");
    screen.print_at(27, 1, &format!("Thank you for playing Whack-A-Mole {VERSION}"));
    screen.print_at(35, 4, "Score Sheet:");
    screen.print_at(48, 6, "         Bonus   Running");
    screen.print_at(
        0,
        7,
        "    Mole    Hole    Event                    Score   Bonus     Total",
    );

    let start = page * SHEET_PAGE_SIZE;
    for (line, event) in events
        .iter()
        .skip(start)
        .take(SHEET_PAGE_SIZE)
        .enumerate()
    {
        let mole = if event.mole > 0 {
            event.mole.to_string()
        } else {
            String::new()
        };
        let key = usize::try_from(event.hole)
            .ok()
            .map_or(String::new(), |h| keys.key_for(h).to_string());
        let score = event.missed_score + event.whacked_score + event.penalty_score;
        let score = if score == 0 {
            String::new()
        } else {
            format!("{score}")
        };
        let bonus = if event.bonus_score == 0 {
            String::new()
        } else {
            event.bonus_score.to_string()
        };
        screen.print_at(
            0,
            SHEET_DATA_ROW + line as u16,
            &format!(
                "{mole:>8}{key:>8}    {label:<24}{score:>5}{bonus:>8}{total:>10}",
                label = event.result.label(),
                total = event.end_score,
            ),
        );
    }

    let pages = sheet_pages(events.len());
    if pages > 1 {
        screen.print_at(
            0,
            24,
            &format!(
                "[Page {}/{pages}]   Command: (Q)uit, (1)st pg, (P)rev pg, (N)ext pg, (L)ast pg.",
                page + 1
            ),
        );
    } else {
        screen.print_at(0, 24, "Press Q to quit.");
    }
}
