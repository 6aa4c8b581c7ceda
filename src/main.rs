//! Whack-A-Mole binary: intro, one game, score sheet.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use tui_wam_core::{KeySource, Renderer, SharedRng};
use tui_wam_engine::{control, dispatch, display, GameCtx};
use tui_wam_input::map::{self, InstrChoice, IntroChoice, SheetChoice};
use tui_wam_input::CrosstermKeys;
use tui_wam_term::{emergency_restore, view, Screen};
use tui_wam_types::{GameMode, HoleKeys};

/// Moles per game.
const MOLES: u32 = 20;

/// Cycle time per mole in milliseconds, split randomly between hiding
/// and up time.
const CYCLE_MS: u64 = 6500;

fn main() -> Result<()> {
    // Whatever panics, the terminal comes back before the message prints.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        emergency_restore();
        default_hook(info);
    }));

    let screen = Arc::new(Screen::new());
    screen.enter()?;
    let result = run(&screen);
    let _ = screen.exit();
    result
}

fn run(screen: &Arc<Screen>) -> Result<()> {
    let rng = SharedRng::from_entropy();
    let keys = CrosstermKeys::new();

    intro(screen, &keys, &rng);
    view::countdown(screen);

    let renderer: Arc<dyn Renderer> = Arc::clone(screen) as Arc<dyn Renderer>;
    let ctx = GameCtx::new(renderer, rng);

    screen.draw_playfield(
        GameMode::Base,
        Some(&ctx.keys),
        Some("Good luck and have fun!!!"),
        true,
    )?;
    thread::sleep(Duration::from_millis(500));

    // The coordinator and dispatcher must be live before the first mole
    // starts, or its first status change would wait on nobody.
    let barrier = Arc::new(Barrier::new(3));
    let display_thread = {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            display::run(&ctx);
        })
    };
    let input_thread = {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            dispatch::run(&ctx, &CrosstermKeys::new());
        })
    };
    barrier.wait();

    control::run(&ctx, MOLES, CYCLE_MS);
    ctx.request_stop();

    if let Err(panic) = input_thread.join() {
        std::panic::resume_unwind(panic);
    }
    if let Err(panic) = display_thread.join() {
        std::panic::resume_unwind(panic);
    }

    view::game_over(screen, &keys);

    let mut events = ctx.ledger.snapshot();
    if !events.is_empty() {
        view::renumber(&mut events);
        score_sheet(screen, &keys, &ctx.keys, &events, ctx.ledger.current_score());
    }
    Ok(())
}

/// Splash and instructions loop; returns when play is selected.
fn intro(screen: &Arc<Screen>, keys: &dyn KeySource, rng: &SharedRng) {
    view::splash(screen, rng);
    keys.drain();
    loop {
        match map::intro_choice(keys.next_key_blocking()) {
            Some(IntroChoice::Play) => return,
            Some(IntroChoice::Instructions) => {
                let hole_keys = HoleKeys::default();
                let mut page = 0;
                loop {
                    view::instructions(screen, &hole_keys, page);
                    match map::instr_choice(keys.next_key_blocking()) {
                        Some(InstrChoice::NextPage) => {
                            page = (page + 1).min(view::INSTRUCTION_PAGES - 1);
                        }
                        Some(InstrChoice::PrevPage) => page = page.saturating_sub(1),
                        Some(InstrChoice::Start) => return,
                        None => {}
                    }
                }
            }
            None => {}
        }
    }
}

/// Paginated score sheet; returns on quit.
fn score_sheet(
    screen: &Screen,
    keys: &dyn KeySource,
    hole_keys: &HoleKeys,
    events: &[tui_wam_core::ScoreEvent],
    final_score: i32,
) {
    let pages = view::sheet_pages(events.len());
    let mut page = 0;
    loop {
        view::score_sheet_page(screen, events, hole_keys, page, final_score, MOLES);
        match map::sheet_choice(keys.next_key_blocking()) {
            Some(SheetChoice::Quit) => return,
            Some(SheetChoice::FirstPage) => page = 0,
            Some(SheetChoice::PrevPage) => page = page.saturating_sub(1),
            Some(SheetChoice::NextPage) => page = (page + 1).min(pages - 1),
            Some(SheetChoice::LastPage) => page = pages - 1,
            None => {}
        }
    }
}
