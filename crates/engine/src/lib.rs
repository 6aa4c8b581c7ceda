//! Game engine (mid layer).
//!
//! Four kinds of thread cooperate around a shared [`GameCtx`]:
//!
//! - mole workers ([`mole`]), one per pool slot, each driving a single
//!   mole through its lifecycle;
//! - the pool controller ([`control`]), which assigns moles to free slots
//!   and joins finished workers;
//! - the display coordinator ([`display`]), which turns status changes and
//!   ledger events into animations and acknowledges them;
//! - the input dispatcher ([`dispatch`]), which classifies keystrokes as
//!   whacks, near misses, or misfires.

pub mod control;
pub mod dispatch;
pub mod display;
pub mod mole;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tui_wam_core::{GameComm, HoleSet, Renderer, ScoreLedger, SharedRng};
use tui_wam_types::HoleKeys;

/// Shared state for one game. Built once, handed to every thread.
pub struct GameCtx {
    pub comm: GameComm,
    pub ledger: ScoreLedger,
    pub holes: HoleSet,
    pub rng: SharedRng,
    pub renderer: Arc<dyn Renderer>,
    pub keys: HoleKeys,
    stop: AtomicBool,
}

impl GameCtx {
    pub fn new(renderer: Arc<dyn Renderer>, rng: SharedRng) -> Arc<Self> {
        Arc::new(Self {
            comm: GameComm::new(0),
            ledger: ScoreLedger::new(),
            holes: HoleSet::new(),
            rng,
            renderer,
            keys: HoleKeys::default(),
            stop: AtomicBool::new(false),
        })
    }

    /// Ask the display coordinator and input dispatcher to wind down.
    /// Workers are not affected; the pool controller joins those itself.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}
