//! Whack-A-Mole: a terminal reflex game on a threaded target-lifecycle
//! engine.
//!
//! This facade re-exports the workspace members so integration tests and
//! downstream code can reach everything through one crate.

pub use tui_wam_core as core;
pub use tui_wam_engine as engine;
pub use tui_wam_input as input;
pub use tui_wam_term as term;
pub use tui_wam_types as types;
