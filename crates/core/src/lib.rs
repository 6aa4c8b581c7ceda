//! Core game components (leaf layer).
//!
//! Everything here is independent of any terminal backend: the shared RNG,
//! the score ledger, the per-hole lock set, animation requests and their
//! sync-point plumbing, the slot-record store with its acknowledgment
//! protocol, and the collaborator traits the engine renders and reads keys
//! through.

pub mod anim;
pub mod comm;
pub mod holes;
pub mod ledger;
pub mod ports;
pub mod rng;
pub mod sync;
pub mod task;

pub use tui_wam_types as types;

pub use anim::{AnimationRequest, CancelToken, SyncPoints};
pub use comm::{GameComm, Shared, SlotState};
pub use holes::{HoleGuard, HoleSet};
pub use ledger::{ScoreEvent, ScoreLedger};
pub use ports::{KeySource, Renderer};
pub use rng::{SharedRng, SimpleRng};
