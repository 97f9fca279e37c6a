//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time is supplied by the caller, never read from the clock
//! - Randomness only through an injected `RandomSource`
//! - Stable iteration order (by target ID)
//! - No rendering, audio or storage dependencies

pub mod playfield;
pub mod rng;
pub mod session;
pub mod state;
pub mod tick;

pub use playfield::Playfield;
pub use rng::{PcgSource, RandomSource, SequenceSource};
pub use session::{ClickOutcome, HitOutcome, Session, SessionConfig, SessionPhase, SharedSession};
pub use state::{GameEvent, HitTime, SessionState, Target, TargetId};
