//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! The shell feeds taps in through [`TickInput`] and drains [`GameEvent`]s
//! back out; nothing else crosses the boundary.

pub mod spawn;
pub mod state;
pub mod tick;

pub use spawn::spawn_chance;
pub use state::{
    Bug, BugKind, BugState, GameEvent, GamePhase, GameSession, SquashResult,
};
pub use tick::{TickInput, tick};
