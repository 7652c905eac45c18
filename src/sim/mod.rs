//! Falling-blocks simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only
//! - Obstacles kept in spawn order
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, rects_overlap};
pub use state::{Difficulty, GamePhase, GameState, MIN_FALL_SPEED, Obstacle, Player};
pub use tick::{GameEvent, TickInput, restart, start, tick};
