//! Mini Arcade - browser mini-games with a shared leaderboard
//!
//! Core modules:
//! - `sim`: Falling-blocks simulation (player, obstacles, difficulty, collisions)
//! - `game`: Phase-driven game loop wrapping the simulation
//! - `renderer`: Draw commands and the WebGPU rectangle pipeline
//! - `platform`: Keyboard intents and frame-clock subscription
//! - `leaderboard`: Remote score API model and service
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod leaderboard;
pub mod platform;
pub mod renderer;
pub mod reporter;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::GameLoop;
pub use settings::Settings;
pub use tuning::Tuning;

/// Play-field geometry, in canvas pixels (origin top-left, y down)
pub mod consts {
    /// Play-field dimensions
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player rectangle
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 20.0;
    /// Gap between the player and the bottom edge
    pub const PLAYER_BOTTOM_MARGIN: f32 = 10.0;
    /// Fixed player row
    pub const PLAYER_Y: f32 = FIELD_HEIGHT - PLAYER_HEIGHT - PLAYER_BOTTOM_MARGIN;

    /// Falling obstacle rectangle
    pub const OBSTACLE_WIDTH: f32 = 40.0;
    pub const OBSTACLE_HEIGHT: f32 = 20.0;

    /// Nominal frame length used when no previous timestamp exists (60 Hz)
    pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest frame delta fed to the simulation
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Identifier this game reports scores under
    pub const GAME_ID: &str = "FallingBlocks";
}

/// Horizontal player position centred in the field
#[inline]
pub fn centered_player_x() -> f32 {
    consts::FIELD_WIDTH / 2.0 - consts::PLAYER_WIDTH / 2.0
}
