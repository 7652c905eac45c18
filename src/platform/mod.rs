//! Platform abstraction layer
//!
//! Browser-facing state that stays testable on native:
//! - Keyboard intents
//! - Animation-frame subscription and frame timing

pub mod frame_clock;
pub mod input;

pub use frame_clock::FrameClock;
pub use input::{Intent, KeyBindings, KeyState};
