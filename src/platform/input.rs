//! Keyboard intents
//!
//! Key handlers only flip flags here; the loop samples them once per tick.

use serde::{Deserialize, Serialize};

use crate::sim::TickInput;

/// Which keys steer the player (DOM `KeyboardEvent.key` values)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub left: String,
    pub right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: "ArrowLeft".to_string(),
            right: "ArrowRight".to_string(),
        }
    }
}

/// What a key means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    /// Start from Ready or restart after GameOver
    Confirm,
}

impl KeyBindings {
    pub fn intent_for(&self, key: &str) -> Option<Intent> {
        if key == self.left {
            Some(Intent::MoveLeft)
        } else if key == self.right {
            Some(Intent::MoveRight)
        } else {
            match key {
                "Enter" | " " => Some(Intent::Confirm),
                _ => None,
            }
        }
    }
}

/// Currently held direction keys
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    left: bool,
    right: bool,
}

impl KeyState {
    /// Record a key press; returns the intent so callers can react to Confirm
    pub fn key_down(&mut self, key: &str, bindings: &KeyBindings) -> Option<Intent> {
        let intent = bindings.intent_for(key);
        match intent {
            Some(Intent::MoveLeft) => self.left = true,
            Some(Intent::MoveRight) => self.right = true,
            _ => {}
        }
        intent
    }

    pub fn key_up(&mut self, key: &str, bindings: &KeyBindings) {
        match bindings.intent_for(key) {
            Some(Intent::MoveLeft) => self.left = false,
            Some(Intent::MoveRight) => self.right = false,
            _ => {}
        }
    }

    /// Drop all held keys (focus loss, restart)
    pub fn release_all(&mut self) {
        self.left = false;
        self.right = false;
    }

    /// Flags as seen by the next tick
    pub fn sample(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let bindings = KeyBindings::default();
        let mut keys = KeyState::default();

        assert_eq!(keys.key_down("ArrowLeft", &bindings), Some(Intent::MoveLeft));
        assert_eq!(keys.sample(), TickInput { left: true, right: false });

        keys.key_down("ArrowRight", &bindings);
        assert_eq!(keys.sample(), TickInput { left: true, right: true });

        keys.key_up("ArrowLeft", &bindings);
        assert_eq!(keys.sample(), TickInput { left: false, right: true });

        keys.release_all();
        assert_eq!(keys.sample(), TickInput::default());
    }

    #[test]
    fn test_unbound_keys_ignored() {
        let bindings = KeyBindings::default();
        let mut keys = KeyState::default();
        assert_eq!(keys.key_down("a", &bindings), None);
        assert_eq!(keys.key_down("ArrowUp", &bindings), None);
        assert_eq!(keys.sample(), TickInput::default());
    }

    #[test]
    fn test_confirm_does_not_move() {
        let bindings = KeyBindings::default();
        let mut keys = KeyState::default();
        assert_eq!(keys.key_down("Enter", &bindings), Some(Intent::Confirm));
        assert_eq!(keys.key_down(" ", &bindings), Some(Intent::Confirm));
        assert_eq!(keys.sample(), TickInput::default());
    }

    #[test]
    fn test_custom_bindings() {
        let bindings = KeyBindings {
            left: "a".to_string(),
            right: "d".to_string(),
        };
        let mut keys = KeyState::default();
        keys.key_down("d", &bindings);
        keys.key_down("ArrowLeft", &bindings);
        assert_eq!(keys.sample(), TickInput { left: false, right: true });
    }
}
