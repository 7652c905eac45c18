//! Backend-free frame description
//!
//! Every tick redraws the whole field: clear, player, then obstacles in spawn
//! order.

use super::vertex::colors;
use crate::sim::{GameState, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { color: [f32; 4] },
    Rect { rect: Rect, color: [f32; 4] },
}

/// Draw commands for the current state
pub fn build_frame(state: &GameState) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(state.obstacles.len() + 2);
    commands.push(DrawCommand::Clear {
        color: colors::BACKGROUND,
    });
    commands.push(DrawCommand::Rect {
        rect: state.player.rect(),
        color: colors::PLAYER,
    });
    commands.extend(state.obstacles.iter().map(|o| DrawCommand::Rect {
        rect: o.rect(),
        color: colors::OBSTACLE,
    }));
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::start;
    use crate::tuning::Tuning;

    #[test]
    fn test_frame_layout() {
        let mut state = GameState::with_fall_speed(5, Tuning::default(), 3.0).unwrap();
        start(&mut state);
        state.spawn_obstacle();
        state.spawn_obstacle();

        let frame = build_frame(&state);
        assert_eq!(frame.len(), 4);
        assert!(matches!(frame[0], DrawCommand::Clear { .. }));
        assert_eq!(
            frame[1],
            DrawCommand::Rect {
                rect: Rect::new(180.0, 570.0, 40.0, 20.0),
                color: colors::PLAYER,
            }
        );
        for (command, obstacle) in frame[2..].iter().zip(&state.obstacles) {
            assert_eq!(
                *command,
                DrawCommand::Rect {
                    rect: obstacle.rect(),
                    color: colors::OBSTACLE,
                }
            );
        }
    }
}
