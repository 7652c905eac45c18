//! Per-frame simulation tick
//!
//! One call advances a running game by one frame. Movement is per tick, the
//! spawn timer is in wall-clock milliseconds.

use super::state::{GamePhase, GameState};

/// Held direction keys, sampled at the start of a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

impl TickInput {
    /// -1, 0 or 1; both keys held cancel out
    pub fn direction(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Something notable that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ObstacleSpawned { id: u32, x: f32, y: f32 },
    ObstaclePassed { id: u32, score: u32 },
    DifficultyIncreased { fall_speed: f32, spawn_interval_ms: f64 },
    Collision { obstacle_id: u32 },
}

/// Ready -> Running. Returns false from any other phase.
pub fn start(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Ready {
        return false;
    }
    begin_run(state);
    true
}

/// GameOver -> Running, skipping Ready. Returns false from any other phase.
pub fn restart(state: &mut GameState) -> bool {
    if state.phase != GamePhase::GameOver {
        return false;
    }
    begin_run(state);
    true
}

fn begin_run(state: &mut GameState) {
    state.reset_run();
    state.phase = GamePhase::Running;
}

/// Advance a running game by one frame of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Running {
        return events;
    }
    state.time_ticks += 1;

    // Player
    let speed = state.tuning.player_speed;
    state.player.move_by(input.direction() * speed);

    // Spawner
    state.spawn_timer_ms += dt_ms.max(0.0);
    if state.spawn_timer_ms > state.difficulty.spawn_interval_ms {
        state.spawn_timer_ms = 0.0;
        let obstacle = state.spawn_obstacle();
        events.push(GameEvent::ObstacleSpawned {
            id: obstacle.id,
            x: obstacle.pos.x,
            y: obstacle.pos.y,
        });
    }

    for obstacle in &mut state.obstacles {
        obstacle.fall();
    }

    // Full collision pass before the phase changes so the last frame is consistent
    let player = state.player.rect();
    let mut collided = false;
    for obstacle in &state.obstacles {
        if obstacle.rect().overlaps(&player) {
            events.push(GameEvent::Collision {
                obstacle_id: obstacle.id,
            });
            collided = true;
        }
    }
    if collided {
        state.phase = GamePhase::GameOver;
        log::info!("Collision at tick {}, final score {}", state.time_ticks, state.score);
        return events;
    }

    // Scoring, keeping spawn order for the survivors
    let mut score = state.score;
    state.obstacles.retain(|obstacle| {
        if obstacle.has_exited() {
            score += 1;
            events.push(GameEvent::ObstaclePassed {
                id: obstacle.id,
                score,
            });
            false
        } else {
            true
        }
    });
    state.score = score;

    if state.difficulty.ramp_for_score(state.score, &state.tuning) {
        log::debug!(
            "Difficulty up at score {}: speed {:.2}, interval {}ms",
            state.score,
            state.difficulty.fall_speed,
            state.difficulty.spawn_interval_ms
        );
        events.push(GameEvent::DifficultyIncreased {
            fall_speed: state.difficulty.fall_speed,
            spawn_interval_ms: state.difficulty.spawn_interval_ms,
        });
    }

    events
}
