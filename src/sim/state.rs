//! Game state and core simulation types
//!
//! Everything a run mutates lives in `GameState`; the loop owns exactly one.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Rect;
use crate::consts::*;
use crate::tuning::{Tuning, TuningError};

/// Smallest fall speed the difficulty state will hold
pub const MIN_FALL_SPEED: f32 = 0.1;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Waiting for the first start signal
    #[default]
    Ready,
    /// Active gameplay
    Running,
    /// Run ended, waiting for restart
    GameOver,
}

/// The player's paddle on the bottom row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub pos: Vec2,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(crate::centered_player_x(), PLAYER_Y),
        }
    }
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    /// Shift horizontally, staying inside the field
    pub fn move_by(&mut self, dx: f32) {
        self.pos.x = (self.pos.x + dx).clamp(0.0, FIELD_WIDTH - PLAYER_WIDTH);
    }
}

/// A falling block
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per tick, fixed at spawn
    pub fall_speed: f32,
}

impl Obstacle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, OBSTACLE_WIDTH, OBSTACLE_HEIGHT)
    }

    pub fn fall(&mut self) {
        self.pos.y += self.fall_speed;
    }

    /// Top edge has left the field through the bottom
    pub fn has_exited(&self) -> bool {
        self.pos.y > FIELD_HEIGHT
    }
}

/// Fall speed and spawn interval for newly spawned obstacles
#[derive(Debug, Clone, PartialEq)]
pub struct Difficulty {
    pub fall_speed: f32,
    pub spawn_interval_ms: f64,
    /// Ramp steps already applied (`score / threshold` at the last ramp)
    pub ramp_level: u32,
}

impl Difficulty {
    pub fn initial(fall_speed: f32, tuning: &Tuning) -> Self {
        Self {
            fall_speed: fall_speed.max(MIN_FALL_SPEED),
            spawn_interval_ms: tuning.initial_spawn_interval_ms.max(tuning.interval_floor_ms),
            ramp_level: 0,
        }
    }

    /// Apply every ramp step due at `score` that has not been applied yet.
    /// Returns true if anything changed.
    pub fn ramp_for_score(&mut self, score: u32, tuning: &Tuning) -> bool {
        let due = score / tuning.ramp_threshold.max(1);
        if due <= self.ramp_level {
            return false;
        }
        for _ in self.ramp_level..due {
            self.fall_speed = (self.fall_speed + tuning.speed_increment).max(MIN_FALL_SPEED);
            self.spawn_interval_ms = (self.spawn_interval_ms - tuning.interval_decrement_ms)
                .max(tuning.interval_floor_ms);
        }
        self.ramp_level = due;
        true
    }
}

/// Complete falling-blocks state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Obstacles passed this run
    pub score: u32,
    pub player: Player,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    pub difficulty: Difficulty,
    /// Fall speed every run of this session starts with
    pub initial_fall_speed: f32,
    /// Milliseconds since the last spawn (or run start)
    pub spawn_timer_ms: f64,
    /// Ticks simulated this run
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    /// Create a session with the initial fall speed rolled from the tuning band
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let fall_speed = rng.random_range(tuning.fall_speed_min..tuning.fall_speed_max);
        Ok(Self::build(seed, rng, tuning, fall_speed))
    }

    /// Create a session with an explicit initial fall speed
    pub fn with_fall_speed(seed: u64, tuning: Tuning, fall_speed: f32) -> Result<Self, TuningError> {
        tuning.validate()?;
        if !(fall_speed > 0.0) {
            return Err(TuningError::NotPositive {
                field: "fall_speed",
                value: fall_speed as f64,
            });
        }
        Ok(Self::build(seed, Pcg32::seed_from_u64(seed), tuning, fall_speed))
    }

    fn build(seed: u64, rng: Pcg32, tuning: Tuning, fall_speed: f32) -> Self {
        let difficulty = Difficulty::initial(fall_speed, &tuning);
        Self {
            seed,
            rng,
            initial_fall_speed: difficulty.fall_speed,
            difficulty,
            tuning,
            phase: GamePhase::Ready,
            score: 0,
            player: Player::default(),
            obstacles: Vec::new(),
            spawn_timer_ms: 0.0,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append an obstacle at a uniformly random column above the field
    pub fn spawn_obstacle(&mut self) -> &Obstacle {
        let x = self.rng.random_range(0.0..=FIELD_WIDTH - OBSTACLE_WIDTH);
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            pos: Vec2::new(x, -OBSTACLE_HEIGHT),
            fall_speed: self.difficulty.fall_speed,
        });
        &self.obstacles[self.obstacles.len() - 1]
    }

    /// Clear all per-run state; the phase is left to the caller
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.obstacles.clear();
        self.difficulty = Difficulty::initial(self.initial_fall_speed, &self.tuning);
        self.spawn_timer_ms = 0.0;
        self.time_ticks = 0;
        self.player = Player::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_ready_and_empty() {
        let state = GameState::new(7, Tuning::default()).unwrap();
        assert_eq!(state.phase, GamePhase::Ready);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.player.pos.x, 180.0);
        assert_eq!(state.player.pos.y, 570.0);
    }

    #[test]
    fn test_initial_fall_speed_in_band() {
        for seed in 0..64 {
            let state = GameState::new(seed, Tuning::default()).unwrap();
            assert!((2.0..4.0).contains(&state.initial_fall_speed));
            assert_eq!(state.difficulty.fall_speed, state.initial_fall_speed);
        }
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            interval_floor_ms: -1.0,
            ..Default::default()
        };
        assert!(GameState::new(1, tuning).is_err());
        assert!(GameState::with_fall_speed(1, Tuning::default(), 0.0).is_err());
    }

    #[test]
    fn test_spawn_within_field() {
        let mut state = GameState::with_fall_speed(3, Tuning::default(), 3.0).unwrap();
        for _ in 0..200 {
            let obstacle = state.spawn_obstacle().clone();
            assert!(obstacle.pos.x >= 0.0 && obstacle.pos.x <= FIELD_WIDTH - OBSTACLE_WIDTH);
            assert_eq!(obstacle.pos.y, -OBSTACLE_HEIGHT);
            assert_eq!(obstacle.fall_speed, 3.0);
        }
        // Spawn order is preserved
        assert!(state.obstacles.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_player_clamped() {
        let mut player = Player::default();
        player.move_by(-1000.0);
        assert_eq!(player.pos.x, 0.0);
        player.move_by(1000.0);
        assert_eq!(player.pos.x, FIELD_WIDTH - PLAYER_WIDTH);
    }

    #[test]
    fn test_ramp_once_per_threshold() {
        let tuning = Tuning::default();
        let mut difficulty = Difficulty::initial(3.0, &tuning);

        assert!(!difficulty.ramp_for_score(9, &tuning));
        assert!(difficulty.ramp_for_score(10, &tuning));
        assert_eq!(difficulty.fall_speed, 3.5);
        assert_eq!(difficulty.spawn_interval_ms, 600.0);

        // Same score again does nothing
        assert!(!difficulty.ramp_for_score(10, &tuning));
        assert!(!difficulty.ramp_for_score(11, &tuning));
        assert_eq!(difficulty.fall_speed, 3.5);

        // Skipping straight past two thresholds applies both
        assert!(difficulty.ramp_for_score(31, &tuning));
        assert_eq!(difficulty.fall_speed, 4.5);
        assert_eq!(difficulty.spawn_interval_ms, 400.0);
    }

    #[test]
    fn test_interval_floor() {
        let tuning = Tuning::default();
        let mut difficulty = Difficulty::initial(2.0, &tuning);
        difficulty.ramp_for_score(200, &tuning);
        assert_eq!(difficulty.spawn_interval_ms, 300.0);
        assert_eq!(difficulty.fall_speed, 12.0);
    }
}
