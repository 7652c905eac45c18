//! Data-driven game balance
//!
//! Speeds are in pixels per tick, intervals in milliseconds. Every value must
//! be strictly positive; `Tuning::validate` enforces that before a session is
//! built, so the simulation never sees a degenerate configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected tuning values
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("fall speed band is empty: min {min} >= max {max}")]
    EmptySpeedBand { min: f32, max: f32 },

    #[error("spawn interval floor {floor} exceeds initial interval {initial}")]
    FloorAboveInitial { floor: f64, initial: f64 },

    #[error("ramp threshold must be at least 1")]
    ZeroThreshold,
}

/// Balance knobs for the falling-blocks game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Horizontal player movement per tick while a direction key is held
    pub player_speed: f32,
    /// Lower bound (inclusive) of the initial fall speed roll
    pub fall_speed_min: f32,
    /// Upper bound (exclusive) of the initial fall speed roll
    pub fall_speed_max: f32,
    /// Time between spawns at the start of a run
    pub initial_spawn_interval_ms: f64,
    /// Fall speed added per ramp step
    pub speed_increment: f32,
    /// Spawn interval removed per ramp step
    pub interval_decrement_ms: f64,
    /// Spawn interval never drops below this
    pub interval_floor_ms: f64,
    /// Score multiple that triggers a ramp step
    pub ramp_threshold: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 6.0,
            fall_speed_min: 2.0,
            fall_speed_max: 4.0,
            initial_spawn_interval_ms: 700.0,
            speed_increment: 0.5,
            interval_decrement_ms: 100.0,
            interval_floor_ms: 300.0,
            ramp_threshold: 10,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive: [(&'static str, f64); 7] = [
            ("player_speed", self.player_speed as f64),
            ("fall_speed_min", self.fall_speed_min as f64),
            ("fall_speed_max", self.fall_speed_max as f64),
            ("initial_spawn_interval_ms", self.initial_spawn_interval_ms),
            ("speed_increment", self.speed_increment as f64),
            ("interval_decrement_ms", self.interval_decrement_ms),
            ("interval_floor_ms", self.interval_floor_ms),
        ];
        // `!(v > 0.0)` also rejects NaN
        if let Some(&(field, value)) = positive
            .iter()
            .find(|(_, v)| !(*v > 0.0) || !v.is_finite())
        {
            return Err(TuningError::NotPositive { field, value });
        }
        if self.fall_speed_min >= self.fall_speed_max {
            return Err(TuningError::EmptySpeedBand {
                min: self.fall_speed_min,
                max: self.fall_speed_max,
            });
        }
        if self.interval_floor_ms > self.initial_spawn_interval_ms {
            return Err(TuningError::FloorAboveInitial {
                floor: self.interval_floor_ms,
                initial: self.initial_spawn_interval_ms,
            });
        }
        if self.ramp_threshold == 0 {
            return Err(TuningError::ZeroThreshold);
        }
        Ok(())
    }
}
