//! Run configuration.
//!
//! `SimConfig` is fixed for the lifetime of an engine. Restarting a run reuses it,
//! including the seed, so a restarted run replays identically under the same input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

/// Smallest playfield edge accepted by `validate`.
const MIN_PLAYFIELD_EDGE: f64 = 200.0;

/// Fastest pacing multiplier accepted by `validate`.
const MAX_TIME_SCALE: f64 = 4.0;

/// Configuration for a simulation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed + same commands = same simulation.
    pub seed: u64,
    pub playfield_width: f64,
    pub playfield_height: f64,
    /// Pacing multiplier for the frame driver (1.0 = real time).
    pub time_scale: f64,
    /// Spawn enemy waves. Can be toggled at runtime with the debug command.
    pub auto_spawn_enemies: bool,
    /// Spawn the ambient asteroid field.
    pub ambient_asteroids: bool,
    /// Number of the first wave of each run.
    pub start_wave: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            time_scale: 1.0,
            auto_spawn_enemies: true,
            ambient_asteroids: true,
            start_wave: 1,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let edge_ok = |v: f64| v.is_finite() && v >= MIN_PLAYFIELD_EDGE;
        if !edge_ok(self.playfield_width) || !edge_ok(self.playfield_height) {
            return Err(ConfigError::InvalidPlayfield {
                width: self.playfield_width,
                height: self.playfield_height,
            });
        }
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 || self.time_scale > MAX_TIME_SCALE {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        if self.start_wave == 0 {
            return Err(ConfigError::InvalidStartWave);
        }
        Ok(())
    }

    /// Copy with every out-of-range field forced into range. A config that
    /// passes `validate` comes back unchanged.
    pub fn sanitized(&self) -> Self {
        let edge = |v: f64, fallback: f64| {
            if v.is_finite() {
                v.max(MIN_PLAYFIELD_EDGE)
            } else {
                fallback
            }
        };
        let time_scale = if self.time_scale.is_finite() && self.time_scale > 0.0 {
            self.time_scale.min(MAX_TIME_SCALE)
        } else {
            1.0
        };
        Self {
            playfield_width: edge(self.playfield_width, PLAYFIELD_WIDTH),
            playfield_height: edge(self.playfield_height, PLAYFIELD_HEIGHT),
            time_scale,
            start_wave: self.start_wave.max(1),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    Parse(String),
    InvalidPlayfield { width: f64, height: f64 },
    InvalidTimeScale(f64),
    InvalidStartWave,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::InvalidPlayfield { width, height } => write!(
                f,
                "playfield {width}x{height} is invalid (each edge must be at least {MIN_PLAYFIELD_EDGE})"
            ),
            Self::InvalidTimeScale(scale) => {
                write!(f, "time scale {scale} is outside (0, 4]")
            }
            Self::InvalidStartWave => write!(f, "start wave must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}
