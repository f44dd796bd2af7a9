//! Fundamental geometric and simulation types.
//!
//! Screen-space coordinates: x grows to the right, y grows downward, units are pixels.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D position on the playfield (pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// 2D velocity (pixels per second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Velocity {
    /// Speed magnitude (px/s).
    pub fn speed(&self) -> f64 {
        self.0.length()
    }

    /// Heading in radians (0 = +x, counter-clockwise in math convention).
    pub fn heading(&self) -> f64 {
        self.0.y.atan2(self.0.x)
    }
}

impl SimTime {
    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 * self.dt();
    }

    /// The tick at which `secs` from now has elapsed (rounded up to a whole tick).
    pub fn tick_after(&self, secs: f64) -> u64 {
        let ticks = (secs.max(0.0) * crate::constants::TICK_RATE as f64 - 1e-9).ceil() as u64;
        self.tick + ticks
    }
}

/// Stable entity identifier exposed outside the entity store (`hecs::Entity::to_bits`).
pub type EntityId = u64;
