//! Simulation engine for the arcade defender.
//!
//! Owns the hecs entity store, runs systems at a fixed tick rate,
//! and produces GameStateSnapshots for the renderer.

pub mod engine;
pub mod spawn;
pub mod systems;
pub mod world;

pub use defender_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
