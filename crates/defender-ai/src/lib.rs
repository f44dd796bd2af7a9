//! Enemy AI for DEFENDER.
//!
//! Implements per-archetype behavior state machines and the profile table
//! that drives steering, attack cadence and kill rewards.

pub mod fsm;
pub mod profiles;

pub use defender_core as core;

#[cfg(test)]
mod tests;
