//! Systems that operate on the world state each tick.
//!
//! Systems are plain functions over `&mut WorldState` (or `&WorldState` for
//! read-only). They do not own state; everything lives in the world state and
//! its components.

pub mod cleanup;
pub mod collision;
pub mod damage;
pub mod defense;
pub mod enemy_ai;
pub mod movement;
pub mod player;
pub mod scheduler;
pub mod snapshot;
pub mod wave_spawner;
pub mod weapons;
