//! Player commands sent from the input layer to the simulation.
//!
//! Commands are queued and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Run control ---
    /// Start a run from the main menu.
    StartRun,
    /// Abandon the current run (any phase) and start a fresh one.
    Restart,
    Pause,
    Resume,

    // --- Ship control ---
    /// Current 8-way movement intent.
    SetMovement {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
    },
    /// Aim point in playfield coordinates.
    SetAim { x: f64, y: f64 },
    /// Primary trigger went down.
    FirePressed,
    /// Primary trigger went up.
    FireReleased,

    // --- Abilities ---
    ActivateTimeSlow,
    LaunchMissiles,

    // --- Debug toggles ---
    /// Toggle automatic enemy wave spawning. Asteroids keep spawning.
    ToggleAutoSpawn,
    /// Toggle ability cooldown bypass.
    ToggleCooldownBypass,
}
