//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Asteroid archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidKind {
    #[default]
    Normal,
    /// Small and quick; also the archetype of split children.
    Fast,
    /// Large, slow and tough. Scores double.
    Armored,
    /// Breaks into three fast children when destroyed.
    Splitting,
}

/// Enemy ship archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Single aimed shots from a medium stand-off.
    #[default]
    Fighter,
    /// Long-range telegraphed beam.
    Sniper,
    /// Shielded, rapid low-damage fire.
    Captain,
    /// Closes in and fires a five-shot fan.
    Aggressive,
    /// Launches slow homing grenades.
    Grenadier,
    /// Wave boss: heavy armor plus stun grenade and snap beam specials.
    Tank,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Fighter,
        EnemyKind::Sniper,
        EnemyKind::Captain,
        EnemyKind::Aggressive,
        EnemyKind::Grenadier,
        EnemyKind::Tank,
    ];
}

/// Player projectile archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Tap-fire and rapid-fire bullet.
    #[default]
    Standard,
    /// Spread pellet. Kills pop for area damage.
    Shrapnel,
}

/// Floating pickup kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    #[default]
    Health,
    Shield,
    Overshield,
    RapidFire,
    Spread,
    Missiles,
}

/// Timed buff kind. Rapid-fire and spread are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffKind {
    RapidFire,
    Spread,
}

/// Which entity family a homing missile is chasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Asteroid,
    Ship,
}

/// Kind of telegraphed enemy attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelegraphKind {
    /// Sniper charge line ending in a heavy beam.
    SniperBeam,
    /// Tank snap beam that stuns the player.
    SnapBeam,
}

/// Enemy missile archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyMissileKind {
    /// Grenadier round: homes for a limited window, then flies straight.
    HomingGrenade,
    /// Tank grenade: lobbed at a point, bursts after a fuse and stuns.
    StunGrenade,
}

/// Overall run phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    MainMenu,
    Active,
    Paused,
    GameOver,
}

/// Wave scheduler phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// No wave announced (run start, or enemy spawning disabled).
    #[default]
    Idle,
    /// Wave announced, ships not yet spawning.
    Incoming,
    /// Ships spawning or still alive.
    InProgress,
    /// Delay between waves.
    Intermission,
}
