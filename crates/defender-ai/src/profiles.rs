//! Archetype-specific behavioral profiles.
//!
//! Consolidates per-archetype parameters for the enemy FSM, the spawner and scoring.

use defender_core::enums::EnemyKind;

/// Behavioral profile for an enemy archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub max_hp: f64,
    /// Zero for unshielded archetypes.
    pub max_shield: f64,
    /// Cruise speed cap (px/s).
    pub speed: f64,
    /// Collision radius (px).
    pub radius: f64,
    /// Preferred distance from the player.
    pub standoff: f64,
    /// Half-width of the band around `standoff` where the ship holds position.
    pub standoff_tolerance: f64,
    /// Maximum distance at which the ship opens fire.
    pub engage_range: f64,
    /// Seconds between primary attacks.
    pub fire_cooldown: f64,
    pub shot_speed: f64,
    pub shot_damage: f64,
    /// Score awarded to the player for the kill.
    pub score: u64,
}

/// Get the behavioral profile for a given archetype.
pub fn get_profile(kind: EnemyKind) -> EnemyProfile {
    match kind {
        EnemyKind::Fighter => EnemyProfile {
            max_hp: 6.0,
            max_shield: 0.0,
            speed: 150.0,
            radius: 16.0,
            standoff: 320.0,
            standoff_tolerance: 60.0,
            engage_range: 550.0,
            fire_cooldown: 1.6,
            shot_speed: 300.0,
            shot_damage: 8.0,
            score: 100,
        },
        EnemyKind::Sniper => EnemyProfile {
            max_hp: 5.0,
            max_shield: 0.0,
            speed: 110.0,
            radius: 14.0,
            standoff: 520.0,
            standoff_tolerance: 80.0,
            engage_range: 900.0,
            fire_cooldown: 4.5,
            shot_speed: 0.0,
            shot_damage: defender_core::constants::SNIPER_BEAM_DAMAGE,
            score: 150,
        },
        EnemyKind::Captain => EnemyProfile {
            max_hp: 10.0,
            max_shield: 12.0,
            speed: 130.0,
            radius: 20.0,
            standoff: 360.0,
            standoff_tolerance: 60.0,
            engage_range: 600.0,
            fire_cooldown: 0.45,
            shot_speed: 380.0,
            shot_damage: 3.0,
            score: 200,
        },
        EnemyKind::Aggressive => EnemyProfile {
            max_hp: 8.0,
            max_shield: 0.0,
            speed: 190.0,
            radius: 16.0,
            standoff: 160.0,
            standoff_tolerance: 40.0,
            engage_range: 260.0,
            fire_cooldown: 3.0,
            shot_speed: 320.0,
            shot_damage: 6.0,
            score: 150,
        },
        EnemyKind::Grenadier => EnemyProfile {
            max_hp: 9.0,
            max_shield: 0.0,
            speed: 100.0,
            radius: 18.0,
            standoff: 420.0,
            standoff_tolerance: 70.0,
            engage_range: 700.0,
            fire_cooldown: 3.5,
            shot_speed: defender_core::constants::GRENADE_SPEED,
            shot_damage: defender_core::constants::GRENADE_DAMAGE,
            score: 175,
        },
        EnemyKind::Tank => EnemyProfile {
            max_hp: 60.0,
            max_shield: 40.0,
            speed: 70.0,
            radius: 34.0,
            standoff: 260.0,
            standoff_tolerance: 50.0,
            engage_range: 600.0,
            fire_cooldown: 1.2,
            shot_speed: 300.0,
            shot_damage: 10.0,
            score: 1000,
        },
    }
}
