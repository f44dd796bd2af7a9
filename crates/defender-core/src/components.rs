//! ECS components for hecs entities, plus the player record.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::*;
use crate::types::EntityId;

/// Hit points. Destroyed at `current <= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

/// Depletable shield layer, absorbed before hit points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub current: f64,
    pub max: f64,
}

/// Movement freeze. Present only while an entity is (or was recently) stunned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stunned {
    pub until_secs: f64,
}

/// Visual rotation of a tumbling body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    pub angle: f64,
    /// Radians per second.
    pub rate: f64,
}

/// Collision radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Radius(pub f64);

/// Asteroid marker and archetype data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub kind: AsteroidKind,
    /// Radius in pixels; also the basis for score.
    pub size: f64,
}

/// Ships an asteroid was overlapping at the last collision pass.
/// Ram damage is dealt only when a contact begins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RamContacts(pub Vec<EntityId>);

/// A pending telegraphed attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telegraph {
    pub kind: TelegraphKind,
    /// World point the attack is aimed at, fixed when the telegraph starts.
    pub aim: DVec2,
    pub started_at: f64,
    pub fires_at: f64,
}

/// Enemy ship state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyShip {
    pub kind: EnemyKind,
    /// Facing (radians).
    pub rotation: f64,
    /// Wave this ship was spawned for.
    pub wave: u32,
    pub next_fire_at: f64,
    /// Tank stun grenade cooldown.
    pub next_grenade_at: f64,
    /// Tank snap beam cooldown.
    pub next_snap_at: f64,
    pub telegraph: Option<Telegraph>,
}

/// Player-fired bullet or pellet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProjectile {
    pub kind: ProjectileKind,
    pub damage: f64,
    /// Additional targets this projectile may pass through.
    pub pierce_remaining: u32,
    pub traveled: f64,
    pub max_range: f64,
    /// Targets already struck. Never contains duplicates.
    pub hit: Vec<EntityId>,
}

/// Charged railcannon beam. Its origin follows the player ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBeam {
    /// Point the beam was released toward.
    pub aim: DVec2,
    pub damage: f64,
    pub length: f64,
    pub half_width: f64,
    /// Total targets this beam may strike over its lifetime.
    pub max_hits: u32,
    pub expires_at: f64,
    pub hit_asteroids: Vec<EntityId>,
    pub hit_ships: Vec<EntityId>,
}

/// Homing target of a player missile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissileTarget {
    pub id: EntityId,
    pub kind: TargetKind,
}

/// Player homing missile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMissile {
    pub target: Option<MissileTarget>,
    pub damage: f64,
    pub ricochets: u32,
    /// Seconds since launch (or since the last ricochet).
    pub age: f64,
    pub expires_at: f64,
    pub hit: Vec<EntityId>,
}

/// Enemy bullet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub damage: f64,
}

/// Enemy grenade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyMissile {
    pub kind: EnemyMissileKind,
    pub damage: f64,
    pub age: f64,
    pub expires_at: f64,
    /// Ship that launched it. Immune to its own stun burst.
    pub owner: EntityId,
    /// Landing point for lobbed grenades.
    pub destination: DVec2,
    /// Burst time for lobbed grenades.
    pub fuse_at: f64,
}

/// Fired enemy beam. Damage is resolved once, the beam then lingers for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyBeam {
    pub kind: TelegraphKind,
    pub origin: DVec2,
    pub end: DVec2,
    pub damage: f64,
    pub half_width: f64,
    pub resolved: bool,
    pub expires_at: f64,
}

/// Floating pickup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
}

/// Cosmetic debris. Excluded from collisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Remaining life, 1.0 down to 0.0.
    pub life: f64,
    pub size: f64,
}

/// Timed weapon buff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub kind: BuffKind,
    pub started_at: f64,
    pub expires_at: f64,
}

/// The player ship. Held directly by the world state rather than spawned as an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: DVec2,
    pub velocity: DVec2,
    pub hp: f64,
    /// Single pool: the part above `BASE_SHIELD_MAX` is overshield and drains first.
    pub shield: f64,
    pub resurrections: u32,
    pub stun_until: f64,
    pub invulnerable_until: f64,
    pub last_damage_at: f64,
    pub buffs: Vec<ActiveBuff>,
    /// Start of the current charge hold, if the trigger is down.
    pub charge_started_at: Option<f64>,
    pub next_shot_at: f64,
    /// Continuous-fire spin, 0.0 to 1.0.
    pub spin: f64,
    pub time_slow_until: f64,
    pub time_slow_ready_at: f64,
    pub missiles_ready_at: f64,
    pub grace_until: f64,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: DVec2::new(PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT / 2.0),
            velocity: DVec2::ZERO,
            hp: PLAYER_MAX_HP,
            shield: BASE_SHIELD_MAX,
            resurrections: PLAYER_RESURRECTIONS,
            stun_until: 0.0,
            invulnerable_until: 0.0,
            last_damage_at: 0.0,
            buffs: Vec::new(),
            charge_started_at: None,
            next_shot_at: 0.0,
            spin: 0.0,
            time_slow_until: 0.0,
            time_slow_ready_at: 0.0,
            missiles_ready_at: 0.0,
            grace_until: 0.0,
        }
    }
}
