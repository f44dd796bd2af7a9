//! Game state snapshot: the complete visible state handed to the renderer each tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::AudioEvent;
use crate::types::{EntityId, SimTime};

/// Complete game state published after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub score: u64,
    pub wave: WaveView,
    pub player: PlayerView,
    pub buffs: Vec<BuffView>,
    pub asteroids: Vec<AsteroidView>,
    pub ships: Vec<ShipView>,
    pub projectiles: Vec<ProjectileView>,
    pub beams: Vec<BeamView>,
    pub missiles: Vec<MissileView>,
    pub enemy_projectiles: Vec<ProjectileView>,
    pub enemy_missiles: Vec<EnemyMissileView>,
    pub enemy_beams: Vec<BeamView>,
    pub power_ups: Vec<PowerUpView>,
    pub particles: Vec<ParticleView>,
    pub target_lock: Option<TargetLockView>,
    pub audio_events: Vec<AudioEvent>,
    pub cheats: CheatView,
    /// Set once the player has died with no resurrection left.
    pub game_over: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    pub number: u32,
    pub phase: WavePhase,
    /// Ships of the current wave still alive.
    pub ships_alive: u32,
    /// Ships of the current wave not spawned yet.
    pub ships_pending: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: DVec2,
    pub velocity: DVec2,
    pub aim: DVec2,
    pub hp: f64,
    pub shield: f64,
    /// Portion of `shield` above the base cap.
    pub overshield: f64,
    pub resurrections: u32,
    pub stunned: bool,
    pub invulnerable: bool,
    /// Factor applied to hostile motion this tick (1.0 = normal).
    pub time_dilation: f64,
    pub time_slow_cooldown_secs: f64,
    pub missiles_cooldown_secs: f64,
    /// Current charge, 0.0 to 1.0 (0 when the trigger is up).
    pub charge_ratio: f64,
    pub spin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffView {
    pub kind: BuffKind,
    pub remaining_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsteroidView {
    pub id: EntityId,
    pub kind: AsteroidKind,
    pub position: DVec2,
    pub velocity: DVec2,
    pub rotation: f64,
    pub size: f64,
    pub hp: f64,
    pub max_hp: f64,
    pub stunned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipView {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub position: DVec2,
    pub rotation: f64,
    pub hp: f64,
    pub max_hp: f64,
    pub shield: f64,
    pub max_shield: f64,
    pub stunned: bool,
    pub telegraph: Option<TelegraphView>,
}

/// A warning line from a ship to its aim point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegraphView {
    pub kind: TelegraphKind,
    pub from: DVec2,
    pub to: DVec2,
    /// 0.0 at telegraph start, 1.0 when the attack fires.
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub kind: ProjectileKind,
    pub position: DVec2,
    pub velocity: DVec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamView {
    pub from: DVec2,
    pub to: DVec2,
    pub half_width: f64,
    pub remaining_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissileView {
    pub id: EntityId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub target: Option<EntityId>,
    pub ricochets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyMissileView {
    pub id: EntityId,
    pub kind: EnemyMissileKind,
    pub position: DVec2,
    pub velocity: DVec2,
    /// Seconds until a lobbed grenade bursts.
    pub fuse_secs: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpView {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub position: DVec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleView {
    pub position: DVec2,
    pub life: f64,
    pub size: f64,
}

/// Nearest asteroid to the aim point, with a lead point for aiming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetLockView {
    pub id: EntityId,
    pub position: DVec2,
    pub lead_point: DVec2,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CheatView {
    pub auto_spawn_disabled: bool,
    pub cooldown_bypass: bool,
}
