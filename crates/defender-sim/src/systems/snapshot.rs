//! Snapshot system: reads the world state and builds a complete GameStateSnapshot.
//!
//! This system is read-only. It never modifies the world.

use glam::DVec2;
use hecs::World;

use defender_core::components::*;
use defender_core::constants::*;
use defender_core::enums::{EnemyMissileKind, GamePhase, ProjectileKind};
use defender_core::events::AudioEvent;
use defender_core::state::*;
use defender_core::types::{Position, Velocity};

use crate::systems::{wave_spawner, weapons};
use crate::world::WorldState;

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(state: &WorldState, audio_events: Vec<AudioEvent>) -> GameStateSnapshot {
    let now = state.now();
    let world = &state.world;

    GameStateSnapshot {
        time: state.time,
        phase: state.phase,
        score: state.score,
        wave: WaveView {
            number: state.wave.number,
            phase: state.wave.phase,
            ships_alive: wave_spawner::ships_alive(state, state.wave.number),
            ships_pending: state.wave.pending_spawns,
        },
        player: build_player(state),
        buffs: state
            .player
            .buffs
            .iter()
            .filter(|b| b.expires_at > now)
            .map(|b| BuffView {
                kind: b.kind,
                remaining_secs: b.expires_at - now,
            })
            .collect(),
        asteroids: build_asteroids(world, now),
        ships: build_ships(world, now),
        projectiles: build_projectiles(world),
        beams: build_beams(world, state.player.position, now),
        missiles: build_missiles(world),
        enemy_projectiles: build_enemy_projectiles(world),
        enemy_missiles: build_enemy_missiles(world, now),
        enemy_beams: build_enemy_beams(world, now),
        power_ups: build_power_ups(world),
        particles: world
            .query::<(&Position, &Particle)>()
            .iter()
            .map(|(_, (pos, particle))| ParticleView {
                position: pos.0,
                life: particle.life,
                size: particle.size,
            })
            .collect(),
        target_lock: find_target_lock(world, state.input.aim),
        audio_events,
        cheats: CheatView {
            auto_spawn_disabled: state.cheats.auto_spawn_disabled,
            cooldown_bypass: state.cheats.cooldown_bypass,
        },
        game_over: state.phase == GamePhase::GameOver,
    }
}

fn build_player(state: &WorldState) -> PlayerView {
    let now = state.now();
    let player = &state.player;
    let stunned = now < player.stun_until;

    let charge_ratio = match player.charge_started_at {
        Some(started) if weapons::active_weapon_buff(state).is_none() => {
            weapons::charge_ratio(now - started, stunned)
        }
        _ => 0.0,
    };

    PlayerView {
        position: player.position,
        velocity: player.velocity,
        aim: state.input.aim,
        hp: player.hp,
        shield: player.shield,
        overshield: (player.shield - BASE_SHIELD_MAX).max(0.0),
        resurrections: player.resurrections,
        stunned,
        invulnerable: now < player.invulnerable_until,
        time_dilation: state.time_dilation,
        time_slow_cooldown_secs: (player.time_slow_ready_at - now).max(0.0),
        missiles_cooldown_secs: (player.missiles_ready_at - now).max(0.0),
        charge_ratio,
        spin: player.spin,
    }
}

fn is_stunned(stun: Option<&Stunned>, now: f64) -> bool {
    stun.is_some_and(|s| now < s.until_secs)
}

fn build_asteroids(world: &World, now: f64) -> Vec<AsteroidView> {
    let mut views: Vec<AsteroidView> = world
        .query::<(
            &Asteroid,
            &Position,
            &Velocity,
            &Spin,
            &Health,
            Option<&Stunned>,
        )>()
        .iter()
        .map(|(entity, (asteroid, pos, vel, spin, health, stun))| AsteroidView {
            id: entity.to_bits().get(),
            kind: asteroid.kind,
            position: pos.0,
            velocity: vel.0,
            rotation: spin.angle,
            size: asteroid.size,
            hp: health.current,
            max_hp: health.max,
            stunned: is_stunned(stun, now),
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

fn build_ships(world: &World, now: f64) -> Vec<ShipView> {
    let mut views: Vec<ShipView> = world
        .query::<(
            &EnemyShip,
            &Position,
            &Health,
            Option<&Shield>,
            Option<&Stunned>,
        )>()
        .iter()
        .map(|(entity, (ship, pos, health, shield, stun))| ShipView {
            id: entity.to_bits().get(),
            kind: ship.kind,
            position: pos.0,
            rotation: ship.rotation,
            hp: health.current,
            max_hp: health.max,
            shield: shield.map_or(0.0, |s| s.current),
            max_shield: shield.map_or(0.0, |s| s.max),
            stunned: is_stunned(stun, now),
            telegraph: ship.telegraph.map(|t| {
                let window = t.fires_at - t.started_at;
                let progress = if window > 0.0 {
                    ((now - t.started_at) / window).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                TelegraphView {
                    kind: t.kind,
                    from: pos.0,
                    to: t.aim,
                    progress,
                }
            }),
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut views: Vec<ProjectileView> = world
        .query::<(&PlayerProjectile, &Position, &Velocity)>()
        .iter()
        .map(|(entity, (projectile, pos, vel))| ProjectileView {
            id: entity.to_bits().get(),
            kind: projectile.kind,
            position: pos.0,
            velocity: vel.0,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

/// Player beams are drawn from the ship's current position.
fn build_beams(world: &World, origin: DVec2, now: f64) -> Vec<BeamView> {
    world
        .query::<&PlayerBeam>()
        .iter()
        .map(|(_, beam)| {
            let direction = (beam.aim - origin).try_normalize().unwrap_or(DVec2::NEG_Y);
            BeamView {
                from: origin,
                to: origin + direction * beam.length,
                half_width: beam.half_width,
                remaining_secs: (beam.expires_at - now).max(0.0),
            }
        })
        .collect()
}

fn build_missiles(world: &World) -> Vec<MissileView> {
    let mut views: Vec<MissileView> = world
        .query::<(&PlayerMissile, &Position, &Velocity)>()
        .iter()
        .map(|(entity, (missile, pos, vel))| MissileView {
            id: entity.to_bits().get(),
            position: pos.0,
            velocity: vel.0,
            target: missile.target.map(|t| t.id),
            ricochets: missile.ricochets,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

fn build_enemy_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut views: Vec<ProjectileView> = world
        .query::<(&EnemyProjectile, &Position, &Velocity)>()
        .iter()
        .map(|(entity, (_, pos, vel))| ProjectileView {
            id: entity.to_bits().get(),
            kind: ProjectileKind::Standard,
            position: pos.0,
            velocity: vel.0,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

fn build_enemy_missiles(world: &World, now: f64) -> Vec<EnemyMissileView> {
    let mut views: Vec<EnemyMissileView> = world
        .query::<(&EnemyMissile, &Position, &Velocity)>()
        .iter()
        .map(|(entity, (grenade, pos, vel))| EnemyMissileView {
            id: entity.to_bits().get(),
            kind: grenade.kind,
            position: pos.0,
            velocity: vel.0,
            fuse_secs: (grenade.kind == EnemyMissileKind::StunGrenade)
                .then(|| (grenade.fuse_at - now).max(0.0)),
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

fn build_enemy_beams(world: &World, now: f64) -> Vec<BeamView> {
    world
        .query::<&EnemyBeam>()
        .iter()
        .map(|(_, beam)| BeamView {
            from: beam.origin,
            to: beam.end,
            half_width: beam.half_width,
            remaining_secs: (beam.expires_at - now).max(0.0),
        })
        .collect()
}

fn build_power_ups(world: &World) -> Vec<PowerUpView> {
    let mut views: Vec<PowerUpView> = world
        .query::<(&PowerUp, &Position)>()
        .iter()
        .map(|(entity, (power_up, pos))| PowerUpView {
            id: entity.to_bits().get(),
            kind: power_up.kind,
            position: pos.0,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

/// Nearest asteroid within lock range of the aim point, with a short-horizon lead point.
fn find_target_lock(world: &World, aim: DVec2) -> Option<TargetLockView> {
    world
        .query::<(&Asteroid, &Position, &Velocity)>()
        .iter()
        .map(|(entity, (_, pos, vel))| (entity, pos.0, vel.0, pos.0.distance(aim)))
        .filter(|&(_, _, _, d)| d <= TARGET_LOCK_RADIUS)
        .min_by(|a, b| a.3.total_cmp(&b.3))
        .map(|(entity, position, velocity, _)| TargetLockView {
            id: entity.to_bits().get(),
            position,
            lead_point: position + velocity * TARGET_LEAD_SECS,
        })
}
