//! Collision system: every pairwise test and its damage resolution.
//!
//! Passes run in a fixed order. Each pass snapshots its candidates up front and
//! re-checks `World::contains` before acting, so an entity destroyed by an earlier
//! pass (or earlier in the same pass) is never matched again this tick. Hit lists
//! on piercing ordnance keep a target from being struck twice by the same shot.

use glam::DVec2;
use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;

use defender_core::components::*;
use defender_core::constants::*;
use defender_core::enums::{EnemyMissileKind, ProjectileKind, TargetKind, TelegraphKind};
use defender_core::geometry::{circles_overlap, point_to_segment_distance, segment_projection};
use defender_core::types::{EntityId, Position, Velocity};

use crate::spawn;
use crate::systems::damage::{self, DamageSource, HitResult};
use crate::systems::defense;
use crate::systems::weapons;
use crate::world::WorldState;

/// A damageable body captured at the start of a pass.
#[derive(Debug, Clone, Copy)]
struct Target {
    entity: Entity,
    id: EntityId,
    kind: TargetKind,
    position: DVec2,
    radius: f64,
}

pub fn run(state: &mut WorldState) {
    player_vs_asteroids(state);
    ships_vs_asteroids(state);
    player_projectiles(state);
    player_beams(state);
    player_missiles(state);
    enemy_projectiles(state);
    homing_grenades(state);
    enemy_beams(state);
    stun_bursts(state);
    pickups(state);
}

/// Ships first, then asteroids.
fn collect_targets(world: &World) -> Vec<Target> {
    let mut targets = Vec::new();
    for (entity, (pos, radius, _)) in world.query::<(&Position, &Radius, &EnemyShip)>().iter() {
        targets.push(Target {
            entity,
            id: entity.to_bits().get(),
            kind: TargetKind::Ship,
            position: pos.0,
            radius: radius.0,
        });
    }
    for (entity, (pos, radius, _)) in world.query::<(&Position, &Radius, &Asteroid)>().iter() {
        targets.push(Target {
            entity,
            id: entity.to_bits().get(),
            kind: TargetKind::Asteroid,
            position: pos.0,
            radius: radius.0,
        });
    }
    targets
}

fn collect_asteroids(world: &World) -> Vec<Target> {
    collect_targets(world)
        .into_iter()
        .filter(|t| t.kind == TargetKind::Asteroid)
        .collect()
}

fn strike(state: &mut WorldState, target: &Target, amount: f64, source: DamageSource) -> HitResult {
    match target.kind {
        TargetKind::Ship => damage::damage_ship(state, target.entity, amount, source),
        TargetKind::Asteroid => damage::damage_asteroid(state, target.entity, amount, source),
    }
}

/// At most one asteroid crash per tick; the crash starts a short invulnerability window.
fn player_vs_asteroids(state: &mut WorldState) {
    let now = state.now();
    if defense::is_invulnerable(&state.player, now) {
        return;
    }
    let player_pos = state.player.position;
    let crashed = collect_asteroids(&state.world)
        .into_iter()
        .find(|a| circles_overlap(player_pos, PLAYER_RADIUS, a.position, a.radius));
    let Some(asteroid) = crashed else {
        return;
    };

    defense::damage_player(state, ASTEROID_CONTACT_DAMAGE);
    state.player.invulnerable_until = state
        .player
        .invulnerable_until
        .max(now + CONTACT_INVULNERABLE_SECS);
    damage::destroy_asteroid(state, asteroid.entity, DamageSource::Contact);
}

/// Asteroids bounce off enemy hulls. Each ship/asteroid contact deals ram damage
/// to both sides once, when it begins; the bounce uses the combined hull normal
/// of every ship touched so a repeated pass changes nothing.
fn ships_vs_asteroids(state: &mut WorldState) {
    let targets = collect_targets(&state.world);
    let (ships, asteroids): (Vec<Target>, Vec<Target>) =
        targets.into_iter().partition(|t| t.kind == TargetKind::Ship);

    for asteroid in &asteroids {
        if !state.world.contains(asteroid.entity) {
            continue;
        }
        let touching: Vec<Target> = ships
            .iter()
            .filter(|ship| {
                state.world.contains(ship.entity)
                    && circles_overlap(ship.position, ship.radius, asteroid.position, asteroid.radius)
            })
            .copied()
            .collect();

        let previous = state
            .world
            .get::<&RamContacts>(asteroid.entity)
            .map(|c| c.0.clone())
            .unwrap_or_default();
        let current: Vec<EntityId> = touching.iter().map(|ship| ship.id).collect();
        if current != previous {
            let _ = state
                .world
                .insert_one(asteroid.entity, RamContacts(current));
        }
        if touching.is_empty() {
            continue;
        }

        let normal = touching
            .iter()
            .map(|ship| {
                (asteroid.position - ship.position)
                    .try_normalize()
                    .unwrap_or(DVec2::X)
            })
            .sum::<DVec2>()
            .try_normalize()
            .unwrap_or(DVec2::X);
        if let Ok(vel) = state.world.query_one_mut::<&mut Velocity>(asteroid.entity) {
            let approach = vel.0.dot(normal);
            if approach < 0.0 {
                vel.0 -= 2.0 * approach * normal;
            }
        }

        for ship in touching.iter().filter(|ship| !previous.contains(&ship.id)) {
            damage::damage_ship(state, ship.entity, RAM_DAMAGE, DamageSource::Ram);
            damage::damage_asteroid(state, asteroid.entity, RAM_DAMAGE, DamageSource::Ram);
        }
    }
}

fn player_projectiles(state: &mut WorldState) {
    let targets = collect_targets(&state.world);
    let projectiles: Vec<(Entity, DVec2, f64, DamageSource)> = state
        .world
        .query::<(&Position, &PlayerProjectile)>()
        .iter()
        .map(|(entity, (pos, projectile))| {
            let source = match projectile.kind {
                ProjectileKind::Standard => DamageSource::Bullet,
                ProjectileKind::Shrapnel => DamageSource::Shrapnel,
            };
            (entity, pos.0, projectile.damage, source)
        })
        .collect();

    for (entity, position, amount, source) in projectiles {
        for target in &targets {
            if !state.world.contains(entity) {
                break;
            }
            if !state.world.contains(target.entity)
                || !circles_overlap(position, PROJECTILE_RADIUS, target.position, target.radius)
            {
                continue;
            }

            // Record the hit before damage so a kill's side effects cannot re-match it.
            let spent = {
                let Ok(mut projectile) = state.world.get::<&mut PlayerProjectile>(entity) else {
                    break;
                };
                if projectile.hit.contains(&target.id) {
                    continue;
                }
                projectile.hit.push(target.id);
                if projectile.pierce_remaining > 0 {
                    projectile.pierce_remaining -= 1;
                    false
                } else {
                    true
                }
            };

            strike(state, target, amount, source);
            if spent {
                let _ = state.world.despawn(entity);
                break;
            }
        }
    }
}

/// Charged beams sweep from the ship toward the release point. Targets are struck
/// nearest-first until the beam's hit budget runs out.
fn player_beams(state: &mut WorldState) {
    let origin = state.player.position;
    let beams: Vec<(Entity, PlayerBeam)> = state
        .world
        .query::<&PlayerBeam>()
        .iter()
        .map(|(entity, beam)| (entity, beam.clone()))
        .collect();

    for (entity, beam) in beams {
        let used = (beam.hit_asteroids.len() + beam.hit_ships.len()) as u32;
        let budget = beam.max_hits.saturating_sub(used) as usize;
        if budget == 0 {
            continue;
        }

        let direction = (beam.aim - origin).try_normalize().unwrap_or(DVec2::NEG_Y);
        let end = origin + direction * beam.length;

        let mut candidates: Vec<(f64, Target)> = collect_targets(&state.world)
            .into_iter()
            .filter(|t| match t.kind {
                TargetKind::Ship => !beam.hit_ships.contains(&t.id),
                TargetKind::Asteroid => !beam.hit_asteroids.contains(&t.id),
            })
            .filter_map(|t| {
                let along = segment_projection(t.position, origin, end);
                let within = point_to_segment_distance(t.position, origin, end)
                    <= t.radius + beam.half_width;
                (along >= 0.0 && within).then_some((along, t))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (_, target) in candidates.into_iter().take(budget) {
            if !state.world.contains(target.entity) {
                continue;
            }
            if let Ok(mut live) = state.world.get::<&mut PlayerBeam>(entity) {
                match target.kind {
                    TargetKind::Ship => live.hit_ships.push(target.id),
                    TargetKind::Asteroid => live.hit_asteroids.push(target.id),
                }
            }
            strike(state, &target, beam.damage, DamageSource::Beam);
        }
    }
}

/// Missiles detonate on the first body they touch. A hit on a shielded ship may
/// instead ricochet toward a fresh random target.
fn player_missiles(state: &mut WorldState) {
    let targets = collect_targets(&state.world);
    let missiles: Vec<(Entity, DVec2)> = state
        .world
        .query::<(&Position, &PlayerMissile)>()
        .iter()
        .map(|(entity, (pos, _))| (entity, pos.0))
        .collect();

    for (entity, position) in missiles {
        let Ok((amount, ricochets, already_hit)) = state
            .world
            .get::<&PlayerMissile>(entity)
            .map(|m| (m.damage, m.ricochets, m.hit.clone()))
        else {
            continue;
        };

        let struck = targets.iter().find(|t| {
            !already_hit.contains(&t.id)
                && state.world.contains(t.entity)
                && circles_overlap(position, MISSILE_RADIUS, t.position, t.radius)
        });
        let Some(target) = struck.copied() else {
            continue;
        };

        if let Ok(mut missile) = state.world.get::<&mut PlayerMissile>(entity) {
            missile.hit.push(target.id);
        }
        let result = strike(state, &target, amount, DamageSource::Missile);

        let ricochet = result.had_shield
            && ricochets < MISSILE_MAX_RICOCHETS
            && state.rng.gen_bool(MISSILE_RICOCHET_CHANCE);
        if ricochet && redirect_missile(state, entity, position) {
            continue;
        }
        let _ = state.world.despawn(entity);
    }
}

/// Point a ricocheting missile at a random live target it has not struck yet.
/// Returns false when no such target exists.
fn redirect_missile(state: &mut WorldState, entity: Entity, from: DVec2) -> bool {
    let hit = match state.world.get::<&PlayerMissile>(entity) {
        Ok(missile) => missile.hit.clone(),
        Err(_) => return false,
    };
    let candidates: Vec<MissileTarget> = weapons::live_targets(state)
        .into_iter()
        .filter(|t| !hit.contains(&t.id))
        .collect();
    let Some(next) = candidates.choose(&mut state.rng).copied() else {
        return false;
    };
    let Some(aim) = Entity::from_bits(next.id)
        .and_then(|e| state.world.get::<&Position>(e).ok().map(|p| p.0))
    else {
        return false;
    };

    let Ok((missile, vel)) = state
        .world
        .query_one_mut::<(&mut PlayerMissile, &mut Velocity)>(entity)
    else {
        return false;
    };
    missile.target = Some(next);
    missile.damage *= MISSILE_RICOCHET_DAMAGE_FACTOR;
    missile.ricochets += 1;
    missile.age = 0.0;
    vel.0 = (aim - from).try_normalize().unwrap_or(DVec2::NEG_Y) * MISSILE_SPEED;
    true
}

/// Shared resolution for enemy ordnance that strikes the player or the first asteroid it meets.
fn resolve_enemy_shot(
    state: &mut WorldState,
    asteroids: &[Target],
    entity: Entity,
    position: DVec2,
    radius: f64,
    amount: f64,
) {
    if circles_overlap(position, radius, state.player.position, PLAYER_RADIUS) {
        defense::damage_player(state, amount);
        let _ = state.world.despawn(entity);
        return;
    }
    let struck = asteroids.iter().find(|a| {
        state.world.contains(a.entity) && circles_overlap(position, radius, a.position, a.radius)
    });
    if let Some(asteroid) = struck.copied() {
        damage::damage_asteroid(state, asteroid.entity, amount, DamageSource::Enemy);
        let _ = state.world.despawn(entity);
    }
}

fn enemy_projectiles(state: &mut WorldState) {
    let asteroids = collect_asteroids(&state.world);
    let shots: Vec<(Entity, DVec2, f64)> = state
        .world
        .query::<(&Position, &EnemyProjectile)>()
        .iter()
        .map(|(entity, (pos, shot))| (entity, pos.0, shot.damage))
        .collect();

    for (entity, position, amount) in shots {
        resolve_enemy_shot(state, &asteroids, entity, position, ENEMY_SHOT_RADIUS, amount);
    }
}

fn homing_grenades(state: &mut WorldState) {
    let asteroids = collect_asteroids(&state.world);
    let grenades: Vec<(Entity, DVec2, f64)> = state
        .world
        .query::<(&Position, &EnemyMissile)>()
        .iter()
        .filter(|(_, (_, grenade))| grenade.kind == EnemyMissileKind::HomingGrenade)
        .map(|(entity, (pos, grenade))| (entity, pos.0, grenade.damage))
        .collect();

    for (entity, position, amount) in grenades {
        resolve_enemy_shot(state, &asteroids, entity, position, GRENADE_RADIUS, amount);
    }
}

/// Fired enemy beams deal their damage exactly once, on the first pass after firing.
fn enemy_beams(state: &mut WorldState) {
    let mut fired: Vec<EnemyBeam> = Vec::new();
    for (_entity, beam) in state.world.query_mut::<&mut EnemyBeam>() {
        if !beam.resolved {
            beam.resolved = true;
            fired.push(*beam);
        }
    }

    for beam in fired {
        let miss = point_to_segment_distance(state.player.position, beam.origin, beam.end);
        if miss <= beam.half_width + PLAYER_RADIUS {
            let landed = defense::damage_player(state, beam.damage);
            if landed && beam.kind == TelegraphKind::SnapBeam {
                defense::stun_player(state, SNAP_STUN_SECS);
            }
        }

        if beam.kind == TelegraphKind::SniperBeam {
            for asteroid in collect_asteroids(&state.world) {
                let miss = point_to_segment_distance(asteroid.position, beam.origin, beam.end);
                if miss <= asteroid.radius + beam.half_width {
                    damage::damage_asteroid(state, asteroid.entity, beam.damage, DamageSource::Enemy);
                }
            }
        }
    }
}

/// Lobbed grenades burst when their fuse runs out, stunning everything nearby
/// except the ship that threw them.
fn stun_bursts(state: &mut WorldState) {
    let now = state.now();
    let bursts: Vec<(Entity, DVec2, EntityId)> = state
        .world
        .query::<(&Position, &EnemyMissile)>()
        .iter()
        .filter(|(_, (_, grenade))| {
            grenade.kind == EnemyMissileKind::StunGrenade && now >= grenade.fuse_at
        })
        .map(|(entity, (pos, grenade))| (entity, pos.0, grenade.owner))
        .collect();

    for (entity, center, owner) in bursts {
        let until = now + STUN_DURATION_SECS;
        let caught: Vec<Entity> = collect_targets(&state.world)
            .into_iter()
            .filter(|t| t.id != owner && t.position.distance(center) <= STUN_GRENADE_RADIUS)
            .map(|t| t.entity)
            .collect();
        for target in caught {
            let existing = state
                .world
                .get::<&Stunned>(target)
                .map(|s| s.until_secs)
                .unwrap_or(0.0);
            let _ = state.world.insert_one(
                target,
                Stunned {
                    until_secs: existing.max(until),
                },
            );
        }

        if state.player.position.distance(center) <= STUN_GRENADE_RADIUS {
            defense::stun_player(state, STUN_DURATION_SECS);
        }

        spawn::spawn_particles(&mut state.world, &mut state.rng, center);
        let _ = state.world.despawn(entity);
    }
}

fn pickups(state: &mut WorldState) {
    let player_pos = state.player.position;
    let collected: Vec<(Entity, PowerUp)> = state
        .world
        .query::<(&Position, &PowerUp)>()
        .iter()
        .filter(|(_, (pos, _))| pos.0.distance(player_pos) <= POWER_UP_PICKUP_RADIUS)
        .map(|(entity, (_, power_up))| (entity, *power_up))
        .collect();

    for (entity, power_up) in collected {
        defense::apply_power_up(state, power_up.kind);
        let _ = state.world.despawn(entity);
    }
}
