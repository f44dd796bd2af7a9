//! Damage application and kill handling.
//!
//! All damage to asteroids and enemy ships goes through here: the shield-first
//! absorption rule, score awards, drop rolls, split children and shrapnel pops.
//! Destroyed entities are despawned immediately so later collision passes in the
//! same tick cannot match them again.

use glam::DVec2;
use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use defender_core::components::{Asteroid, EnemyShip, Health, Shield};
use defender_core::constants::*;
use defender_core::enums::{AsteroidKind, EnemyKind, PowerUpKind};
use defender_core::types::Position;

use defender_ai::profiles::get_profile;

use crate::spawn;
use crate::world::WorldState;

/// What dealt the damage. Drives score multipliers and secondary effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Bullet,
    /// Spread pellet; kills trigger a shrapnel pop.
    Shrapnel,
    /// Charged railcannon beam; asteroid kills score double.
    Beam,
    Missile,
    /// Area damage from a shrapnel pop. Does not chain.
    ShrapnelPop,
    /// Enemy projectiles, grenades and beams.
    Enemy,
    /// Ship and asteroid grinding into each other.
    Ram,
    /// Asteroid crashing into the player. Awards nothing.
    Contact,
}

/// Result of one damage application on a health/shield pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageOutcome {
    pub shield_absorbed: f64,
    pub hp_lost: f64,
    pub killed: bool,
}

/// Result of striking an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitResult {
    /// The entity existed and took the hit.
    pub landed: bool,
    pub killed: bool,
    /// Target had shield points when struck.
    pub had_shield: bool,
}

/// Shield-first damage rule.
///
/// Blows at or above `INSTANT_KILL_THRESHOLD` skip the shield entirely. Smaller
/// blows drain the shield first; only the remainder reaches hit points.
/// Both pools are clamped at zero.
pub fn apply_damage(health: &mut Health, shield: Option<&mut Shield>, amount: f64) -> DamageOutcome {
    let amount = amount.max(0.0);
    let mut outcome = DamageOutcome::default();
    let mut remainder = amount;

    if amount < INSTANT_KILL_THRESHOLD {
        if let Some(shield) = shield {
            let absorbed = remainder.min(shield.current.max(0.0));
            shield.current = (shield.current - absorbed).max(0.0);
            remainder -= absorbed;
            outcome.shield_absorbed = absorbed;
        }
    }

    let before = health.current;
    health.current = (health.current - remainder).max(0.0);
    outcome.hp_lost = before - health.current;
    outcome.killed = health.current <= 0.0;
    outcome
}

/// Damage an asteroid, destroying it at zero hit points.
pub fn damage_asteroid(
    state: &mut WorldState,
    entity: Entity,
    amount: f64,
    source: DamageSource,
) -> HitResult {
    let killed = match state.world.get::<&mut Health>(entity) {
        Ok(mut health) => apply_damage(&mut *health, None, amount).killed,
        Err(_) => return HitResult::default(),
    };
    if killed {
        destroy_asteroid(state, entity, source);
    }
    HitResult {
        landed: true,
        killed,
        had_shield: false,
    }
}

/// Damage an enemy ship through its shield, destroying it at zero hit points.
pub fn damage_ship(
    state: &mut WorldState,
    entity: Entity,
    amount: f64,
    source: DamageSource,
) -> HitResult {
    let (killed, had_shield) =
        match state
            .world
            .query_one_mut::<(&mut Health, Option<&mut Shield>)>(entity)
        {
            Ok((health, shield)) => {
                let had_shield = shield.as_ref().is_some_and(|s| s.current > 0.0);
                (apply_damage(health, shield, amount).killed, had_shield)
            }
            Err(_) => return HitResult::default(),
        };
    if killed {
        destroy_ship(state, entity, source);
    }
    HitResult {
        landed: true,
        killed,
        had_shield,
    }
}

/// Remove an asteroid with full kill side effects.
pub fn destroy_asteroid(state: &mut WorldState, entity: Entity, source: DamageSource) {
    let (asteroid, position) = {
        let Ok(asteroid) = state.world.get::<&Asteroid>(entity).map(|a| *a) else {
            return;
        };
        let Ok(position) = state.world.get::<&Position>(entity).map(|p| p.0) else {
            return;
        };
        (asteroid, position)
    };
    let _ = state.world.despawn(entity);

    if source != DamageSource::Contact {
        let awarded = asteroid_score(&asteroid, source);
        state.score += awarded;
        debug!(kind = ?asteroid.kind, awarded, ?source, "asteroid destroyed");

        if state.rng.gen_bool(ASTEROID_DROP_CHANCE) {
            let kind = roll_power_up(state);
            spawn::spawn_power_up(&mut state.world, &mut state.rng, kind, position);
        }
    }

    spawn::spawn_particles(&mut state.world, &mut state.rng, position);

    if asteroid.kind == AsteroidKind::Splitting {
        spawn::spawn_split_children(&mut state.world, &mut state.rng, position);
    }

    if source == DamageSource::Shrapnel {
        shrapnel_pop(state, position);
    }
}

/// `floor(size * archetype multiplier)`, doubled for beam kills.
pub fn asteroid_score(asteroid: &Asteroid, source: DamageSource) -> u64 {
    let multiplier = match asteroid.kind {
        AsteroidKind::Armored => 2.0,
        AsteroidKind::Normal | AsteroidKind::Fast | AsteroidKind::Splitting => 1.0,
    };
    let base = (asteroid.size * multiplier).floor() as u64;
    if source == DamageSource::Beam {
        base * RAIL_SCORE_MULTIPLIER
    } else {
        base
    }
}

fn destroy_ship(state: &mut WorldState, entity: Entity, source: DamageSource) {
    let Ok(kind) = state.world.get::<&EnemyShip>(entity).map(|s| s.kind) else {
        return;
    };
    let Ok(position) = state.world.get::<&Position>(entity).map(|p| p.0) else {
        return;
    };
    let _ = state.world.despawn(entity);

    let awarded = get_profile(kind).score;
    state.score += awarded;
    if kind == EnemyKind::Tank {
        info!(awarded, ?source, "tank destroyed");
    } else {
        debug!(?kind, awarded, ?source, "ship destroyed");
    }

    let drop = if kind == EnemyKind::Tank || state.rng.gen_bool(SHIP_OVERSHIELD_CHANCE) {
        Some(PowerUpKind::Overshield)
    } else if state.rng.gen_bool(SHIP_DROP_CHANCE) {
        Some(roll_power_up(state))
    } else {
        None
    };
    if let Some(kind) = drop {
        spawn::spawn_power_up(&mut state.world, &mut state.rng, kind, position);
    }

    spawn::spawn_particles(&mut state.world, &mut state.rng, position);

    if source == DamageSource::Shrapnel {
        shrapnel_pop(state, position);
    }
}

/// Common drop table. Overshield only comes from its own rare roll.
fn roll_power_up(state: &mut WorldState) -> PowerUpKind {
    const TABLE: [PowerUpKind; 5] = [
        PowerUpKind::Health,
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
        PowerUpKind::Spread,
        PowerUpKind::Missiles,
    ];
    TABLE
        .choose(&mut state.rng)
        .copied()
        .unwrap_or(PowerUpKind::Health)
}

/// Area damage around a pellet kill. Pops never chain into further pops.
fn shrapnel_pop(state: &mut WorldState, center: DVec2) {
    let mut asteroids: Vec<Entity> = Vec::new();
    let mut ships: Vec<Entity> = Vec::new();
    {
        let mut query = state.world.query::<(&Position, &Asteroid)>();
        for (entity, (pos, _)) in query.iter() {
            if pos.0.distance(center) <= SHRAPNEL_RADIUS {
                asteroids.push(entity);
            }
        }
    }
    {
        let mut query = state.world.query::<(&Position, &EnemyShip)>();
        for (entity, (pos, _)) in query.iter() {
            if pos.0.distance(center) <= SHRAPNEL_RADIUS {
                ships.push(entity);
            }
        }
    }

    for entity in ships {
        damage_ship(state, entity, SHRAPNEL_DAMAGE, DamageSource::ShrapnelPop);
    }
    for entity in asteroids {
        damage_asteroid(state, entity, SHRAPNEL_DAMAGE, DamageSource::ShrapnelPop);
    }
}
