//! Kinematics for every mobile entity family.
//!
//! Hostile bodies (asteroids, enemy ships, enemy ordnance) and pickups move at the
//! tick's time-dilation factor. The player's own ordnance and cosmetic particles
//! always move at full speed. Stunned asteroids and ships skip translation but
//! keep rotating.

use glam::DVec2;
use hecs::Entity;

use defender_core::components::*;
use defender_core::constants::*;
use defender_core::enums::EnemyMissileKind;
use defender_core::geometry::turn_towards;
use defender_core::types::{Position, Velocity};

use crate::world::WorldState;

pub fn run(state: &mut WorldState) {
    let now = state.now();
    let hostile_dt = DT * state.time_dilation;

    move_asteroids(state, now, hostile_dt);
    move_ships(state, now, hostile_dt);
    steer_player_missiles(state);
    steer_grenades(state, hostile_dt);

    for (_entity, (pos, vel, projectile)) in state
        .world
        .query_mut::<(&mut Position, &Velocity, &mut PlayerProjectile)>()
    {
        pos.0 += vel.0 * DT;
        projectile.traveled += vel.speed() * DT;
    }

    for (_entity, (pos, vel, _missile)) in state
        .world
        .query_mut::<(&mut Position, &Velocity, &PlayerMissile)>()
    {
        pos.0 += vel.0 * DT;
    }

    for (_entity, (pos, vel, _shot)) in state
        .world
        .query_mut::<(&mut Position, &Velocity, &EnemyProjectile)>()
    {
        pos.0 += vel.0 * hostile_dt;
    }

    for (_entity, (pos, vel, _power_up)) in state
        .world
        .query_mut::<(&mut Position, &Velocity, &PowerUp)>()
    {
        pos.0 += vel.0 * hostile_dt;
    }

    for (_entity, (pos, vel, particle)) in state
        .world
        .query_mut::<(&mut Position, &mut Velocity, &mut Particle)>()
    {
        pos.0 += vel.0 * DT;
        vel.0 *= PARTICLE_DAMPING;
        particle.life -= PARTICLE_DECAY_PER_TICK;
    }
}

fn is_stunned(stun: Option<&Stunned>, now: f64) -> bool {
    stun.is_some_and(|s| now < s.until_secs)
}

fn move_asteroids(state: &mut WorldState, now: f64, dt: f64) {
    for (_entity, (pos, vel, spin, stun, _asteroid)) in state.world.query_mut::<(
        &mut Position,
        &Velocity,
        &mut Spin,
        Option<&Stunned>,
        &Asteroid,
    )>() {
        spin.angle += spin.rate * dt;
        if !is_stunned(stun, now) {
            pos.0 += vel.0 * dt;
        }
    }
}

fn move_ships(state: &mut WorldState, now: f64, dt: f64) {
    for (_entity, (pos, vel, stun, _ship)) in state
        .world
        .query_mut::<(&mut Position, &Velocity, Option<&Stunned>, &EnemyShip)>()
    {
        if !is_stunned(stun, now) {
            pos.0 += vel.0 * dt;
        }
    }
}

/// Homing with steering authority ramping up over the first second of flight.
/// A missile whose target is gone drops its lock and flies straight.
fn steer_player_missiles(state: &mut WorldState) {
    for (_entity, missile) in state.world.query_mut::<&mut PlayerMissile>() {
        missile.age += DT;
    }

    let mut updates: Vec<(Entity, Option<DVec2>)> = Vec::new();
    {
        let mut query = state.world.query::<&PlayerMissile>();
        for (entity, missile) in query.iter() {
            let Some(target) = missile.target else {
                continue;
            };
            let target_pos = Entity::from_bits(target.id)
                .and_then(|e| state.world.get::<&Position>(e).ok().map(|p| p.0));
            updates.push((entity, target_pos));
        }
    }

    for (entity, target_pos) in updates {
        let Ok((missile, pos, vel)) = state
            .world
            .query_one_mut::<(&mut PlayerMissile, &Position, &mut Velocity)>(entity)
        else {
            continue;
        };
        let Some(target_pos) = target_pos else {
            missile.target = None;
            continue;
        };
        let authority = MISSILE_TURN_RATE * (missile.age / MISSILE_STEER_RAMP_SECS).min(1.0);
        let desired = target_pos - pos.0;
        let heading = turn_towards(vel.heading(), desired.y.atan2(desired.x), authority * DT);
        vel.0 = DVec2::from_angle(heading) * vel.speed();
    }
}

/// Homing grenades track the player for a limited window, then fly straight.
/// Lobbed stun grenades travel to their landing point and sit until the fuse burns.
fn steer_grenades(state: &mut WorldState, dt: f64) {
    let player_pos = state.player.position;
    for (_entity, (pos, vel, grenade)) in state
        .world
        .query_mut::<(&mut Position, &mut Velocity, &mut EnemyMissile)>()
    {
        grenade.age += dt;
        match grenade.kind {
            EnemyMissileKind::HomingGrenade => {
                if grenade.age < GRENADE_TRACKING_SECS {
                    let desired = player_pos - pos.0;
                    let heading = turn_towards(
                        vel.heading(),
                        desired.y.atan2(desired.x),
                        GRENADE_TURN_RATE * dt,
                    );
                    vel.0 = DVec2::from_angle(heading) * vel.speed();
                }
                pos.0 += vel.0 * dt;
            }
            EnemyMissileKind::StunGrenade => {
                let remaining = grenade.destination - pos.0;
                let step = vel.speed() * dt;
                if remaining.length() <= step {
                    pos.0 = grenade.destination;
                    vel.0 = DVec2::ZERO;
                } else {
                    pos.0 += vel.0 * dt;
                }
            }
        }
    }
}
