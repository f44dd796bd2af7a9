//! Entity spawning helpers.
//!
//! Every entity family is created here so component bundles stay consistent
//! between the spawner, weapons, AI and kill handling.

use std::f64::consts::TAU;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use defender_core::components::*;
use defender_core::constants::*;
use defender_core::enums::*;
use defender_core::types::{EntityId, Position, Velocity};

use defender_ai::profiles::get_profile;

use crate::world::WorldState;

/// Archetype roll for an ambient asteroid.
pub struct AsteroidRoll {
    pub kind: AsteroidKind,
    pub size: f64,
    pub hp: f64,
    pub speed_factor: f64,
}

/// Roll archetype, size and hit points: 60% normal, 20% fast, 15% armored, 5% splitting.
pub fn roll_asteroid(rng: &mut ChaCha8Rng) -> AsteroidRoll {
    let roll: f64 = rng.gen();
    if roll < 0.6 {
        let size = rng.gen_range(30.0..70.0);
        let hp = if size >= 60.0 {
            8.0
        } else if size >= 50.0 {
            5.0
        } else if size >= 40.0 {
            3.0
        } else {
            2.0
        };
        AsteroidRoll {
            kind: AsteroidKind::Normal,
            size,
            hp,
            speed_factor: 1.0,
        }
    } else if roll < 0.8 {
        AsteroidRoll {
            kind: AsteroidKind::Fast,
            size: rng.gen_range(20.0..40.0),
            hp: 2.0,
            speed_factor: 2.0,
        }
    } else if roll < 0.95 {
        AsteroidRoll {
            kind: AsteroidKind::Armored,
            size: rng.gen_range(60.0..80.0),
            hp: 15.0,
            speed_factor: 0.5,
        }
    } else {
        AsteroidRoll {
            kind: AsteroidKind::Splitting,
            size: rng.gen_range(40.0..60.0),
            hp: 4.0,
            speed_factor: 1.0,
        }
    }
}

/// A random point `offset` pixels outside a random playfield edge.
pub fn edge_point(rng: &mut ChaCha8Rng, size: DVec2, offset: f64) -> DVec2 {
    match rng.gen_range(0..4) {
        0 => DVec2::new(rng.gen_range(0.0..size.x), -offset),
        1 => DVec2::new(size.x + offset, rng.gen_range(0.0..size.y)),
        2 => DVec2::new(rng.gen_range(0.0..size.x), size.y + offset),
        _ => DVec2::new(-offset, rng.gen_range(0.0..size.y)),
    }
}

/// Spawn an ambient asteroid at a random edge, drifting toward the central region.
pub fn spawn_random_asteroid(state: &mut WorldState) -> Entity {
    let size = state.playfield_size();
    let rng = &mut state.rng;

    let roll = roll_asteroid(rng);
    let position = edge_point(rng, size, ASTEROID_SPAWN_OFFSET);
    let aim = DVec2::new(
        rng.gen_range(size.x * 0.25..size.x * 0.75),
        rng.gen_range(size.y * 0.25..size.y * 0.75),
    );
    let speed = rng.gen_range(ASTEROID_MIN_SPEED..ASTEROID_MAX_SPEED) * roll.speed_factor;
    let velocity = (aim - position).try_normalize().unwrap_or(DVec2::Y) * speed;
    let spin = rng.gen_range(-ASTEROID_MAX_SPIN..ASTEROID_MAX_SPIN);

    spawn_asteroid(
        &mut state.world,
        roll.kind,
        roll.size,
        roll.hp,
        position,
        velocity,
        spin,
    )
}

pub fn spawn_asteroid(
    world: &mut World,
    kind: AsteroidKind,
    size: f64,
    hp: f64,
    position: DVec2,
    velocity: DVec2,
    spin_rate: f64,
) -> Entity {
    world.spawn((
        Asteroid { kind, size },
        Position(position),
        Velocity(velocity),
        Health {
            current: hp,
            max: hp,
        },
        Spin {
            angle: 0.0,
            rate: spin_rate,
        },
        Radius(size),
        RamContacts::default(),
    ))
}

/// Three fast 1-HP children fanned evenly around the parent's last position.
pub fn spawn_split_children(world: &mut World, rng: &mut ChaCha8Rng, at: DVec2) -> Vec<Entity> {
    (0..SPLIT_CHILD_COUNT)
        .map(|i| {
            let angle = TAU * i as f64 / SPLIT_CHILD_COUNT as f64
                + rng.gen_range(0.0..SPLIT_CHILD_JITTER);
            let speed = rng.gen_range(SPLIT_CHILD_MIN_SPEED..SPLIT_CHILD_MAX_SPEED);
            let spin = rng.gen_range(-ASTEROID_MAX_SPIN..ASTEROID_MAX_SPIN);
            spawn_asteroid(
                world,
                AsteroidKind::Fast,
                SPLIT_CHILD_SIZE,
                SPLIT_CHILD_HP,
                at,
                DVec2::from_angle(angle) * speed,
                spin,
            )
        })
        .collect()
}

/// Spawn an enemy ship just outside a random edge.
pub fn spawn_enemy(state: &mut WorldState, kind: EnemyKind, wave: u32) -> Entity {
    let size = state.playfield_size();
    let position = edge_point(&mut state.rng, size, ENEMY_SPAWN_OFFSET);
    let now = state.now();
    let first_shot = now + state.rng.gen_range(0.5..1.5);
    spawn_enemy_at(&mut state.world, kind, wave, position, now, first_shot)
}

pub fn spawn_enemy_at(
    world: &mut World,
    kind: EnemyKind,
    wave: u32,
    position: DVec2,
    now: f64,
    first_shot_at: f64,
) -> Entity {
    let profile = get_profile(kind);
    let ship = EnemyShip {
        kind,
        rotation: 0.0,
        wave,
        next_fire_at: first_shot_at,
        next_grenade_at: now + TANK_GRENADE_COOLDOWN_SECS / 2.0,
        next_snap_at: now + TANK_SNAP_COOLDOWN_SECS / 2.0,
        telegraph: None,
    };
    let entity = world.spawn((
        ship,
        Position(position),
        Velocity(DVec2::ZERO),
        Health {
            current: profile.max_hp,
            max: profile.max_hp,
        },
        Radius(profile.radius),
    ));
    if profile.max_shield > 0.0 {
        let _ = world.insert_one(
            entity,
            Shield {
                current: profile.max_shield,
                max: profile.max_shield,
            },
        );
    }
    entity
}

pub fn spawn_power_up(world: &mut World, rng: &mut ChaCha8Rng, kind: PowerUpKind, at: DVec2) {
    let drift = rng.gen_range(POWER_UP_MIN_DRIFT..POWER_UP_MAX_DRIFT);
    world.spawn((
        PowerUp { kind },
        Position(at),
        Velocity(DVec2::new(0.0, drift)),
    ));
}

/// Explosion debris.
pub fn spawn_particles(world: &mut World, rng: &mut ChaCha8Rng, at: DVec2) {
    let count = rng.gen_range(PARTICLE_MIN_COUNT..=PARTICLE_MAX_COUNT);
    for _ in 0..count {
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(PARTICLE_MIN_SPEED..PARTICLE_MAX_SPEED);
        world.spawn((
            Particle {
                life: 1.0,
                size: rng.gen_range(1.5..4.0),
            },
            Position(at),
            Velocity(DVec2::from_angle(angle) * speed),
        ));
    }
}

#[allow(clippy::too_many_arguments)]
pub fn spawn_player_projectile(
    world: &mut World,
    kind: ProjectileKind,
    from: DVec2,
    direction: DVec2,
    speed: f64,
    damage: f64,
    pierce: u32,
    max_range: f64,
) -> Entity {
    world.spawn((
        PlayerProjectile {
            kind,
            damage,
            pierce_remaining: pierce,
            traveled: 0.0,
            max_range,
            hit: Vec::new(),
        },
        Position(from),
        Velocity(direction * speed),
    ))
}

/// Charged beam. `ratio` is the effective charge, 0.0 to 1.0.
///
/// Damage grows with the square of the ratio; hit count and length grow linearly.
pub fn spawn_player_beam(world: &mut World, aim: DVec2, ratio: f64, now: f64) -> Entity {
    let ratio = ratio.clamp(0.0, 1.0);
    world.spawn((PlayerBeam {
        aim,
        damage: RAIL_MIN_DAMAGE + (RAIL_MAX_DAMAGE - RAIL_MIN_DAMAGE) * ratio * ratio,
        length: RAIL_MIN_LENGTH + (RAIL_MAX_LENGTH - RAIL_MIN_LENGTH) * ratio,
        half_width: RAIL_HALF_WIDTH,
        max_hits: 1 + (ratio * RAIL_MAX_EXTRA_HITS as f64).floor() as u32,
        expires_at: now + RAIL_DURATION_SECS,
        hit_asteroids: Vec::new(),
        hit_ships: Vec::new(),
    },))
}

pub fn spawn_player_missile(
    world: &mut World,
    from: DVec2,
    direction: DVec2,
    target: Option<MissileTarget>,
    now: f64,
) -> Entity {
    world.spawn((
        PlayerMissile {
            target,
            damage: MISSILE_DAMAGE,
            ricochets: 0,
            age: 0.0,
            expires_at: now + MISSILE_LIFETIME_SECS,
            hit: Vec::new(),
        },
        Position(from),
        Velocity(direction * MISSILE_SPEED),
    ))
}

pub fn spawn_enemy_projectile(world: &mut World, from: DVec2, velocity: DVec2, damage: f64) {
    world.spawn((EnemyProjectile { damage }, Position(from), Velocity(velocity)));
}

pub fn spawn_homing_grenade(
    world: &mut World,
    from: DVec2,
    direction: DVec2,
    owner: EntityId,
    now: f64,
) {
    world.spawn((
        EnemyMissile {
            kind: EnemyMissileKind::HomingGrenade,
            damage: GRENADE_DAMAGE,
            age: 0.0,
            expires_at: now + GRENADE_LIFETIME_SECS,
            owner,
            destination: from,
            fuse_at: f64::INFINITY,
        },
        Position(from),
        Velocity(direction * GRENADE_SPEED),
    ));
}

pub fn spawn_stun_grenade(
    world: &mut World,
    from: DVec2,
    destination: DVec2,
    owner: EntityId,
    now: f64,
) {
    let direction = (destination - from).try_normalize().unwrap_or(DVec2::Y);
    world.spawn((
        EnemyMissile {
            kind: EnemyMissileKind::StunGrenade,
            damage: 0.0,
            age: 0.0,
            expires_at: now + STUN_GRENADE_FUSE_SECS + 1.0,
            owner,
            destination,
            fuse_at: now + STUN_GRENADE_FUSE_SECS,
        },
        Position(from),
        Velocity(direction * STUN_GRENADE_SPEED),
    ));
}

pub fn spawn_enemy_beam(
    world: &mut World,
    kind: TelegraphKind,
    origin: DVec2,
    toward: DVec2,
    now: f64,
) -> Entity {
    let direction = (toward - origin).try_normalize().unwrap_or(DVec2::Y);
    let (damage, half_width) = match kind {
        TelegraphKind::SniperBeam => (SNIPER_BEAM_DAMAGE, SNIPER_BEAM_HALF_WIDTH),
        TelegraphKind::SnapBeam => (SNAP_BEAM_DAMAGE, SNAP_BEAM_HALF_WIDTH),
    };
    world.spawn((EnemyBeam {
        kind,
        origin,
        end: origin + direction * ENEMY_BEAM_LENGTH,
        damage,
        half_width,
        resolved: false,
        expires_at: now + ENEMY_BEAM_VISIBLE_SECS,
    },))
}
