//! Enemy behavior state machine.
//!
//! Pure functions that compute steering and attack decisions for one enemy ship
//! from its archetype, cooldowns, telegraph state and the player's position.
//! No ECS dependency: operates on plain data and returns actions for the caller to apply.

use glam::DVec2;
use rand::Rng;

use defender_core::components::Telegraph;
use defender_core::constants::*;
use defender_core::enums::{EnemyKind, TelegraphKind};

use crate::profiles::{get_profile, EnemyProfile};

/// Input to the enemy FSM for a single ship.
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext {
    pub kind: EnemyKind,
    pub position: DVec2,
    pub velocity: DVec2,
    pub player_position: DVec2,
    pub player_velocity: DVec2,
    pub now: f64,
    pub dt: f64,
    pub stunned: bool,
    pub next_fire_at: f64,
    pub next_grenade_at: f64,
    pub next_snap_at: f64,
    pub telegraph: Option<Telegraph>,
}

/// Something the ship wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    /// Fire a straight projectile along `direction` (unit vector).
    Shoot {
        direction: DVec2,
        speed: f64,
        damage: f64,
    },
    /// Launch a homing grenade, initially along `direction`.
    LaunchGrenade { direction: DVec2 },
    /// Lob a stun grenade toward `destination`.
    LobStunGrenade { destination: DVec2 },
    /// Start a telegraphed attack that fires at `fires_at`.
    BeginTelegraph {
        kind: TelegraphKind,
        aim: DVec2,
        fires_at: f64,
    },
}

/// Output from the enemy FSM.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyUpdate {
    pub velocity: DVec2,
    pub rotation: f64,
    pub next_fire_at: f64,
    pub next_grenade_at: f64,
    pub next_snap_at: f64,
    pub actions: Vec<EnemyAction>,
}

/// Evaluate the FSM for one ship.
pub fn evaluate<R: Rng>(ctx: &EnemyContext, rng: &mut R) -> EnemyUpdate {
    let profile = get_profile(ctx.kind);
    let to_player = ctx.player_position - ctx.position;
    let distance = to_player.length();
    let direction = to_player.normalize_or_zero();

    let mut update = EnemyUpdate {
        velocity: ctx.velocity,
        rotation: to_player.y.atan2(to_player.x),
        next_fire_at: ctx.next_fire_at,
        next_grenade_at: ctx.next_grenade_at,
        next_snap_at: ctx.next_snap_at,
        actions: Vec::new(),
    };

    // Stunned ships neither steer nor attack. Cooldown timestamps keep running.
    if ctx.stunned {
        return update;
    }

    update.velocity = steer(ctx, &profile, distance, direction);

    if distance > profile.engage_range {
        return update;
    }

    if ctx.now >= ctx.next_fire_at && primary_attack(ctx, &profile, direction, &mut update) {
        update.next_fire_at = ctx.now + profile.fire_cooldown * rng.gen_range(0.9..1.1);
    }

    if ctx.kind == EnemyKind::Tank {
        tank_specials(ctx, &mut update);
    }

    update
}

/// Hold the stand-off band: close in when too far, back off when too close.
fn steer(ctx: &EnemyContext, profile: &EnemyProfile, distance: f64, direction: DVec2) -> DVec2 {
    if is_sniper_frozen(ctx) {
        return DVec2::ZERO;
    }

    let desired = if distance > profile.standoff + profile.standoff_tolerance {
        direction * profile.speed
    } else if distance < profile.standoff - profile.standoff_tolerance {
        -direction * profile.speed
    } else {
        DVec2::ZERO
    };

    let blend = (ENEMY_STEER_RESPONSE * ctx.dt).min(1.0);
    let velocity = ctx.velocity + (desired - ctx.velocity) * blend;
    velocity.clamp_length_max(profile.speed)
}

/// A charging sniper locks in place for the last moments of its telegraph.
fn is_sniper_frozen(ctx: &EnemyContext) -> bool {
    matches!(
        ctx.telegraph,
        Some(Telegraph { kind: TelegraphKind::SniperBeam, fires_at, .. })
            if fires_at - ctx.now <= SNIPER_FREEZE_SECS
    )
}

/// Push the archetype's primary attack. Returns false if the attack was withheld.
fn primary_attack(
    ctx: &EnemyContext,
    profile: &EnemyProfile,
    direction: DVec2,
    update: &mut EnemyUpdate,
) -> bool {
    match ctx.kind {
        EnemyKind::Fighter | EnemyKind::Captain | EnemyKind::Tank => {
            update.actions.push(EnemyAction::Shoot {
                direction,
                speed: profile.shot_speed,
                damage: profile.shot_damage,
            });
        }
        EnemyKind::Aggressive => {
            let base = direction.y.atan2(direction.x);
            let step = AGGRESSIVE_FAN_ARC / (AGGRESSIVE_FAN_SHOTS - 1) as f64;
            for i in 0..AGGRESSIVE_FAN_SHOTS {
                let angle = base - AGGRESSIVE_FAN_ARC / 2.0 + step * i as f64;
                update.actions.push(EnemyAction::Shoot {
                    direction: DVec2::from_angle(angle),
                    speed: profile.shot_speed,
                    damage: profile.shot_damage,
                });
            }
        }
        EnemyKind::Grenadier => {
            update
                .actions
                .push(EnemyAction::LaunchGrenade { direction });
        }
        EnemyKind::Sniper => {
            if ctx.telegraph.is_some() {
                return false;
            }
            let aim = ctx.player_position + ctx.player_velocity * SNIPER_LEAD_SECS;
            update.actions.push(EnemyAction::BeginTelegraph {
                kind: TelegraphKind::SniperBeam,
                aim,
                fires_at: ctx.now + SNIPER_CHARGE_SECS,
            });
        }
    }
    true
}

/// Tank specials run on their own cooldowns, independent of the primary gun.
fn tank_specials(ctx: &EnemyContext, update: &mut EnemyUpdate) {
    if ctx.now >= ctx.next_grenade_at {
        update.actions.push(EnemyAction::LobStunGrenade {
            destination: ctx.player_position,
        });
        update.next_grenade_at = ctx.now + TANK_GRENADE_COOLDOWN_SECS;
    }

    if ctx.now >= ctx.next_snap_at && ctx.telegraph.is_none() {
        update.actions.push(EnemyAction::BeginTelegraph {
            kind: TelegraphKind::SnapBeam,
            aim: ctx.player_position,
            fires_at: ctx.now + SNAP_TELEGRAPH_SECS,
        });
        update.next_snap_at = ctx.now + TANK_SNAP_COOLDOWN_SECS;
    }
}
