//! Weapon system: tap/charge fire, rapid-fire, spread, and the two player abilities.
//!
//! The active weapon buff picks the firing mode. Without a buff the trigger is a
//! tap/charge weapon: releases shorter than `CHARGE_TAP_THRESHOLD_SECS` fire a bullet,
//! anything longer fires a charged beam. With a buff the trigger fires continuously
//! while held, spinning up over time.

use glam::DVec2;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use defender_core::components::{ActiveBuff, Asteroid, EnemyShip, MissileTarget};
use defender_core::constants::*;
use defender_core::enums::{BuffKind, ProjectileKind, TargetKind};

use crate::spawn;
use crate::world::WorldState;

pub fn run(state: &mut WorldState) {
    fire_primary(state);
    abilities(state);
}

/// The weapon buff currently selecting the firing mode, if any.
pub fn active_weapon_buff(state: &WorldState) -> Option<ActiveBuff> {
    let now = state.now();
    state
        .player
        .buffs
        .iter()
        .find(|b| b.expires_at > now)
        .copied()
}

/// Unit vector from the ship toward the aim point. Straight up if they coincide.
fn aim_direction(state: &WorldState) -> DVec2 {
    (state.input.aim - state.player.position)
        .try_normalize()
        .unwrap_or(DVec2::NEG_Y)
}

fn fire_primary(state: &mut WorldState) {
    let now = state.now();
    let release = state.input.release_hold.take();

    match active_weapon_buff(state) {
        None => {
            if let Some(hold) = release {
                release_charge(state, hold);
            } else if state.input.fire_held && state.player.charge_started_at.is_none() {
                // Trigger stayed down across a buff expiring: start charging from here.
                state.player.charge_started_at = Some(now);
            }
            decay_spin(state);
        }
        Some(buff) => {
            if state.input.fire_held {
                continuous_fire(state, buff);
                state.player.spin = (state.player.spin + SPIN_UP_RATE * DT).min(1.0);
            } else {
                decay_spin(state);
            }
        }
    }
}

fn decay_spin(state: &mut WorldState) {
    state.player.spin = (state.player.spin - SPIN_DECAY_RATE * DT).max(0.0);
}

/// Charge ratio for a hold, after the stun penalty.
pub fn charge_ratio(hold_secs: f64, stunned: bool) -> f64 {
    let effective = if stunned {
        hold_secs * CHARGE_STUN_PENALTY
    } else {
        hold_secs
    };
    (effective / CHARGE_MAX_HOLD_SECS).clamp(0.0, 1.0)
}

/// Tap below the threshold: bullet. Anything longer: beam.
fn release_charge(state: &mut WorldState, hold: f64) {
    let now = state.now();
    let origin = state.player.position;
    let direction = aim_direction(state);

    if hold < CHARGE_TAP_THRESHOLD_SECS {
        // Taps inside the cooldown are dropped, not buffered.
        if now >= state.player.next_shot_at {
            spawn::spawn_player_projectile(
                &mut state.world,
                ProjectileKind::Standard,
                origin,
                direction,
                BULLET_SPEED,
                BULLET_DAMAGE,
                0,
                BULLET_RANGE,
            );
            state.player.next_shot_at = now + TAP_FIRE_INTERVAL_SECS;
        }
        return;
    }

    let stunned = now < state.player.stun_until;
    let ratio = charge_ratio(hold, stunned);
    spawn::spawn_player_beam(&mut state.world, state.input.aim, ratio, now);
    state.player.next_shot_at = now + TAP_FIRE_INTERVAL_SECS;
    debug!(hold, ratio, stunned, "charged beam fired");
}

/// Interval between continuous-fire volleys for a buff at time `now` and spin `spin`.
///
/// Ramps linearly from the start interval to the end interval over the buff's
/// spin-up window, then shrinks further with spin. Bounded to
/// `[end * (1 - SPIN_INTERVAL_BONUS), start]`.
pub fn fire_interval(buff: &ActiveBuff, now: f64, spin: f64) -> f64 {
    let (start, end, ramp_secs) = match buff.kind {
        BuffKind::RapidFire => (
            RAPID_FIRE_START_INTERVAL_SECS,
            RAPID_FIRE_END_INTERVAL_SECS,
            RAPID_FIRE_RAMP_SECS,
        ),
        BuffKind::Spread => (
            SPREAD_START_INTERVAL_SECS,
            SPREAD_END_INTERVAL_SECS,
            SPREAD_RAMP_SECS,
        ),
    };
    let ramp = ((now - buff.started_at) / ramp_secs).clamp(0.0, 1.0);
    let base = start + (end - start) * ramp;
    let spun = base * (1.0 - SPIN_INTERVAL_BONUS * spin.clamp(0.0, 1.0));
    spun.clamp(end * (1.0 - SPIN_INTERVAL_BONUS), start)
}

fn continuous_fire(state: &mut WorldState, buff: ActiveBuff) {
    let now = state.now();
    let interval = fire_interval(&buff, now, state.player.spin);

    // Do not bank shots while the trigger was up.
    if state.player.next_shot_at < now - interval {
        state.player.next_shot_at = now;
    }

    let mut shots = 0;
    while state.player.next_shot_at <= now && shots < MAX_SHOTS_PER_TICK {
        match buff.kind {
            BuffKind::RapidFire => fire_rapid_shot(state),
            BuffKind::Spread => fire_spread_volley(state),
        }
        state.player.next_shot_at += interval;
        shots += 1;
    }
    if state.player.next_shot_at <= now {
        state.player.next_shot_at = now + interval;
    }
}

/// One jittered bullet. Jitter narrows as spin rises.
fn fire_rapid_shot(state: &mut WorldState) {
    let base = aim_direction(state);
    let spread = (1.0 - state.player.spin) * RAPID_FIRE_MAX_JITTER;
    let jitter = if spread > 0.0 {
        state.rng.gen_range(-spread..=spread)
    } else {
        0.0
    };
    let direction = DVec2::from_angle(jitter).rotate(base);
    spawn::spawn_player_projectile(
        &mut state.world,
        ProjectileKind::Standard,
        state.player.position,
        direction,
        BULLET_SPEED,
        BULLET_DAMAGE,
        0,
        BULLET_RANGE,
    );
}

/// A symmetric fan of short-range piercing pellets.
fn fire_spread_volley(state: &mut WorldState) {
    let base = aim_direction(state);
    let center = (SPREAD_PELLETS as f64 - 1.0) / 2.0;
    for i in 0..SPREAD_PELLETS {
        let offset = (i as f64 - center) * SPREAD_ANGLE_STEP;
        let direction = DVec2::from_angle(offset).rotate(base);
        spawn::spawn_player_projectile(
            &mut state.world,
            ProjectileKind::Shrapnel,
            state.player.position,
            direction,
            BULLET_SPEED,
            SPREAD_DAMAGE,
            SPREAD_PIERCE,
            SPREAD_RANGE,
        );
    }
}

fn abilities(state: &mut WorldState) {
    let now = state.now();
    let bypass = state.cheats.cooldown_bypass;

    if std::mem::take(&mut state.input.time_slow_requested)
        && (bypass || now >= state.player.time_slow_ready_at)
    {
        state.player.time_slow_until = now + TIME_SLOW_DURATION_SECS;
        state.player.time_slow_ready_at = now + TIME_SLOW_COOLDOWN_SECS;
        info!(bypass, "time slow activated");
    }

    if std::mem::take(&mut state.input.missiles_requested)
        && (bypass || now >= state.player.missiles_ready_at)
    {
        launch_salvo(state);
        state.player.missiles_ready_at = now + MISSILE_SALVO_COOLDOWN_SECS;
        info!(bypass, "missile salvo launched");
    }
}

/// Every live asteroid and ship as a missile target.
pub fn live_targets(state: &WorldState) -> Vec<MissileTarget> {
    let mut targets = Vec::new();
    for (entity, _) in state.world.query::<&EnemyShip>().iter() {
        targets.push(MissileTarget {
            id: entity.to_bits().get(),
            kind: TargetKind::Ship,
        });
    }
    for (entity, _) in state.world.query::<&Asteroid>().iter() {
        targets.push(MissileTarget {
            id: entity.to_bits().get(),
            kind: TargetKind::Asteroid,
        });
    }
    targets
}

/// Fan of homing missiles, each assigned a random live target.
fn launch_salvo(state: &mut WorldState) {
    let now = state.now();
    let origin = state.player.position;
    let base = aim_direction(state);
    let targets = live_targets(state);

    let step = if MISSILE_SALVO_COUNT > 1 {
        MISSILE_SALVO_SPREAD / (MISSILE_SALVO_COUNT - 1) as f64
    } else {
        0.0
    };
    for i in 0..MISSILE_SALVO_COUNT {
        let offset = -MISSILE_SALVO_SPREAD / 2.0 + step * i as f64;
        let direction = DVec2::from_angle(offset).rotate(base);
        let target = targets.choose(&mut state.rng).copied();
        spawn::spawn_player_missile(&mut state.world, origin, direction, target, now);
    }
}
