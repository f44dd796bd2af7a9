//! Player defense model: shield layers, regeneration, buffs, resurrection and time dilation.

use tracing::info;

use defender_core::components::{ActiveBuff, Player};
use defender_core::constants::*;
use defender_core::enums::{BuffKind, GamePhase, PowerUpKind};

use crate::world::WorldState;

/// Per-tick upkeep: expire buffs, regenerate the base shield, compute time dilation.
pub fn run(state: &mut WorldState) {
    let now = state.now();
    let player = &mut state.player;

    player.buffs.retain(|b| b.expires_at > now);

    // Regeneration only refills the base layer; overshield is pickup-only.
    if now - player.last_damage_at >= SHIELD_REGEN_DELAY_SECS && player.shield < BASE_SHIELD_MAX {
        player.shield = (player.shield + SHIELD_REGEN_RATE * DT).min(BASE_SHIELD_MAX);
    }

    state.time_dilation = time_dilation(player, now);
}

/// Strongest active slow-down. Time-slow and resurrection grace do not compound.
pub fn time_dilation(player: &Player, now: f64) -> f64 {
    let mut factor: f64 = 1.0;
    if now < player.time_slow_until {
        factor = factor.min(TIME_SLOW_FACTOR);
    }
    if now < player.grace_until {
        factor = factor.min(RESURRECT_DILATION);
    }
    factor
}

pub fn has_buff(player: &Player, kind: BuffKind, now: f64) -> bool {
    player
        .buffs
        .iter()
        .any(|b| b.kind == kind && b.expires_at > now)
}

pub fn is_invulnerable(player: &Player, now: f64) -> bool {
    now < player.invulnerable_until
}

/// Damage the player. Returns false if the blow was ignored (invulnerable, or no run active).
///
/// The shield absorbs first; while rapid-fire is active every absorbed point costs
/// `RAPID_FIRE_SHIELD_COST` shield points. Reaching zero hit points consumes a
/// resurrection or ends the run.
pub fn damage_player(state: &mut WorldState, amount: f64) -> bool {
    let now = state.now();
    if amount <= 0.0 || state.phase != GamePhase::Active || is_invulnerable(&state.player, now) {
        return false;
    }

    let cost = if has_buff(&state.player, BuffKind::RapidFire, now) {
        RAPID_FIRE_SHIELD_COST
    } else {
        1.0
    };

    let player = &mut state.player;
    player.last_damage_at = now;

    let absorbable = player.shield.max(0.0) / cost;
    let remainder = if amount >= absorbable {
        player.shield = 0.0;
        amount - absorbable
    } else {
        player.shield = (player.shield - amount * cost).max(0.0);
        0.0
    };
    player.hp = (player.hp - remainder).max(0.0);

    if player.hp <= 0.0 {
        handle_death(state);
    }
    true
}

/// Consume a resurrection, or end the run.
fn handle_death(state: &mut WorldState) {
    let now = state.now();
    let player = &mut state.player;

    if player.resurrections > 0 {
        player.resurrections -= 1;
        player.hp = PLAYER_MAX_HP;
        player.shield = 0.0;
        player.invulnerable_until = now + RESURRECT_GRACE_SECS;
        player.grace_until = now + RESURRECT_GRACE_SECS;
        info!(
            remaining = player.resurrections,
            "resurrection consumed"
        );
        return;
    }

    player.hp = 0.0;
    state.phase = GamePhase::GameOver;
    state.schedule.clear();
    info!(score = state.score, wave = state.wave.number, "run over");
}

/// Freeze the player's movement. Ignored while invulnerable.
pub fn stun_player(state: &mut WorldState, secs: f64) {
    let now = state.now();
    if is_invulnerable(&state.player, now) {
        return;
    }
    let player = &mut state.player;
    player.stun_until = player.stun_until.max(now + secs);
    player.velocity = glam::DVec2::ZERO;
}

/// Apply a collected pickup.
pub fn apply_power_up(state: &mut WorldState, kind: PowerUpKind) {
    let now = state.now();
    let player = &mut state.player;

    match kind {
        PowerUpKind::Health => {
            player.hp = (player.hp + POWER_UP_HEAL).min(PLAYER_MAX_HP);
        }
        PowerUpKind::Shield => {
            if player.shield < BASE_SHIELD_MAX {
                player.shield = (player.shield + POWER_UP_SHIELD).min(BASE_SHIELD_MAX);
            }
        }
        PowerUpKind::Overshield => {
            player.shield =
                (player.shield + POWER_UP_OVERSHIELD).min(BASE_SHIELD_MAX + OVERSHIELD_MAX);
        }
        PowerUpKind::RapidFire => start_buff(player, BuffKind::RapidFire, now),
        PowerUpKind::Spread => start_buff(player, BuffKind::Spread, now),
        PowerUpKind::Missiles => {
            player.missiles_ready_at = now;
        }
    }
}

/// Weapon buffs are exclusive: any existing weapon buff is replaced by a fresh timer.
fn start_buff(player: &mut Player, kind: BuffKind, now: f64) {
    let duration = match kind {
        BuffKind::RapidFire => RAPID_FIRE_DURATION_SECS,
        BuffKind::Spread => SPREAD_DURATION_SECS,
    };
    player.buffs.clear();
    player.buffs.push(ActiveBuff {
        kind,
        started_at: now,
        expires_at: now + duration,
    });
    player.charge_started_at = None;
    player.next_shot_at = now;
}
