//! Wave spawning system: ambient asteroid field plus scheduled enemy waves.
//!
//! A wave goes Incoming (audio cue) -> InProgress (ships staggered in over a
//! bounded window) -> Intermission once cleared or timed out, then the next wave
//! is announced. A wave never starts while a tank is still alive; the start is
//! re-checked periodically instead.

use rand::seq::SliceRandom;
use tracing::{debug, info};

use defender_core::components::EnemyShip;
use defender_core::constants::*;
use defender_core::enums::{EnemyKind, WavePhase};
use defender_core::events::AudioEvent;

use crate::spawn;
use crate::world::{ScheduledAction, WorldState};

/// Seed a fresh run: staggered opening asteroids and the first wave announcement.
pub fn begin_run(state: &mut WorldState) {
    if state.config.ambient_asteroids {
        for i in 1..=ASTEROID_INITIAL_COUNT {
            state.schedule_in(
                ASTEROID_INITIAL_STAGGER_SECS * i as f64,
                ScheduledAction::SpawnAsteroid,
            );
        }
        state.wave.next_asteroid_at =
            ASTEROID_INITIAL_STAGGER_SECS * ASTEROID_INITIAL_COUNT as f64 + ASTEROID_SPAWN_INTERVAL_SECS;
    }
    if state.enemy_spawning_enabled() {
        let first = state.config.start_wave;
        state.schedule_in(
            FIRST_WAVE_DELAY_SECS,
            ScheduledAction::WaveIncoming { wave: first },
        );
    }
}

/// Per-tick: ambient asteroids and wave completion.
pub fn run(state: &mut WorldState) {
    let now = state.now();

    if state.config.ambient_asteroids && now >= state.wave.next_asteroid_at {
        spawn::spawn_random_asteroid(state);
        state.wave.next_asteroid_at += ASTEROID_SPAWN_INTERVAL_SECS;
    }

    if state.wave.phase == WavePhase::InProgress && state.wave.pending_spawns == 0 {
        let alive = ships_alive(state, state.wave.number);
        let timed_out = now - state.wave.last_spawn_at >= WAVE_MAX_DURATION_SECS;
        if alive == 0 || timed_out {
            end_wave(state, alive);
        }
    }
}

fn end_wave(state: &mut WorldState, survivors: u32) {
    let wave = state.wave.number;
    state.audio_events.push(AudioEvent::WaveEnd { wave });
    info!(wave, survivors, "wave ended");

    if state.enemy_spawning_enabled() {
        state.wave.phase = WavePhase::Intermission;
        state.schedule_in(
            WAVE_INTERMISSION_SECS,
            ScheduledAction::WaveIncoming { wave: wave + 1 },
        );
    } else {
        state.wave.phase = WavePhase::Idle;
    }
}

/// Scheduled: announce `wave` and queue its start.
pub fn announce_wave(state: &mut WorldState, wave: u32) {
    if !state.enemy_spawning_enabled() {
        state.wave.phase = WavePhase::Idle;
        return;
    }
    state.wave.number = wave;
    state.wave.phase = WavePhase::Incoming;
    state.audio_events.push(AudioEvent::WaveIncoming { wave });
    state.schedule_in(WAVE_INCOMING_LEAD_SECS, ScheduledAction::WaveStart { wave });
    info!(wave, "wave incoming");
}

/// Scheduled: compose, shuffle and stagger the wave's ships. Defers while a tank lives.
pub fn start_wave(state: &mut WorldState, wave: u32) {
    if !state.enemy_spawning_enabled() {
        state.wave.phase = WavePhase::Idle;
        return;
    }
    if tank_alive(state) {
        debug!(wave, "tank still alive, deferring wave start");
        state.schedule_in(WAVE_BOSS_RECHECK_SECS, ScheduledAction::WaveStart { wave });
        return;
    }

    let mut kinds = compose_wave(wave);
    kinds.shuffle(&mut state.rng);
    let gap = spawn_gap(wave);
    for (i, &kind) in kinds.iter().enumerate() {
        state.schedule_in(gap * i as f64, ScheduledAction::SpawnEnemy { kind, wave });
    }

    let ships = kinds.len() as u32;
    state.wave.number = wave;
    state.wave.phase = WavePhase::InProgress;
    state.wave.pending_spawns = ships;
    state.wave.last_spawn_at = state.now();
    state.audio_events.push(AudioEvent::WaveStart { wave, ships });
    info!(wave, ships, gap, "wave started");
}

/// Scheduled: one staggered ship of a running wave.
pub fn spawn_wave_ship(state: &mut WorldState, kind: EnemyKind, wave: u32) {
    if wave == state.wave.number {
        state.wave.pending_spawns = state.wave.pending_spawns.saturating_sub(1);
    }
    if !state.enemy_spawning_enabled() {
        return;
    }
    spawn::spawn_enemy(state, kind, wave);
    state.wave.last_spawn_at = state.now();
    if kind == EnemyKind::Tank {
        info!(wave, "tank deployed");
    }
}

/// Re-arm wave scheduling after enemy spawning is switched back on.
pub fn resume_waves(state: &mut WorldState) {
    let wave_queued = state.schedule.any(|a| {
        matches!(
            a,
            ScheduledAction::WaveIncoming { .. } | ScheduledAction::WaveStart { .. }
        )
    });
    if state.wave.phase != WavePhase::Idle || wave_queued {
        return;
    }
    let next = (state.wave.number + 1).max(state.config.start_wave);
    state.schedule_in(
        FIRST_WAVE_DELAY_SECS,
        ScheduledAction::WaveIncoming { wave: next },
    );
}

/// Ship archetypes for a wave, before shuffling.
///
/// Waves 1-3 come from a fixed table. Later waves hold `4 + wave` ships split by
/// weight across the unlocked archetypes; every `BOSS_WAVE_INTERVAL`th wave trades
/// two fighters for a tank.
pub fn compose_wave(wave: u32) -> Vec<EnemyKind> {
    use EnemyKind::*;

    match wave {
        0 | 1 => vec![Fighter; 3],
        2 => vec![Fighter, Fighter, Fighter, Sniper],
        3 => vec![Fighter, Fighter, Fighter, Sniper, Aggressive],
        n => {
            let total = 4 + n as usize;
            let weights: Vec<(EnemyKind, usize)> = [
                (Fighter, 4, 1),
                (Sniper, 2, 2),
                (Aggressive, 2, 3),
                (Captain, 2, 4),
                (Grenadier, 2, 5),
            ]
            .into_iter()
            .filter(|&(_, _, unlock)| n >= unlock)
            .map(|(kind, weight, _)| (kind, weight))
            .collect();
            let weight_sum: usize = weights.iter().map(|(_, w)| w).sum();

            let mut kinds: Vec<EnemyKind> = Vec::with_capacity(total);
            for &(kind, weight) in &weights {
                kinds.extend(std::iter::repeat(kind).take(total * weight / weight_sum));
            }
            // Rounding remainder goes to fighters.
            let short = total - kinds.len();
            kinds.splice(0..0, std::iter::repeat(Fighter).take(short));

            if n % BOSS_WAVE_INTERVAL == 0 {
                let trade = kinds.len().min(2);
                kinds.drain(..trade);
                kinds.push(Tank);
            }
            kinds
        }
    }
}

/// Delay between consecutive spawns of a wave.
pub fn spawn_gap(wave: u32) -> f64 {
    (WAVE_BASE_GAP_SECS - WAVE_GAP_STEP_SECS * wave as f64).max(WAVE_MIN_GAP_SECS)
}

pub fn tank_alive(state: &WorldState) -> bool {
    state
        .world
        .query::<&EnemyShip>()
        .iter()
        .any(|(_, ship)| ship.kind == EnemyKind::Tank)
}

/// Live ships spawned for `wave`.
pub fn ships_alive(state: &WorldState, wave: u32) -> u32 {
    state
        .world
        .query::<&EnemyShip>()
        .iter()
        .filter(|(_, ship)| ship.wave == wave)
        .count() as u32
}
