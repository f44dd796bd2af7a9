//! Scheduled-event system: applies every event due this tick, in key order.

use hecs::Entity;
use tracing::debug;

use defender_core::components::{EnemyShip, Stunned};
use defender_core::types::Position;

use crate::spawn;
use crate::systems::wave_spawner;
use crate::world::{ScheduledAction, WorldState};

pub fn run(state: &mut WorldState) {
    let tick = state.time.tick;
    // Events scheduled for this same tick while draining are applied too.
    while let Some(action) = state.schedule.pop_due(tick) {
        apply(state, action);
    }
}

fn apply(state: &mut WorldState, action: ScheduledAction) {
    match action {
        ScheduledAction::SpawnAsteroid => {
            spawn::spawn_random_asteroid(state);
        }
        ScheduledAction::WaveIncoming { wave } => wave_spawner::announce_wave(state, wave),
        ScheduledAction::WaveStart { wave } => wave_spawner::start_wave(state, wave),
        ScheduledAction::SpawnEnemy { kind, wave } => {
            wave_spawner::spawn_wave_ship(state, kind, wave)
        }
        ScheduledAction::FireTelegraph { ship } => fire_telegraph(state, ship),
    }
}

/// Resolve a ship's telegraph: the beam fires along the telegraphed line unless the
/// ship is stunned, in which case the attack is cancelled. Either way the ship
/// returns to its non-charging state. Ships destroyed meanwhile are skipped.
fn fire_telegraph(state: &mut WorldState, entity: Entity) {
    let now = state.now();
    let Ok((ship, pos, stun)) = state
        .world
        .query_one_mut::<(&mut EnemyShip, &Position, Option<&Stunned>)>(entity)
    else {
        return;
    };
    let Some(telegraph) = ship.telegraph.take() else {
        return;
    };
    if stun.is_some_and(|s| now < s.until_secs) {
        debug!(kind = ?telegraph.kind, "telegraph cancelled by stun");
        return;
    }
    let origin = pos.0;
    spawn::spawn_enemy_beam(&mut state.world, telegraph.kind, origin, telegraph.aim, now);
}
