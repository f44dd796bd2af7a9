//! Cleanup system: removes entities that left the playfield or ran out of life.

use defender_core::components::*;
use defender_core::constants::CULL_MARGIN;
use defender_core::types::Position;

use crate::world::WorldState;

/// Cull everything beyond the playfield margin, spent or expired ordnance, and
/// dead particles. Uses the pre-allocated despawn buffer.
pub fn run(state: &mut WorldState) {
    let now = state.now();
    let size = state.playfield_size();
    let buffer = &mut state.despawn_buffer;
    buffer.clear();

    let out_of_bounds = |pos: &Position| {
        pos.0.x < -CULL_MARGIN
            || pos.0.y < -CULL_MARGIN
            || pos.0.x > size.x + CULL_MARGIN
            || pos.0.y > size.y + CULL_MARGIN
    };

    for (entity, pos) in state.world.query_mut::<&Position>() {
        if out_of_bounds(pos) {
            buffer.push(entity);
        }
    }

    for (entity, projectile) in state.world.query_mut::<&PlayerProjectile>() {
        if projectile.traveled >= projectile.max_range {
            buffer.push(entity);
        }
    }

    for (entity, beam) in state.world.query_mut::<&PlayerBeam>() {
        if now >= beam.expires_at {
            buffer.push(entity);
        }
    }

    for (entity, beam) in state.world.query_mut::<&EnemyBeam>() {
        if beam.resolved && now >= beam.expires_at {
            buffer.push(entity);
        }
    }

    for (entity, missile) in state.world.query_mut::<&PlayerMissile>() {
        if now >= missile.expires_at {
            buffer.push(entity);
        }
    }

    for (entity, grenade) in state.world.query_mut::<&EnemyMissile>() {
        if now >= grenade.expires_at {
            buffer.push(entity);
        }
    }

    for (entity, particle) in state.world.query_mut::<&Particle>() {
        if particle.life <= 0.0 {
            buffer.push(entity);
        }
    }

    // An entity can match several rules; despawning twice is harmless.
    for entity in buffer.drain(..) {
        let _ = state.world.despawn(entity);
    }
}
