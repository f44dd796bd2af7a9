//! Player ship movement from 8-way intent flags.

use glam::DVec2;

use defender_core::constants::*;

use crate::world::WorldState;

/// Thrust, friction, speed cap and edge clamp. A stunned ship stays put.
pub fn run(state: &mut WorldState) {
    let now = state.now();
    let bounds = state.playfield_size();
    let input = &state.input;
    let player = &mut state.player;

    if now < player.stun_until {
        player.velocity = DVec2::ZERO;
        return;
    }

    let mut thrust = DVec2::ZERO;
    if input.up {
        thrust.y -= 1.0;
    }
    if input.down {
        thrust.y += 1.0;
    }
    if input.left {
        thrust.x -= 1.0;
    }
    if input.right {
        thrust.x += 1.0;
    }

    player.velocity += thrust.normalize_or_zero() * PLAYER_ACCEL * DT;
    player.velocity *= PLAYER_FRICTION;
    player.velocity = player.velocity.clamp_length_max(PLAYER_MAX_SPEED);
    player.position += player.velocity * DT;

    let min = DVec2::splat(PLAYER_EDGE_MARGIN);
    let max = bounds - DVec2::splat(PLAYER_EDGE_MARGIN);
    player.position = player.position.clamp(min, max);
}
