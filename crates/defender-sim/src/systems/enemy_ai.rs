//! Enemy AI system: runs the per-archetype FSM for every ship and applies its decisions.
//!
//! Calls the FSM from defender-ai, then writes velocities and cooldowns back to the
//! ship components, spawns ordnance and schedules telegraphed attacks.

use glam::DVec2;
use hecs::Entity;

use defender_core::components::{EnemyShip, Stunned, Telegraph};
use defender_core::constants::DT;
use defender_core::types::{Position, Velocity};

use defender_ai::fsm::{evaluate, EnemyAction, EnemyContext, EnemyUpdate};
use defender_ai::profiles::get_profile;

use crate::spawn;
use crate::world::{ScheduledAction, WorldState};

pub fn run(state: &mut WorldState) {
    let now = state.now();
    let dt = DT * state.time_dilation;
    let player_position = state.player.position;
    let player_velocity = state.player.velocity;

    // Collect updates in a buffer to avoid borrow issues with hecs
    let mut updates: Vec<(Entity, DVec2, f64, EnemyUpdate)> = Vec::new();
    {
        let mut query = state
            .world
            .query::<(&EnemyShip, &Position, &Velocity, Option<&Stunned>)>();
        for (entity, (ship, pos, vel, stun)) in query.iter() {
            let ctx = EnemyContext {
                kind: ship.kind,
                position: pos.0,
                velocity: vel.0,
                player_position,
                player_velocity,
                now,
                dt,
                stunned: stun.is_some_and(|s| now < s.until_secs),
                next_fire_at: ship.next_fire_at,
                next_grenade_at: ship.next_grenade_at,
                next_snap_at: ship.next_snap_at,
                telegraph: ship.telegraph,
            };
            let radius = get_profile(ship.kind).radius;
            updates.push((entity, pos.0, radius, evaluate(&ctx, &mut state.rng)));
        }
    }

    for (entity, position, radius, update) in updates {
        if let Ok(mut vel) = state.world.get::<&mut Velocity>(entity) {
            vel.0 = update.velocity;
        }
        if let Ok(mut ship) = state.world.get::<&mut EnemyShip>(entity) {
            ship.rotation = update.rotation;
            ship.next_fire_at = update.next_fire_at;
            ship.next_grenade_at = update.next_grenade_at;
            ship.next_snap_at = update.next_snap_at;
        }

        let owner = entity.to_bits().get();
        for action in update.actions {
            match action {
                EnemyAction::Shoot {
                    direction,
                    speed,
                    damage,
                } => {
                    spawn::spawn_enemy_projectile(
                        &mut state.world,
                        position + direction * radius,
                        direction * speed,
                        damage,
                    );
                }
                EnemyAction::LaunchGrenade { direction } => {
                    spawn::spawn_homing_grenade(
                        &mut state.world,
                        position + direction * radius,
                        direction,
                        owner,
                        now,
                    );
                }
                EnemyAction::LobStunGrenade { destination } => {
                    spawn::spawn_stun_grenade(&mut state.world, position, destination, owner, now);
                }
                EnemyAction::BeginTelegraph {
                    kind,
                    aim,
                    fires_at,
                } => {
                    if let Ok(mut ship) = state.world.get::<&mut EnemyShip>(entity) {
                        ship.telegraph = Some(Telegraph {
                            kind,
                            aim,
                            started_at: now,
                            fires_at,
                        });
                    }
                    state.schedule_in(
                        fires_at - now,
                        ScheduledAction::FireTelegraph { ship: entity },
                    );
                }
            }
        }
    }
}
