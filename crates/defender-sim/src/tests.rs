//! Tests for the simulation engine, weapons, collisions, waves and the defense model.

use glam::DVec2;

use defender_core::commands::PlayerCommand;
use defender_core::components::*;
use defender_core::config::SimConfig;
use defender_core::constants::*;
use defender_core::enums::*;
use defender_core::events::AudioEvent;
use defender_core::types::{Position, Velocity};

use crate::engine::SimulationEngine;
use crate::spawn;
use crate::systems::damage::apply_damage;
use crate::systems::{collision, defense, snapshot, wave_spawner, weapons};
use crate::world::ScheduledAction;

/// Running engine with no ambient asteroids and no enemy waves.
fn quiet_engine() -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 12345,
        ambient_asteroids: false,
        auto_spawn_enemies: false,
        ..Default::default()
    });
    engine.queue_command(PlayerCommand::StartRun);
    engine.tick();
    engine
}

fn asteroid_count(engine: &SimulationEngine) -> usize {
    engine.state().world.query::<&Asteroid>().iter().count()
}

fn ship_count(engine: &SimulationEngine) -> usize {
    engine.state().world.query::<&EnemyShip>().iter().count()
}

fn center() -> DVec2 {
    DVec2::new(640.0, 360.0)
}

// ---- Determinism ----

#[test]
fn test_engine_clamps_degenerate_playfield() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 12345,
        playfield_width: 0.0,
        time_scale: f64::NAN,
        ..Default::default()
    });
    assert_eq!(engine.config().playfield_width, 200.0);
    assert_eq!(engine.config().time_scale, 1.0);

    engine.queue_command(PlayerCommand::StartRun);
    for _ in 0..300 {
        engine.tick();
    }
    assert_eq!(engine.phase(), GamePhase::Active);
    let x = engine.state().player.position.x;
    assert!((0.0..=200.0).contains(&x));
}

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    let mut engine_b = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });

    engine_a.queue_command(PlayerCommand::StartRun);
    engine_b.queue_command(PlayerCommand::StartRun);

    for _ in 0..600 {
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = SimulationEngine::new(SimConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = SimulationEngine::new(SimConfig {
        seed: 222,
        ..Default::default()
    });

    engine_a.queue_command(PlayerCommand::StartRun);
    engine_b.queue_command(PlayerCommand::StartRun);

    // The first ambient asteroid arrives at 0.8 s with a seed-dependent position.
    let mut diverged = false;
    for _ in 0..120 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent output");
}

// ---- Run lifecycle ----

#[test]
fn test_start_run_phase_gating() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    assert_eq!(engine.phase(), GamePhase::MainMenu);

    engine.tick();
    assert_eq!(engine.time().tick, 0, "Main menu must not advance time");

    engine.queue_command(PlayerCommand::StartRun);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Active);
    assert_eq!(engine.time().tick, 1);

    // A second StartRun mid-run is ignored.
    for _ in 0..10 {
        engine.tick();
    }
    engine.queue_command(PlayerCommand::StartRun);
    engine.tick();
    assert_eq!(engine.time().tick, 12);
}

#[test]
fn test_pause_stops_simulation() {
    let mut engine = quiet_engine();
    engine.queue_command(PlayerCommand::Pause);
    let before = engine.time();
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.phase(), GamePhase::Paused);
    assert_eq!(engine.time(), before);

    engine.queue_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Active);
    assert_eq!(engine.time().tick, before.tick + 1);
}

#[test]
fn test_restart_resets_run_state() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    engine.queue_command(PlayerCommand::StartRun);
    for _ in 0..400 {
        engine.tick();
    }

    engine.state_mut().score = 999;
    engine.state_mut().player.hp = 10.0;
    engine.queue_command(PlayerCommand::Restart);
    let snap = engine.tick();

    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(snap.time.tick, 1);
    assert_eq!(snap.score, 0);
    assert!(snap.asteroids.is_empty());
    assert!(snap.ships.is_empty());
    assert!(snap.projectiles.is_empty());
    assert_eq!(snap.player.hp, 100.0);
    assert_eq!(snap.player.resurrections, 1);
    assert_eq!(snap.wave.number, 0);
}

#[test]
fn test_restart_drops_pending_events() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    engine.queue_command(PlayerCommand::StartRun);
    for _ in 0..100 {
        engine.tick();
    }

    engine.queue_command(PlayerCommand::Restart);
    engine.tick();

    // Only the fresh run's opening events remain: three asteroids and the first wave.
    let schedule = &engine.state().schedule;
    assert_eq!(schedule.len(), 4);
    assert!(schedule.any(|a| matches!(a, ScheduledAction::WaveIncoming { wave: 1 })));
}

#[test]
fn test_cheats_survive_restart() {
    let mut engine = quiet_engine();
    engine.queue_command(PlayerCommand::ToggleCooldownBypass);
    engine.queue_command(PlayerCommand::Restart);
    let snap = engine.tick();
    assert!(snap.cheats.cooldown_bypass);
    assert!(snap.cheats.auto_spawn_disabled);
}

// ---- Weapons ----

#[test]
fn test_bullet_kill_awards_size_score() {
    let mut engine = quiet_engine();
    let target = DVec2::new(640.0, 200.0);
    engine.spawn_test_asteroid(AsteroidKind::Normal, 35.0, 2.0, target);

    engine.queue_command(PlayerCommand::SetAim {
        x: target.x,
        y: target.y,
    });
    engine.queue_command(PlayerCommand::FirePressed);
    engine.queue_command(PlayerCommand::FireReleased);

    for _ in 0..60 {
        engine.tick();
    }

    assert_eq!(engine.score(), 35);
    assert_eq!(asteroid_count(&engine), 0);
}

#[test]
fn test_tap_fires_bullet_and_hold_fires_beam() {
    let mut engine = quiet_engine();
    engine.queue_command(PlayerCommand::SetAim { x: 640.0, y: 0.0 });
    engine.queue_command(PlayerCommand::FirePressed);
    engine.queue_command(PlayerCommand::FireReleased);
    let snap = engine.tick();
    assert_eq!(snap.projectiles.len(), 1);
    assert!(snap.beams.is_empty());

    let mut engine = quiet_engine();
    engine.queue_command(PlayerCommand::SetAim { x: 640.0, y: 0.0 });
    engine.queue_command(PlayerCommand::FirePressed);
    for _ in 0..30 {
        let snap = engine.tick();
        assert!(snap.player.charge_ratio > 0.0);
    }
    engine.queue_command(PlayerCommand::FireReleased);
    let snap = engine.tick();
    assert!(snap.projectiles.is_empty());
    assert_eq!(snap.beams.len(), 1);
    assert_eq!(snap.player.charge_ratio, 0.0);
}

#[test]
fn test_tap_inside_cooldown_is_dropped() {
    let mut engine = quiet_engine();
    engine.queue_command(PlayerCommand::SetAim { x: 640.0, y: 0.0 });
    engine.queue_command(PlayerCommand::FirePressed);
    engine.queue_command(PlayerCommand::FireReleased);
    assert_eq!(engine.tick().projectiles.len(), 1);

    engine.queue_command(PlayerCommand::FirePressed);
    engine.queue_command(PlayerCommand::FireReleased);
    assert_eq!(engine.tick().projectiles.len(), 1, "Second tap lands inside the cooldown");

    for _ in 0..20 {
        engine.tick();
    }
    engine.queue_command(PlayerCommand::FirePressed);
    engine.queue_command(PlayerCommand::FireReleased);
    assert_eq!(engine.tick().projectiles.len(), 2);
}

#[test]
fn test_rail_damage_curve() {
    let mut world = hecs::World::new();
    let weak = spawn::spawn_player_beam(&mut world, DVec2::ZERO, 0.0, 0.0);
    let half = spawn::spawn_player_beam(&mut world, DVec2::ZERO, 0.5, 0.0);
    let full = spawn::spawn_player_beam(&mut world, DVec2::ZERO, 1.0, 0.0);

    let beam = world.get::<&PlayerBeam>(weak).unwrap();
    assert_eq!(beam.damage, 2.0);
    assert_eq!(beam.max_hits, 1);
    assert_eq!(beam.length, 400.0);
    drop(beam);

    let beam = world.get::<&PlayerBeam>(half).unwrap();
    assert!((beam.damage - 5.0).abs() < 1e-9);
    assert_eq!(beam.max_hits, 3);
    assert!((beam.length - 800.0).abs() < 1e-9);
    drop(beam);

    let beam = world.get::<&PlayerBeam>(full).unwrap();
    assert_eq!(beam.damage, 14.0);
    assert_eq!(beam.max_hits, 5);
    assert_eq!(beam.length, 1200.0);
}

#[test]
fn test_spread_cancels_rapid_fire() {
    let mut engine = quiet_engine();
    let state = engine.state_mut();
    defense::apply_power_up(state, PowerUpKind::RapidFire);
    defense::apply_power_up(state, PowerUpKind::Spread);

    assert_eq!(state.player.buffs.len(), 1);
    assert_eq!(state.player.buffs[0].kind, BuffKind::Spread);
    assert!(!defense::has_buff(&state.player, BuffKind::RapidFire, state.now()));
}

#[test]
fn test_pierce_never_hits_same_target_twice() {
    let mut engine = quiet_engine();
    let at = DVec2::new(300.0, 300.0);
    let rock = engine.spawn_test_asteroid(AsteroidKind::Armored, 70.0, 15.0, at);
    let pellet = spawn::spawn_player_projectile(
        &mut engine.state_mut().world,
        ProjectileKind::Shrapnel,
        at,
        DVec2::X,
        360.0,
        1.0,
        1,
        320.0,
    );

    for _ in 0..5 {
        engine.tick();
    }

    let world = &engine.state().world;
    assert_eq!(world.get::<&Health>(rock).unwrap().current, 14.0);
    let projectile = world.get::<&PlayerProjectile>(pellet).unwrap();
    assert_eq!(projectile.hit.len(), 1);
    assert_eq!(projectile.pierce_remaining, 0);
}

// ---- Collisions and damage ----

#[test]
fn test_splitting_asteroid_spawns_children() {
    let mut engine = quiet_engine();
    let target = DVec2::new(640.0, 200.0);
    engine.spawn_test_asteroid(AsteroidKind::Splitting, 45.0, 1.0, target);

    engine.queue_command(PlayerCommand::SetAim {
        x: target.x,
        y: target.y,
    });
    engine.queue_command(PlayerCommand::FirePressed);
    engine.queue_command(PlayerCommand::FireReleased);
    for _ in 0..60 {
        engine.tick();
        if engine.score() > 0 {
            break;
        }
    }

    assert_eq!(engine.score(), 45);
    let children: Vec<(Asteroid, Health)> = engine
        .state()
        .world
        .query::<(&Asteroid, &Health)>()
        .iter()
        .map(|(_, (a, h))| (*a, *h))
        .collect();
    assert_eq!(children.len(), 3);
    for (asteroid, health) in children {
        assert_eq!(asteroid.kind, AsteroidKind::Fast);
        assert_eq!(asteroid.size, 20.0);
        assert_eq!(health.max, 1.0);
    }
}

#[test]
fn test_shield_first_and_instant_kill() {
    let mut health = Health {
        current: 10.0,
        max: 10.0,
    };
    let mut shield = Shield {
        current: 5.0,
        max: 5.0,
    };
    let outcome = apply_damage(&mut health, Some(&mut shield), 3.0);
    assert_eq!(shield.current, 2.0);
    assert_eq!(health.current, 10.0);
    assert_eq!(outcome.shield_absorbed, 3.0);

    let outcome = apply_damage(&mut health, Some(&mut shield), 4.0);
    assert_eq!(shield.current, 0.0);
    assert_eq!(health.current, 8.0);
    assert_eq!(outcome.hp_lost, 2.0);

    let mut health = Health {
        current: 20.0,
        max: 20.0,
    };
    let mut shield = Shield {
        current: 5.0,
        max: 5.0,
    };
    let outcome = apply_damage(&mut health, Some(&mut shield), 12.0);
    assert_eq!(shield.current, 5.0, "Instant-kill blows bypass the shield");
    assert_eq!(health.current, 8.0);
    assert!(!outcome.killed);

    let outcome = apply_damage(&mut health, None, 50.0);
    assert_eq!(health.current, 0.0);
    assert!(outcome.killed);
}

#[test]
fn test_one_asteroid_contact_per_tick() {
    let mut engine = quiet_engine();
    engine.spawn_test_asteroid(AsteroidKind::Normal, 30.0, 5.0, center() + DVec2::new(20.0, 0.0));
    engine.spawn_test_asteroid(AsteroidKind::Normal, 30.0, 5.0, center() - DVec2::new(20.0, 0.0));

    let snap = engine.tick();
    assert_eq!(snap.player.shield, 30.0);
    assert_eq!(snap.player.hp, 100.0);
    assert!(snap.player.invulnerable);
    assert_eq!(snap.asteroids.len(), 1);
    assert_eq!(snap.score, 0, "Contact kills award nothing");

    let snap = engine.tick();
    assert_eq!(snap.player.shield, 30.0);
    assert_eq!(snap.asteroids.len(), 1);
}

#[test]
fn test_sniper_beam_resolves_once() {
    let mut engine = quiet_engine();
    let ship = engine.spawn_test_enemy(EnemyKind::Sniper, DVec2::new(640.0, 250.0));

    let state = engine.state_mut();
    let now = state.now();
    state.player.shield = 0.0;
    state.player.last_damage_at = now;
    let aim = state.player.position;
    state.world.get::<&mut EnemyShip>(ship).unwrap().telegraph = Some(Telegraph {
        kind: TelegraphKind::SniperBeam,
        aim,
        started_at: now,
        fires_at: now + 0.1,
    });
    state.schedule_in(0.1, ScheduledAction::FireTelegraph { ship });

    let mut saw_beam = false;
    for _ in 0..60 {
        let snap = engine.tick();
        saw_beam |= !snap.enemy_beams.is_empty();
    }

    assert!(saw_beam);
    assert_eq!(engine.state().player.hp, 70.0);
    let world = &engine.state().world;
    assert!(world.get::<&EnemyShip>(ship).unwrap().telegraph.is_none());
    assert_eq!(world.query::<&EnemyBeam>().iter().count(), 0);
}

#[test]
fn test_snap_beam_damages_and_stuns_player() {
    let mut engine = quiet_engine();
    let state = engine.state_mut();
    let now = state.now();
    let player_at = state.player.position;
    spawn::spawn_enemy_beam(
        &mut state.world,
        TelegraphKind::SnapBeam,
        DVec2::new(player_at.x, 100.0),
        player_at,
        now,
    );

    collision::run(state);

    assert_eq!(state.player.shield, 50.0 - SNAP_BEAM_DAMAGE);
    assert_eq!(state.player.hp, 100.0);
    assert_eq!(state.player.stun_until, now + SNAP_STUN_SECS);
    assert_eq!(state.player.velocity, DVec2::ZERO);
}

#[test]
fn test_stunned_telegraph_is_cancelled() {
    let mut engine = quiet_engine();
    let ship = engine.spawn_test_enemy(EnemyKind::Sniper, DVec2::new(640.0, 250.0));

    let state = engine.state_mut();
    let now = state.now();
    let aim = state.player.position;
    state.world.get::<&mut EnemyShip>(ship).unwrap().telegraph = Some(Telegraph {
        kind: TelegraphKind::SniperBeam,
        aim,
        started_at: now,
        fires_at: now + 0.1,
    });
    let _ = state.world.insert_one(ship, Stunned { until_secs: now + 5.0 });
    state.schedule_in(0.1, ScheduledAction::FireTelegraph { ship });

    for _ in 0..30 {
        let snap = engine.tick();
        assert!(snap.enemy_beams.is_empty());
    }
    assert_eq!(engine.state().player.hp, 100.0);
    assert_eq!(engine.state().player.shield, 50.0);
    let world = &engine.state().world;
    assert!(world.get::<&EnemyShip>(ship).unwrap().telegraph.is_none());
}

#[test]
fn test_missile_ricochets_off_shielded_ship() {
    let mut engine = quiet_engine();
    let captain_at = DVec2::new(640.0, 200.0);
    let captain = engine.spawn_test_enemy(EnemyKind::Captain, captain_at);
    let rock = engine.spawn_test_asteroid(AsteroidKind::Armored, 70.0, 15.0, DVec2::new(200.0, 200.0));

    let state = engine.state_mut();
    let now = state.now();
    let target = MissileTarget {
        id: captain.to_bits().get(),
        kind: TargetKind::Ship,
    };
    let missile =
        spawn::spawn_player_missile(&mut state.world, captain_at, DVec2::NEG_Y, Some(target), now);

    engine.tick();

    // Seed 12345 rolls a ricochet on this hit.
    let world = &engine.state().world;
    assert_eq!(world.get::<&Shield>(captain).unwrap().current, 6.0);
    let m = world
        .get::<&PlayerMissile>(missile)
        .expect("missile should survive a ricochet");
    assert_eq!(m.ricochets, 1);
    assert!((m.damage - 4.2).abs() < 1e-9);
    assert_eq!(m.target.map(|t| t.id), Some(rock.to_bits().get()));
    assert_eq!(m.hit, vec![captain.to_bits().get()]);
}

#[test]
fn test_missile_detonates_on_unshielded_target() {
    let mut engine = quiet_engine();
    let at = DVec2::new(300.0, 200.0);
    let rock = engine.spawn_test_asteroid(AsteroidKind::Armored, 70.0, 15.0, at);

    let state = engine.state_mut();
    let now = state.now();
    let target = MissileTarget {
        id: rock.to_bits().get(),
        kind: TargetKind::Asteroid,
    };
    let missile = spawn::spawn_player_missile(&mut state.world, at, DVec2::NEG_Y, Some(target), now);

    engine.tick();

    let world = &engine.state().world;
    assert!(world.get::<&PlayerMissile>(missile).is_err());
    assert_eq!(world.get::<&Health>(rock).unwrap().current, 9.0);
}

#[test]
fn test_missile_flies_straight_after_losing_target() {
    let mut engine = quiet_engine();
    let rock = engine.spawn_test_asteroid(AsteroidKind::Normal, 30.0, 2.0, DVec2::new(1100.0, 100.0));

    let state = engine.state_mut();
    let now = state.now();
    let target = MissileTarget {
        id: rock.to_bits().get(),
        kind: TargetKind::Asteroid,
    };
    let from = DVec2::new(200.0, 600.0);
    let missile = spawn::spawn_player_missile(&mut state.world, from, DVec2::NEG_Y, Some(target), now);
    let _ = state.world.despawn(rock);

    for _ in 0..10 {
        engine.tick();
    }

    let world = &engine.state().world;
    let m = world.get::<&PlayerMissile>(missile).unwrap();
    assert!(m.target.is_none());
    let vel = world.get::<&Velocity>(missile).unwrap();
    assert_eq!(vel.0, DVec2::NEG_Y * MISSILE_SPEED);
    let pos = world.get::<&Position>(missile).unwrap();
    assert!((pos.0.x - from.x).abs() < 1e-9);
}

#[test]
fn test_homing_grenade_tracking_window() {
    let mut engine = quiet_engine();
    let state = engine.state_mut();
    let now = state.now();

    spawn::spawn_homing_grenade(&mut state.world, DVec2::new(100.0, 100.0), DVec2::X, 0, now);
    for (_entity, grenade) in state.world.query_mut::<&mut EnemyMissile>() {
        grenade.age = GRENADE_TRACKING_SECS;
    }
    spawn::spawn_homing_grenade(&mut state.world, DVec2::new(100.0, 600.0), DVec2::X, 0, now);

    engine.tick();

    let world = &engine.state().world;
    let mut seen = 0;
    for (_entity, (grenade, vel)) in world.query::<(&EnemyMissile, &Velocity)>().iter() {
        seen += 1;
        if grenade.age > GRENADE_TRACKING_SECS {
            assert_eq!(vel.0, DVec2::X * GRENADE_SPEED, "Expired grenade flies straight");
        } else {
            // Player is up and to the right of this one.
            assert!(vel.0.y < 0.0, "Fresh grenade turns toward the player");
        }
    }
    assert_eq!(seen, 2);
}

#[test]
fn test_stun_grenade_spares_its_owner() {
    let mut engine = quiet_engine();
    let burst_at = DVec2::new(640.0, 150.0);
    let tank = engine.spawn_test_enemy(EnemyKind::Tank, burst_at);
    let fighter = engine.spawn_test_enemy(EnemyKind::Fighter, DVec2::new(700.0, 150.0));

    let state = engine.state_mut();
    let now = state.now();
    spawn::spawn_stun_grenade(&mut state.world, burst_at, burst_at, tank.to_bits().get(), now);
    for (_entity, grenade) in state.world.query_mut::<&mut EnemyMissile>() {
        grenade.fuse_at = now;
    }

    engine.tick();

    let world = &engine.state().world;
    assert!(world.get::<&Stunned>(tank).is_err());
    assert!(world.get::<&Stunned>(fighter).unwrap().until_secs > engine.state().now());
    assert_eq!(world.query::<&EnemyMissile>().iter().count(), 0);
    assert_eq!(engine.state().player.stun_until, 0.0, "Player was out of range");
}

#[test]
fn test_stunned_ship_does_not_move() {
    let mut engine = quiet_engine();
    let at = DVec2::new(640.0, 100.0);
    let ship = engine.spawn_test_enemy(EnemyKind::Fighter, at);
    let now = engine.state().now();
    let _ = engine
        .state_mut()
        .world
        .insert_one(ship, Stunned { until_secs: now + 5.0 });

    for _ in 0..30 {
        engine.tick();
    }

    let snap = engine.tick();
    assert_eq!(snap.ships.len(), 1);
    assert_eq!(snap.ships[0].position, at);
    assert!(snap.ships[0].stunned);
}

#[test]
fn test_collision_pass_is_idempotent() {
    let mut engine = quiet_engine();
    let at = DVec2::new(300.0, 300.0);
    engine.spawn_test_asteroid(AsteroidKind::Armored, 70.0, 15.0, at);
    engine.spawn_test_enemy(EnemyKind::Captain, DVec2::new(900.0, 300.0));
    spawn::spawn_player_projectile(
        &mut engine.state_mut().world,
        ProjectileKind::Shrapnel,
        at,
        DVec2::X,
        360.0,
        1.0,
        1,
        320.0,
    );

    let state = engine.state_mut();
    collision::run(state);
    let first = serde_json::to_string(&snapshot::build_snapshot(state, Vec::new())).unwrap();
    collision::run(state);
    let second = serde_json::to_string(&snapshot::build_snapshot(state, Vec::new())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_ram_pass_is_idempotent_with_two_ships() {
    let mut engine = quiet_engine();
    let at = DVec2::new(300.0, 200.0);
    let rock = engine.spawn_test_asteroid(AsteroidKind::Armored, 70.0, 15.0, at);
    let left = engine.spawn_test_enemy(EnemyKind::Fighter, DVec2::new(220.0, 200.0));
    let right = engine.spawn_test_enemy(EnemyKind::Fighter, DVec2::new(380.0, 200.0));

    let state = engine.state_mut();
    collision::run(state);
    let first = serde_json::to_string(&snapshot::build_snapshot(state, Vec::new())).unwrap();
    collision::run(state);
    let second = serde_json::to_string(&snapshot::build_snapshot(state, Vec::new())).unwrap();
    assert_eq!(first, second);

    let world = &engine.state().world;
    assert_eq!(world.get::<&Health>(rock).unwrap().current, 15.0 - 2.0 * RAM_DAMAGE);
    assert_eq!(world.get::<&Health>(left).unwrap().current, 6.0 - RAM_DAMAGE);
    assert_eq!(world.get::<&Health>(right).unwrap().current, 6.0 - RAM_DAMAGE);
}

#[test]
fn test_shrapnel_kill_pops_neighbours() {
    let mut engine = quiet_engine();
    let at = DVec2::new(300.0, 300.0);
    let victim = engine.spawn_test_asteroid(AsteroidKind::Normal, 20.0, 1.0, at);
    let neighbour = engine.spawn_test_asteroid(AsteroidKind::Normal, 20.0, 5.0, DVec2::new(350.0, 300.0));
    let distant = engine.spawn_test_asteroid(AsteroidKind::Normal, 20.0, 5.0, DVec2::new(500.0, 300.0));
    spawn::spawn_player_projectile(
        &mut engine.state_mut().world,
        ProjectileKind::Shrapnel,
        at,
        DVec2::X,
        360.0,
        1.0,
        0,
        320.0,
    );

    collision::run(engine.state_mut());

    let world = &engine.state().world;
    assert!(!world.contains(victim));
    assert_eq!(
        world.get::<&Health>(neighbour).unwrap().current,
        5.0 - SHRAPNEL_DAMAGE
    );
    assert_eq!(world.get::<&Health>(distant).unwrap().current, 5.0);
    assert_eq!(engine.score(), 20);
}

#[test]
fn test_fire_interval_ramp_and_spin_bounds() {
    let rapid = ActiveBuff {
        kind: BuffKind::RapidFire,
        started_at: 0.0,
        expires_at: 45.0,
    };
    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;

    assert!(close(weapons::fire_interval(&rapid, 0.0, 0.0), RAPID_FIRE_START_INTERVAL_SECS));
    assert!(close(
        weapons::fire_interval(&rapid, RAPID_FIRE_RAMP_SECS, 0.0),
        RAPID_FIRE_END_INTERVAL_SECS
    ));
    assert!(close(
        weapons::fire_interval(&rapid, RAPID_FIRE_RAMP_SECS, 1.0),
        RAPID_FIRE_END_INTERVAL_SECS * (1.0 - SPIN_INTERVAL_BONUS)
    ));
    assert!(close(
        weapons::fire_interval(&rapid, 0.0, 1.0),
        RAPID_FIRE_START_INTERVAL_SECS * (1.0 - SPIN_INTERVAL_BONUS)
    ));
    // Past the ramp and with out-of-range spin the interval stays at its floor.
    assert!(close(
        weapons::fire_interval(&rapid, 100.0, 5.0),
        RAPID_FIRE_END_INTERVAL_SECS * (1.0 - SPIN_INTERVAL_BONUS)
    ));

    let spread = ActiveBuff {
        kind: BuffKind::Spread,
        started_at: 10.0,
        expires_at: 40.0,
    };
    assert!(close(weapons::fire_interval(&spread, 10.0, 0.0), SPREAD_START_INTERVAL_SECS));
    assert!(close(
        weapons::fire_interval(&spread, 10.0 + SPREAD_RAMP_SECS / 2.0, 0.0),
        (SPREAD_START_INTERVAL_SECS + SPREAD_END_INTERVAL_SECS) / 2.0
    ));
}

/// Arm a weapon buff with the trigger held and one shot due now.
fn hold_trigger_with_buff(engine: &mut SimulationEngine, kind: BuffKind, spin: f64) {
    let state = engine.state_mut();
    let now = state.now();
    state.player.buffs.push(ActiveBuff {
        kind,
        started_at: now,
        expires_at: now + 30.0,
    });
    state.player.spin = spin;
    state.player.next_shot_at = now;
    state.input.fire_held = true;
    state.input.aim = state.player.position + DVec2::new(0.0, -200.0);
}

/// Signed angle of each player projectile's heading relative to straight up.
fn projectile_offsets(engine: &SimulationEngine) -> Vec<(f64, PlayerProjectile)> {
    engine
        .state()
        .world
        .query::<(&PlayerProjectile, &Velocity)>()
        .iter()
        .map(|(_, (projectile, vel))| {
            let offset = DVec2::NEG_Y.perp_dot(vel.0).atan2(DVec2::NEG_Y.dot(vel.0));
            (offset, projectile.clone())
        })
        .collect()
}

#[test]
fn test_rapid_fire_jitter_narrows_with_spin() {
    let mut engine = quiet_engine();
    hold_trigger_with_buff(&mut engine, BuffKind::RapidFire, 1.0);
    weapons::run(engine.state_mut());

    let shots = projectile_offsets(&engine);
    assert_eq!(shots.len(), 1);
    assert!(shots[0].0.abs() < 1e-9, "Full spin fires dead straight");

    let mut engine = quiet_engine();
    hold_trigger_with_buff(&mut engine, BuffKind::RapidFire, 0.0);
    weapons::run(engine.state_mut());

    let shots = projectile_offsets(&engine);
    assert_eq!(shots.len(), 1);
    assert!(shots[0].0.abs() <= RAPID_FIRE_MAX_JITTER + 1e-9);
    assert!(engine.state().player.spin > 0.0, "Holding the trigger spins up");
}

#[test]
fn test_spread_volley_is_symmetric_fan() {
    let mut engine = quiet_engine();
    hold_trigger_with_buff(&mut engine, BuffKind::Spread, 0.0);
    weapons::run(engine.state_mut());

    let mut pellets = projectile_offsets(&engine);
    assert_eq!(pellets.len(), SPREAD_PELLETS);
    pellets.sort_by(|a, b| a.0.total_cmp(&b.0));

    let half = (SPREAD_PELLETS as f64 - 1.0) / 2.0;
    for (i, (offset, pellet)) in pellets.iter().enumerate() {
        let expected = (i as f64 - half) * SPREAD_ANGLE_STEP;
        assert!((offset - expected).abs() < 1e-9);
        assert_eq!(pellet.kind, ProjectileKind::Shrapnel);
        assert_eq!(pellet.pierce_remaining, SPREAD_PIERCE);
        assert_eq!(pellet.damage, SPREAD_DAMAGE);
    }
}

#[test]
fn test_power_up_collected_inside_pickup_radius() {
    let mut engine = quiet_engine();
    let state = engine.state_mut();
    let player_at = state.player.position;
    state.player.hp = 50.0;
    let near = state.world.spawn((
        PowerUp {
            kind: PowerUpKind::Health,
        },
        Position(player_at + DVec2::new(POWER_UP_PICKUP_RADIUS - 1.0, 0.0)),
        Velocity(DVec2::ZERO),
    ));
    let far = state.world.spawn((
        PowerUp {
            kind: PowerUpKind::Health,
        },
        Position(player_at + DVec2::new(0.0, POWER_UP_PICKUP_RADIUS + 5.0)),
        Velocity(DVec2::ZERO),
    ));

    collision::run(state);

    assert!(!state.world.contains(near));
    assert!(state.world.contains(far));
    assert_eq!(state.player.hp, (50.0 + POWER_UP_HEAL).min(PLAYER_MAX_HP));
}

#[test]
fn test_cleanup_culls_out_of_bounds_and_spent() {
    let mut engine = quiet_engine();
    engine.spawn_test_asteroid(AsteroidKind::Normal, 30.0, 2.0, DVec2::new(-500.0, -500.0));
    spawn::spawn_player_projectile(
        &mut engine.state_mut().world,
        ProjectileKind::Standard,
        DVec2::new(100.0, 100.0),
        DVec2::X,
        360.0,
        2.0,
        0,
        0.0,
    );

    let snap = engine.tick();
    assert!(snap.asteroids.is_empty());
    assert!(snap.projectiles.is_empty());
}

// ---- Defense model ----

#[test]
fn test_resurrection_then_game_over() {
    let mut engine = quiet_engine();
    let state = engine.state_mut();
    state.player.shield = 0.0;

    assert!(defense::damage_player(state, 150.0));
    assert_eq!(state.player.resurrections, 0);
    assert_eq!(state.player.hp, 100.0);
    assert!(defense::is_invulnerable(&state.player, state.now()));
    assert!(!defense::damage_player(state, 150.0), "Grace blocks damage");

    state.player.invulnerable_until = 0.0;
    state.player.grace_until = 0.0;
    assert!(defense::damage_player(state, 150.0));
    assert_eq!(state.player.hp, 0.0);
    assert_eq!(state.phase, GamePhase::GameOver);
    assert!(state.schedule.is_empty());

    let snap = engine.tick();
    assert!(snap.game_over);
}

#[test]
fn test_rapid_fire_shield_cost() {
    let mut engine = quiet_engine();
    let state = engine.state_mut();

    defense::damage_player(state, 10.0);
    assert_eq!(state.player.shield, 40.0);

    state.player.shield = 50.0;
    defense::apply_power_up(state, PowerUpKind::RapidFire);
    defense::damage_player(state, 10.0);
    assert_eq!(state.player.shield, 35.0);
    assert_eq!(state.player.hp, 100.0);

    state.player.shield = 15.0;
    defense::damage_player(state, 16.0);
    assert_eq!(state.player.shield, 0.0);
    assert_eq!(state.player.hp, 94.0);
}

#[test]
fn test_overshield_caps_and_regen() {
    let mut engine = quiet_engine();
    let state = engine.state_mut();

    defense::apply_power_up(state, PowerUpKind::Overshield);
    defense::apply_power_up(state, PowerUpKind::Overshield);
    assert_eq!(state.player.shield, 100.0);

    // Regen only refills the base layer.
    state.player.shield = 10.0;
    state.player.last_damage_at = -10.0;
    for _ in 0..600 {
        engine.tick();
    }
    assert_eq!(engine.state().player.shield, 50.0);
}

#[test]
fn test_time_dilation_does_not_compound() {
    let player = Player {
        time_slow_until: 10.0,
        grace_until: 10.0,
        ..Player::default()
    };
    assert_eq!(defense::time_dilation(&player, 1.0), 0.3);
    assert_eq!(defense::time_dilation(&player, 11.0), 1.0);
}

#[test]
fn test_time_slow_cooldown_and_bypass() {
    let mut engine = quiet_engine();
    engine.queue_command(PlayerCommand::ActivateTimeSlow);
    let snap = engine.tick();
    assert!(snap.player.time_slow_cooldown_secs > 14.0);

    engine.queue_command(PlayerCommand::ActivateTimeSlow);
    engine.tick();
    let until = engine.state().player.time_slow_until;

    engine.queue_command(PlayerCommand::ToggleCooldownBypass);
    engine.queue_command(PlayerCommand::ActivateTimeSlow);
    engine.tick();
    assert!(engine.state().player.time_slow_until > until);
}

// ---- Waves ----

#[test]
fn test_wave_composition() {
    assert_eq!(wave_spawner::compose_wave(1), vec![EnemyKind::Fighter; 3]);
    assert_eq!(
        wave_spawner::compose_wave(2)
            .iter()
            .filter(|k| **k == EnemyKind::Sniper)
            .count(),
        1
    );
    assert!(wave_spawner::compose_wave(3).contains(&EnemyKind::Aggressive));

    for wave in 4..=20u32 {
        let kinds = wave_spawner::compose_wave(wave);
        let tanks = kinds.iter().filter(|k| **k == EnemyKind::Tank).count();
        if wave % 5 == 0 {
            assert_eq!(tanks, 1, "wave {wave}");
            assert_eq!(kinds.len(), 4 + wave as usize - 1, "wave {wave}");
        } else {
            assert_eq!(tanks, 0, "wave {wave}");
            assert_eq!(kinds.len(), 4 + wave as usize, "wave {wave}");
        }
        assert_eq!(
            kinds.contains(&EnemyKind::Grenadier),
            wave >= 5,
            "wave {wave}"
        );
    }
}

#[test]
fn test_spawn_gap_shrinks_to_floor() {
    assert!((wave_spawner::spawn_gap(1) - 1.15).abs() < 1e-9);
    assert!(wave_spawner::spawn_gap(10) < wave_spawner::spawn_gap(5));
    assert_eq!(wave_spawner::spawn_gap(100), 0.35);
}

#[test]
fn test_wave_start_deferred_while_tank_alive() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 12345,
        ambient_asteroids: false,
        ..Default::default()
    });
    engine.queue_command(PlayerCommand::StartRun);
    engine.tick();
    let tank = engine.spawn_test_enemy(EnemyKind::Tank, DVec2::new(100.0, 100.0));

    let state = engine.state_mut();
    wave_spawner::start_wave(state, 1);
    assert_ne!(state.wave.phase, WavePhase::InProgress);
    assert_eq!(state.wave.pending_spawns, 0);
    assert!(state
        .schedule
        .any(|a| matches!(a, ScheduledAction::WaveStart { wave: 1 })));

    let _ = state.world.despawn(tank);
    wave_spawner::start_wave(state, 1);
    assert_eq!(state.wave.phase, WavePhase::InProgress);
    assert_eq!(state.wave.pending_spawns, 3);
}

#[test]
fn test_first_wave_spawns_fighters() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 12345,
        ambient_asteroids: false,
        ..Default::default()
    });
    engine.queue_command(PlayerCommand::StartRun);

    let mut incoming = false;
    let mut started = false;
    for _ in 0..(8 * 60) {
        let snap = engine.tick();
        for event in &snap.audio_events {
            match event {
                AudioEvent::WaveIncoming { wave } => {
                    assert_eq!(*wave, 1);
                    incoming = true;
                }
                AudioEvent::WaveStart { wave, ships } => {
                    assert_eq!((*wave, *ships), (1, 3));
                    started = true;
                }
                _ => {}
            }
        }
    }

    assert!(incoming && started);
    assert_eq!(engine.state().wave.pending_spawns, 0);
    let fighters = engine
        .state()
        .world
        .query::<&EnemyShip>()
        .iter()
        .filter(|(_, s)| s.kind == EnemyKind::Fighter && s.wave == 1)
        .count();
    assert!(fighters <= 3);
    assert!(fighters > 0 || engine.score() > 0);
}

#[test]
fn test_auto_spawn_cheat_keeps_asteroids() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 12345,
        auto_spawn_enemies: false,
        ..Default::default()
    });
    engine.queue_command(PlayerCommand::StartRun);

    for _ in 0..150 {
        engine.tick();
    }
    assert_eq!(asteroid_count(&engine), 3);

    for _ in 0..600 {
        engine.tick();
    }
    assert_eq!(ship_count(&engine), 0);
    assert_eq!(engine.state().wave.number, 0);
    assert_eq!(engine.state().wave.phase, WavePhase::Idle);
}

#[test]
fn test_reenabling_auto_spawn_resumes_waves() {
    let mut engine = quiet_engine();
    assert!(engine.state().schedule.is_empty());

    engine.queue_command(PlayerCommand::ToggleAutoSpawn);
    engine.tick();
    assert!(engine
        .state()
        .schedule
        .any(|a| matches!(a, ScheduledAction::WaveIncoming { wave: 1 })));
}
