//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the world state, processes player commands,
//! runs all systems, and produces `GameStateSnapshot`s. Completely headless
//! (no windowing or audio dependency), enabling deterministic testing.

use std::collections::VecDeque;

use glam::DVec2;
use tracing::{debug, info, warn};

use defender_core::commands::PlayerCommand;
use defender_core::config::SimConfig;
use defender_core::enums::GamePhase;
use defender_core::state::GameStateSnapshot;
use defender_core::types::SimTime;

use crate::systems;
use crate::world::WorldState;

/// The simulation engine. Owns the world state and the pending command queue.
pub struct SimulationEngine {
    state: WorldState,
    command_queue: VecDeque<PlayerCommand>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config. Starts at the main menu.
    ///
    /// Out-of-range config fields are clamped into range; use
    /// `SimConfig::validate` first to reject them instead.
    pub fn new(config: SimConfig) -> Self {
        let sanitized = config.sanitized();
        if sanitized != config {
            warn!(?config, ?sanitized, "run configuration out of range, clamped");
        }
        Self {
            state: WorldState::new(sanitized),
            command_queue: VecDeque::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    ///
    /// Queued commands apply first. Systems only run (and time only advances)
    /// while a run is active.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.state.phase == GamePhase::Active {
            self.run_systems();
            self.state.time.advance();
        }

        let audio_events = std::mem::take(&mut self.state.audio_events);
        systems::snapshot::build_snapshot(&self.state, audio_events)
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.state.time
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn config(&self) -> &SimConfig {
        &self.state.config
    }

    /// Read-only view of the full world state.
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Mutable access for harnesses that stage scenarios directly.
    pub fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    /// Spawn a stationary asteroid (for testing).
    #[cfg(test)]
    pub fn spawn_test_asteroid(
        &mut self,
        kind: defender_core::enums::AsteroidKind,
        size: f64,
        hp: f64,
        at: DVec2,
    ) -> hecs::Entity {
        crate::spawn::spawn_asteroid(&mut self.state.world, kind, size, hp, at, DVec2::ZERO, 0.0)
    }

    /// Spawn an enemy ship that will not fire on its own for a long while (for testing).
    #[cfg(test)]
    pub fn spawn_test_enemy(
        &mut self,
        kind: defender_core::enums::EnemyKind,
        at: DVec2,
    ) -> hecs::Entity {
        let now = self.state.now();
        let wave = self.state.wave.number;
        crate::spawn::spawn_enemy_at(&mut self.state.world, kind, wave, at, now, now + 1000.0)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        let now = self.state.now();
        let active = self.state.phase == GamePhase::Active;

        match command {
            PlayerCommand::StartRun => {
                if matches!(self.state.phase, GamePhase::MainMenu | GamePhase::GameOver) {
                    self.begin_run();
                }
            }
            PlayerCommand::Restart => self.begin_run(),
            PlayerCommand::Pause => {
                if active {
                    self.state.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.state.phase == GamePhase::Paused {
                    self.state.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SetMovement {
                up,
                down,
                left,
                right,
            } => {
                let input = &mut self.state.input;
                input.up = up;
                input.down = down;
                input.left = left;
                input.right = right;
            }
            PlayerCommand::SetAim { x, y } => {
                if x.is_finite() && y.is_finite() {
                    self.state.input.aim = DVec2::new(x, y);
                }
            }
            PlayerCommand::FirePressed => {
                if active && !self.state.input.fire_held {
                    self.state.input.fire_held = true;
                    self.state.player.charge_started_at = Some(now);
                }
            }
            PlayerCommand::FireReleased => {
                if self.state.input.fire_held {
                    self.state.input.fire_held = false;
                    let started = self.state.player.charge_started_at.take().unwrap_or(now);
                    self.state.input.release_hold = Some((now - started).max(0.0));
                }
            }
            PlayerCommand::ActivateTimeSlow => {
                if active {
                    self.state.input.time_slow_requested = true;
                }
            }
            PlayerCommand::LaunchMissiles => {
                if active {
                    self.state.input.missiles_requested = true;
                }
            }
            PlayerCommand::ToggleAutoSpawn => {
                let cheats = &mut self.state.cheats;
                cheats.auto_spawn_disabled = !cheats.auto_spawn_disabled;
                info!(
                    disabled = cheats.auto_spawn_disabled,
                    "enemy auto-spawn toggled"
                );
                if active && self.state.enemy_spawning_enabled() {
                    systems::wave_spawner::resume_waves(&mut self.state);
                }
            }
            PlayerCommand::ToggleCooldownBypass => {
                let cheats = &mut self.state.cheats;
                cheats.cooldown_bypass = !cheats.cooldown_bypass;
                debug!(enabled = cheats.cooldown_bypass, "cooldown bypass toggled");
            }
        }
    }

    /// Reset every run-scoped value and start a fresh run.
    fn begin_run(&mut self) {
        self.state.reset();
        self.state.phase = GamePhase::Active;
        systems::wave_spawner::begin_run(&mut self.state);
        info!(
            seed = self.state.config.seed,
            start_wave = self.state.config.start_wave,
            "run started"
        );
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let state = &mut self.state;
        // 1. Deferred events due this tick
        systems::scheduler::run(state);
        // 2. Buff expiry, shield regen, time dilation
        systems::defense::run(state);
        // 3. Player movement
        systems::player::run(state);
        // 4. Weapons and abilities
        systems::weapons::run(state);
        // 5. Kinematics
        systems::movement::run(state);
        // 6. Enemy AI
        systems::enemy_ai::run(state);
        // 7. Ambient asteroids and wave bookkeeping
        systems::wave_spawner::run(state);
        // 8. Collisions and damage
        systems::collision::run(state);
        // 9. Cull and expire
        systems::cleanup::run(state);
    }
}
