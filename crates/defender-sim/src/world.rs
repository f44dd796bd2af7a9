//! World state: the single owned store every system borrows for one tick.
//!
//! Holds the hecs entity store, the player record, input signals, wave bookkeeping,
//! the scheduled-event queue and the seeded RNG. Systems receive `&mut WorldState`;
//! nothing in the simulation reaches for global state.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use defender_core::components::Player;
use defender_core::config::SimConfig;
use defender_core::enums::{EnemyKind, GamePhase, WavePhase};
use defender_core::events::AudioEvent;
use defender_core::types::SimTime;

/// A deferred mutation, applied at the start of the tick it is due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledAction {
    /// Spawn one ambient asteroid.
    SpawnAsteroid,
    /// Announce a wave.
    WaveIncoming { wave: u32 },
    /// Begin spawning an announced wave.
    WaveStart { wave: u32 },
    /// Spawn one ship of a running wave.
    SpawnEnemy { kind: EnemyKind, wave: u32 },
    /// Resolve a ship's pending telegraphed attack.
    FireTelegraph { ship: Entity },
}

/// Scheduled events keyed by `(due tick, insertion sequence)`.
///
/// Events due on the same tick apply in insertion order. Clearing the schedule
/// cancels every pending event at once.
#[derive(Debug, Default)]
pub struct EventSchedule {
    queue: BTreeMap<(u64, u64), ScheduledAction>,
    next_seq: u64,
}

impl EventSchedule {
    pub fn push(&mut self, due_tick: u64, action: ScheduledAction) {
        self.queue.insert((due_tick, self.next_seq), action);
        self.next_seq += 1;
    }

    /// Remove and return the earliest event due at or before `tick`.
    pub fn pop_due(&mut self, tick: u64) -> Option<ScheduledAction> {
        let entry = self.queue.first_entry()?;
        if entry.key().0 <= tick {
            Some(entry.remove())
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether any pending event matches `pred`.
    pub fn any(&self, pred: impl Fn(&ScheduledAction) -> bool) -> bool {
        self.queue.values().any(pred)
    }
}

/// Input signals placed by the input collaborator, consumed by the player and weapon systems.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub aim: DVec2,
    pub fire_held: bool,
    /// Hold duration of a trigger release not yet consumed by the weapon system.
    pub release_hold: Option<f64>,
    pub time_slow_requested: bool,
    pub missiles_requested: bool,
}

/// Debug toggles. Survive restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cheats {
    pub auto_spawn_disabled: bool,
    pub cooldown_bypass: bool,
}

/// Wave scheduler bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaveState {
    /// Number of the current (or last) wave. 0 before the first.
    pub number: u32,
    pub phase: WavePhase,
    /// Ships of the current wave still waiting for their spawn event.
    pub pending_spawns: u32,
    pub last_spawn_at: f64,
    /// Next ambient asteroid spawn.
    pub next_asteroid_at: f64,
}

/// All mutable simulation state.
pub struct WorldState {
    pub world: World,
    pub player: Player,
    pub input: InputState,
    pub time: SimTime,
    pub phase: GamePhase,
    pub score: u64,
    pub wave: WaveState,
    pub schedule: EventSchedule,
    pub rng: ChaCha8Rng,
    pub cheats: Cheats,
    pub config: SimConfig,
    /// Factor applied to hostile motion this tick.
    pub time_dilation: f64,
    pub audio_events: Vec<AudioEvent>,
    pub despawn_buffer: Vec<Entity>,
}

impl WorldState {
    pub fn new(config: SimConfig) -> Self {
        let mut state = Self {
            world: World::new(),
            player: Player::default(),
            input: InputState::default(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            score: 0,
            wave: WaveState::default(),
            schedule: EventSchedule::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            cheats: Cheats {
                auto_spawn_disabled: !config.auto_spawn_enemies,
                cooldown_bypass: false,
            },
            config,
            time_dilation: 1.0,
            audio_events: Vec::new(),
            despawn_buffer: Vec::new(),
        };
        state.player.position = state.playfield_center();
        state.input.aim = state.playfield_center();
        state
    }

    /// Return every run-scoped field to its initial value.
    ///
    /// Pending scheduled events are dropped, so nothing from the previous run can
    /// fire into the new one. The RNG is reseeded from the configured seed.
    pub fn reset(&mut self) {
        self.schedule.clear();
        self.world.clear();
        self.player = Player {
            position: self.playfield_center(),
            ..Player::default()
        };
        self.input = InputState {
            aim: self.playfield_center(),
            ..InputState::default()
        };
        self.time = SimTime::default();
        self.score = 0;
        self.wave = WaveState::default();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.time_dilation = 1.0;
        self.audio_events.clear();
        self.despawn_buffer.clear();
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.time.elapsed_secs
    }

    /// Schedule `action` to apply `delay_secs` from now.
    pub fn schedule_in(&mut self, delay_secs: f64, action: ScheduledAction) {
        let due = self.time.tick_after(delay_secs);
        self.schedule.push(due, action);
    }

    pub fn playfield_size(&self) -> DVec2 {
        DVec2::new(self.config.playfield_width, self.config.playfield_height)
    }

    pub fn playfield_center(&self) -> DVec2 {
        self.playfield_size() / 2.0
    }

    /// Whether enemy waves are currently allowed to spawn.
    pub fn enemy_spawning_enabled(&self) -> bool {
        !self.cheats.auto_spawn_disabled
    }
}
