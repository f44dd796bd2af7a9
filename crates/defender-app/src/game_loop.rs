//! Game loop thread: runs the simulation engine at 60Hz and emits snapshots.
//!
//! The engine is created inside this thread because it's cleaner for ownership.
//! Commands arrive via `mpsc` channel. Snapshots go to the `FrameSink` and are
//! stored in shared state for synchronous polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use defender_core::config::SimConfig;
use defender_core::constants::TICK_RATE;
use defender_core::events::AudioEvent;
use defender_core::state::GameStateSnapshot;
use defender_sim::SimulationEngine;

use crate::state::GameLoopCommand;

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Receiver of per-tick output: the renderer and the audio collaborator.
pub trait FrameSink: Send + 'static {
    fn on_snapshot(&mut self, snapshot: &GameStateSnapshot);

    /// Called for each audio cue before the snapshot that carries it.
    fn on_audio(&mut self, _event: &AudioEvent) {}
}

/// Spawns the game loop in a new thread.
///
/// Returns the command sender for the embedding layer to use.
pub fn spawn_game_loop<S: FrameSink>(
    config: SimConfig,
    sink: S,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
) -> mpsc::Sender<GameLoopCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    std::thread::Builder::new()
        .name("defender-game-loop".into())
        .spawn(move || {
            run_game_loop(config, sink, cmd_rx, &latest_snapshot);
        })
        .expect("Failed to spawn game loop thread");

    cmd_tx
}

/// Tick duration after applying the configured pacing multiplier.
fn effective_tick_duration(time_scale: f64) -> Duration {
    if time_scale > 0.001 {
        TICK_DURATION.div_f64(time_scale)
    } else {
        TICK_DURATION
    }
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop<S: FrameSink>(
    config: SimConfig,
    mut sink: S,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    let mut engine = SimulationEngine::new(config);
    let tick_duration = effective_tick_duration(engine.config().time_scale);
    let mut next_tick_time = Instant::now();
    info!(?tick_duration, "game loop started");

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Player(cmd)) => {
                    engine.queue_command(cmd);
                }
                Ok(GameLoopCommand::Shutdown) => {
                    info!("game loop shutting down");
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    debug!("command channel closed");
                    return;
                }
            }
        }

        // 2. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick();

        // 3. Hand cues and the frame to the collaborators
        for event in &snapshot.audio_events {
            sink.on_audio(event);
        }
        sink.on_snapshot(&snapshot);

        // 4. Store latest snapshot for synchronous polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 5. Sleep until next tick
        next_tick_time += tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick_duration * 2 {
            // Too far behind, reset the pacing clock
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defender_core::commands::PlayerCommand;
    use defender_core::enums::GamePhase;

    /// Forwards every snapshot phase and audio cue over channels.
    struct ChannelSink {
        phases: mpsc::Sender<GamePhase>,
        audio: mpsc::Sender<AudioEvent>,
    }

    impl FrameSink for ChannelSink {
        fn on_snapshot(&mut self, snapshot: &GameStateSnapshot) {
            let _ = self.phases.send(snapshot.phase);
        }

        fn on_audio(&mut self, event: &AudioEvent) {
            let _ = self.audio.send(event.clone());
        }
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Player(PlayerCommand::StartRun))
            .unwrap();
        tx.send(GameLoopCommand::Player(PlayerCommand::Pause))
            .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            GameLoopCommand::Player(PlayerCommand::StartRun)
        ));
        assert!(matches!(
            commands[1],
            GameLoopCommand::Player(PlayerCommand::Pause)
        ));
        assert!(matches!(commands[2], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_loop_drives_sink_until_shutdown() {
        let (phase_tx, phase_rx) = mpsc::channel();
        let (audio_tx, _audio_rx) = mpsc::channel();
        let latest = Arc::new(Mutex::new(None));
        let cmd_tx = spawn_game_loop(
            SimConfig {
                time_scale: 4.0,
                ..Default::default()
            },
            ChannelSink {
                phases: phase_tx,
                audio: audio_tx,
            },
            latest.clone(),
        );

        cmd_tx
            .send(GameLoopCommand::Player(PlayerCommand::StartRun))
            .unwrap();

        let mut active = false;
        for _ in 0..240 {
            match phase_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(GamePhase::Active) => {
                    active = true;
                    break;
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        assert!(active, "Loop should reach the active phase");

        cmd_tx.send(GameLoopCommand::Shutdown).unwrap();
        // The sink is dropped with the thread, closing its channel.
        while phase_rx.recv_timeout(Duration::from_secs(2)).is_ok() {}
        assert!(latest.lock().unwrap().is_some());
    }

    #[test]
    fn test_snapshot_serialization_under_3ms() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        engine.queue_command(PlayerCommand::StartRun);

        // Run enough ticks for asteroids and the first wave to appear
        for _ in 0..600 {
            engine.tick();
        }

        let snapshot = engine.tick();
        let start = Instant::now();
        let json = serde_json::to_string(&snapshot).unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(3),
            "Snapshot serialization took {:?}, should be <3ms",
            elapsed
        );
        assert!(!json.is_empty());
    }

    #[test]
    fn test_pause_resume_via_commands() {
        let mut engine = SimulationEngine::new(SimConfig::default());

        engine.queue_command(PlayerCommand::StartRun);
        let snap = engine.tick();
        assert_eq!(snap.phase, GamePhase::Active);

        engine.queue_command(PlayerCommand::Pause);
        let snap = engine.tick();
        assert_eq!(snap.phase, GamePhase::Paused);
        let paused_tick = snap.time.tick;

        // Tick while paused; time should not advance
        let snap = engine.tick();
        assert_eq!(snap.time.tick, paused_tick);

        engine.queue_command(PlayerCommand::Resume);
        let snap = engine.tick();
        assert_eq!(snap.phase, GamePhase::Active);
        assert!(snap.time.tick > paused_tick);
    }

    #[test]
    fn test_tick_duration_constant() {
        // 60Hz = 16.667ms per tick
        let expected_nanos = 1_000_000_000u64 / 60;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
        let halved = effective_tick_duration(2.0).as_secs_f64();
        assert!((halved - TICK_DURATION.as_secs_f64() / 2.0).abs() < 1e-6);
        assert_eq!(effective_tick_duration(0.0), TICK_DURATION);
    }
}
