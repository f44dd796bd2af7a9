//! Session state shared between the embedding layer and the game loop thread.

use std::fmt;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use defender_core::commands::PlayerCommand;
use defender_core::config::{ConfigError, SimConfig};
use defender_core::state::GameStateSnapshot;

use crate::game_loop::{self, FrameSink};

/// Commands sent from the embedding layer to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    Player(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionError {
    /// No game loop has been started, or it was stopped.
    NotRunning,
    AlreadyRunning,
    /// The game loop thread is gone.
    Disconnected,
    /// The run configuration failed validation.
    InvalidConfig(ConfigError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotRunning => write!(f, "simulation not started"),
            SessionError::AlreadyRunning => write!(f, "simulation already running"),
            SessionError::Disconnected => write!(f, "game loop disconnected"),
            SessionError::InvalidConfig(err) => write!(f, "invalid run configuration: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

/// Parse a JSON run configuration, logging why it was rejected.
pub fn load_config(json: &str) -> Result<SimConfig, ConfigError> {
    SimConfig::from_json(json).inspect_err(|err| warn!(%err, "rejected run configuration"))
}

/// One long-lived simulation session.
///
/// `Session` is Send + Sync so the embedding layer can share it freely:
/// - the `mpsc::Sender` is wrapped in `Mutex` (Sender is Send but not Sync)
/// - the latest snapshot is `Arc<Mutex<...>>`, shared with the game loop thread
pub struct Session {
    /// Channel sender to forward commands to the game loop thread.
    /// `None` until `start` is called.
    command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Latest snapshot for synchronous polling. Updated by the game loop after each tick.
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the game loop thread. Fails if one is already running or the
    /// config does not validate.
    pub fn start<S: FrameSink>(&self, config: SimConfig, sink: S) -> Result<(), SessionError> {
        config.validate().map_err(|err| {
            warn!(%err, "rejected run configuration");
            SessionError::InvalidConfig(err)
        })?;

        let mut tx_lock = self
            .command_tx
            .lock()
            .map_err(|_| SessionError::Disconnected)?;
        if tx_lock.is_some() {
            return Err(SessionError::AlreadyRunning);
        }

        info!(seed = config.seed, "starting simulation session");
        let cmd_tx = game_loop::spawn_game_loop(config, sink, self.latest_snapshot.clone());
        *tx_lock = Some(cmd_tx);
        Ok(())
    }

    /// Forward a player command to the simulation.
    pub fn send(&self, command: PlayerCommand) -> Result<(), SessionError> {
        let tx_lock = self
            .command_tx
            .lock()
            .map_err(|_| SessionError::Disconnected)?;
        match tx_lock.as_ref() {
            Some(tx) => tx
                .send(GameLoopCommand::Player(command))
                .map_err(|_| SessionError::Disconnected),
            None => Err(SessionError::NotRunning),
        }
    }

    /// Stop the game loop. The last snapshot stays available.
    pub fn stop(&self) -> Result<(), SessionError> {
        let mut tx_lock = self
            .command_tx
            .lock()
            .map_err(|_| SessionError::Disconnected)?;
        let tx = tx_lock.take().ok_or(SessionError::NotRunning)?;
        info!("stopping simulation session");
        tx.send(GameLoopCommand::Shutdown)
            .map_err(|_| SessionError::Disconnected)
    }

    pub fn is_running(&self) -> bool {
        self.command_tx
            .lock()
            .map(|tx| tx.is_some())
            .unwrap_or(false)
    }

    /// Most recent snapshot, if the loop has ticked at least once.
    pub fn latest_snapshot(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Ok(mut tx_lock) = self.command_tx.lock() {
            if let Some(tx) = tx_lock.take() {
                let _ = tx.send(GameLoopCommand::Shutdown);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use defender_core::enums::GamePhase;

    struct NullSink;

    impl FrameSink for NullSink {
        fn on_snapshot(&mut self, _snapshot: &GameStateSnapshot) {}
    }

    #[test]
    fn test_session_creation() {
        let session = Session::new();
        assert!(!session.is_running());
        assert!(session.latest_snapshot().is_none());
        assert_eq!(
            session.send(PlayerCommand::StartRun),
            Err(SessionError::NotRunning)
        );
        assert_eq!(session.stop(), Err(SessionError::NotRunning));
    }

    #[test]
    fn test_session_lifecycle() {
        let session = Session::new();
        session.start(SimConfig::default(), NullSink).unwrap();
        assert!(session.is_running());
        assert_eq!(
            session.start(SimConfig::default(), NullSink),
            Err(SessionError::AlreadyRunning)
        );

        session.send(PlayerCommand::StartRun).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut active = false;
        while Instant::now() < deadline {
            if session
                .latest_snapshot()
                .is_some_and(|s| s.phase == GamePhase::Active)
            {
                active = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(active, "Session should reach the active phase");

        session.stop().unwrap();
        assert!(!session.is_running());
        assert_eq!(
            session.send(PlayerCommand::Pause),
            Err(SessionError::NotRunning)
        );
        assert!(session.latest_snapshot().is_some());
    }

    #[test]
    fn test_session_rejects_invalid_config() {
        let session = Session::new();
        let config = SimConfig {
            playfield_width: 0.0,
            ..Default::default()
        };
        let err = session.start(config, NullSink).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidConfig(ConfigError::InvalidPlayfield { .. })
        ));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!session.is_running());
        assert_eq!(
            session.send(PlayerCommand::StartRun),
            Err(SessionError::NotRunning)
        );
    }

    #[test]
    fn test_load_config_rejects_bad_playfield() {
        assert!(load_config(r#"{"seed": 7}"#).is_ok());
        assert!(matches!(
            load_config(r#"{"playfield_width": 10.0}"#),
            Err(ConfigError::InvalidPlayfield { .. })
        ));
        assert!(matches!(load_config("not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_session_error_messages() {
        assert_eq!(SessionError::NotRunning.to_string(), "simulation not started");
        assert_eq!(
            SessionError::AlreadyRunning.to_string(),
            "simulation already running"
        );
    }
}
