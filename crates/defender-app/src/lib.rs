//! DEFENDER frame driver.
//!
//! Runs the headless simulation engine on its own thread at the fixed tick
//! rate and hands every snapshot and audio cue to an embedding-provided sink.

pub mod game_loop;
pub mod state;

pub use defender_core as core;
pub use game_loop::{spawn_game_loop, FrameSink};
pub use state::{load_config, GameLoopCommand, Session, SessionError};
