//! Events emitted by the simulation for audio feedback.

use serde::{Deserialize, Serialize};

/// Fire-and-forget audio cues. The simulation never reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    /// A wave has been announced.
    WaveIncoming { wave: u32 },
    /// The announced wave begins spawning.
    WaveStart { wave: u32, ships: u32 },
    /// The wave has been cleared or timed out.
    WaveEnd { wave: u32 },
}
