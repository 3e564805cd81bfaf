pub mod engine;
pub mod timeline;
pub mod timers;

pub use engine::PlaybackController;
pub use timeline::{derive_active_cue, progress_at, Timeline};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
    /// Ran to the end; only start or replay leave this state
    Finished,
}

/// Playback tuning, persisted with the app settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Pause between a replay reset and playback restarting
    pub settle_delay_ms: u64,
    /// How far narration of each line is pulled ahead of its slot
    pub narration_lead_ms: u64,
    pub rate_base: f32,
    pub rate_step: f32,
    pub pitch_base: f32,
    pub pitch_step: f32,
    pub volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 120,
            narration_lead_ms: 150,
            rate_base: 0.96,
            rate_step: 0.06,
            pitch_base: 1.2,
            pitch_step: 0.1,
            volume: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn narration_lead(&self) -> Duration {
        Duration::from_millis(self.narration_lead_ms)
    }

    /// Speech rate for the `line`-th line of a cue
    pub fn rate_for(&self, line: usize) -> f32 {
        self.rate_base + line as f32 * self.rate_step
    }

    /// Speech pitch for the `line`-th line of a cue
    pub fn pitch_for(&self, line: usize) -> f32 {
        self.pitch_base + line as f32 * self.pitch_step
    }
}
