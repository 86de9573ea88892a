use voice_relay_core::SessionSettings;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hotkey and recording timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Presses shorter than this are ignored.
    pub min_press_ms: u64,
    /// Presses this soon after a release are ignored.
    pub debounce_ms: u64,
    /// Longest recording kept.
    pub max_recording_secs: u64,
    /// Recordings shorter than this after trimming are dropped.
    pub min_recording_secs: f64,
    /// Largest block handed from the audio callback to the session.
    pub block_size: usize,
    /// Longest the pipeline waits for playback.
    pub playback_max_timeout_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_press_ms: 100,
            debounce_ms: 50,
            max_recording_secs: 60,
            min_recording_secs: 0.5,
            block_size: 1024,
            playback_max_timeout_secs: 30,
        }
    }
}

impl TimingConfig {
    /// Session settings for a microphone running at `sample_rate`.
    pub fn session_settings(&self, sample_rate: u32) -> SessionSettings {
        SessionSettings {
            min_press: Duration::from_millis(self.min_press_ms),
            debounce: Duration::from_millis(self.debounce_ms),
            max_recording: Duration::from_secs(self.max_recording_secs),
            sample_rate,
        }
    }

    /// Minimum recording length; negative or invalid values mean no minimum.
    pub fn min_recording(&self) -> Duration {
        Duration::try_from_secs_f64(self.min_recording_secs).unwrap_or_default()
    }
}
