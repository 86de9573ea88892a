use voice_relay_core::{
    RetryPolicy,
    player::{PlaybackRouting, PlaybackSettings, SupervisorSettings, soundpad},
};

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Soundpad location and playback behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Soundpad executable, launched when not running.
    pub executable: PathBuf,
    /// Launch Soundpad when it is not running.
    pub auto_start: bool,
    /// Remote-control pipe (or socket path off Windows).
    pub pipe_name: String,
    /// Process name looked up in the process table.
    pub process_name: String,
    /// Play through the local speakers.
    pub play_in_speakers: bool,
    /// Inject into the virtual microphone.
    pub play_in_microphone: bool,
    /// Stop current playback before starting a new clip.
    pub force_stop_before_play: bool,
    /// Pause before each playback attempt.
    pub playback_delay_ms: u64,
    /// Upper bound on waiting for one clip to finish.
    pub playback_timeout_secs: u64,
    /// Attempts of the whole playback sequence.
    pub max_retry_attempts: u32,
    /// Delete the synthesized file after playback.
    pub cleanup_after_play: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("SoundPad/Soundpad.exe"),
            auto_start: true,
            pipe_name: soundpad::DEFAULT_ENDPOINT.to_string(),
            process_name: "soundpad".to_string(),
            play_in_speakers: true,
            play_in_microphone: true,
            force_stop_before_play: true,
            playback_delay_ms: 200,
            playback_timeout_secs: 10,
            max_retry_attempts: 3,
            cleanup_after_play: true,
        }
    }
}

impl PlayerConfig {
    /// Output routing for play commands.
    pub fn routing(&self) -> PlaybackRouting {
        PlaybackRouting {
            speakers: self.play_in_speakers,
            microphone: self.play_in_microphone,
        }
    }

    /// Settings for the launch-and-verify protocol.
    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            executable: self.executable.clone(),
            process_name: self.process_name.clone(),
            auto_start: self.auto_start,
            fast_probe: RetryPolicy::new(1, Duration::from_millis(500)),
            warmup_probe: RetryPolicy::new(5, Duration::from_secs(1)),
            launch_probe: RetryPolicy::new(10, Duration::from_secs(1)),
        }
    }

    /// Settings for the playback controller.
    pub fn playback_settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            force_stop_before_play: self.force_stop_before_play,
            pre_play_delay: Duration::from_millis(self.playback_delay_ms),
            playback_timeout: Duration::from_secs(self.playback_timeout_secs),
            max_attempts: self.max_retry_attempts,
            ..PlaybackSettings::default()
        }
    }
}
