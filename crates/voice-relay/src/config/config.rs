//! Configuration management for voice-relay.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, default merging, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{AppConfig, PlayerConfig, TimingConfig, TranslationConfig, TtsConfig},
};

use voice_relay_core::pipeline::PipelineSettings;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
///
/// Every section and field falls back to its default, so a user file only
/// needs the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hotkey and logging.
    pub app: AppConfig,
    /// Languages and speech model.
    pub translation: TranslationConfig,
    /// Speech synthesis.
    pub tts: TtsConfig,
    /// Soundpad control.
    pub player: PlayerConfig,
    /// Hotkey and recording timing.
    pub timing: TimingConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(&config_path)?;
            warn!(
                model_path = ?config.model_path(),
                "Default config created. Whisper model must be downloaded before recording."
            );
            Ok(config)
        }
    }

    /// Read and parse a configuration file.
    #[track_caller]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| AppError::config(format!("Failed to parse config: {}", e)))?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AppError::config(format!("Failed to serialize config: {}", e)))?;

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path)
            .map_err(|e| AppError::config(format!("Failed to create temp config file: {}", e)))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::config(format!("Failed to write temp config file: {}", e)))?;

        temp_file
            .sync_all()
            .map_err(|e| AppError::config(format!("Failed to sync temp config file: {}", e)))?;

        fs::rename(&temp_path, path).map_err(|e| {
            AppError::config(format!("Failed to rename temp config to final: {}", e))
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Whisper model file, resolved against the data directory.
    pub fn model_path(&self) -> PathBuf {
        let models_dir = Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("models"))
            .unwrap_or_else(|| PathBuf::from("models"));

        self.translation.model_path(&models_dir)
    }

    /// Where synthesized speech is written. Relative names live in the
    /// system temp directory.
    pub fn tts_output_path(&self) -> PathBuf {
        let configured = Path::new(&self.tts.output_file);
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            std::env::temp_dir().join(configured)
        }
    }

    /// Pipeline settings for a microphone running at `capture_sample_rate`.
    pub fn pipeline_settings(&self, capture_sample_rate: u32) -> PipelineSettings {
        PipelineSettings {
            capture_sample_rate,
            min_recording: self.timing.min_recording(),
            source_lang: self.translation.source_lang.clone(),
            target_lang: self.translation.target_lang.clone(),
            voice: self.tts.voice_params(&self.translation.target_lang),
            routing: self.player.routing(),
            playback_max_timeout: Duration::from_secs(self.timing.playback_max_timeout_secs),
            cleanup_after_play: self.player.cleanup_after_play,
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "voice-relay", "Voice-Relay")
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()
            .ok_or_else(|| AppError::config("Failed to get config directory"))?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
