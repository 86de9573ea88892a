mod app_config;
#[allow(clippy::module_inception)]
mod config;
mod player_config;
mod timing_config;
mod translation_config;
mod tts_config;

pub(crate) use {
    app_config::AppConfig, config::Config, player_config::PlayerConfig,
    timing_config::TimingConfig, translation_config::TranslationConfig, tts_config::TtsConfig,
};
