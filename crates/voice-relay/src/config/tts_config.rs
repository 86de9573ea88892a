use voice_relay_core::pipeline::VoiceParams;

use serde::{Deserialize, Serialize};

/// Default voice per target language.
const DEFAULT_VOICES: &[(&str, &str)] = &[
    ("ru", "ru-RU-SvetlanaNeural"),
    ("zh", "zh-CN-YunxiNeural"),
    ("en", "en-US-ChristopherNeural"),
    ("ja", "ja-JP-KeitaNeural"),
    ("ko", "ko-KR-InJoonNeural"),
    ("es", "es-ES-AlvaroNeural"),
    ("fr", "fr-FR-HenriNeural"),
    ("de", "de-DE-ConradNeural"),
    ("it", "it-IT-DiegoNeural"),
    ("pt", "pt-BR-AntonioNeural"),
    ("ar", "ar-SA-HamedNeural"),
];

const FALLBACK_VOICE: &str = "en-US-ChristopherNeural";

/// Speech synthesis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// edge-tts executable.
    pub command: String,
    /// Voice name. Empty picks the default for the target language.
    pub voice: String,
    /// Relative rate, e.g. `-20%`.
    pub rate: String,
    /// Relative volume, e.g. `+30%`.
    pub volume: String,
    /// File the synthesized speech is written to (overwritten each time).
    pub output_file: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            command: "edge-tts".to_string(),
            voice: String::new(),
            rate: "-20%".to_string(),
            volume: "+30%".to_string(),
            output_file: "tts_temp.mp3".to_string(),
        }
    }
}

impl TtsConfig {
    /// Voice parameters for speaking `target_lang`.
    pub fn voice_params(&self, target_lang: &str) -> VoiceParams {
        let voice = if self.voice.trim().is_empty() {
            default_voice(target_lang).to_string()
        } else {
            self.voice.trim().to_string()
        };

        VoiceParams {
            voice,
            rate: self.rate.clone(),
            volume: self.volume.clone(),
        }
    }
}

/// Default voice for a language code, falling back to English.
pub fn default_voice(lang: &str) -> &'static str {
    DEFAULT_VOICES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(lang))
        .map(|(_, voice)| *voice)
        .unwrap_or(FALLBACK_VOICE)
}
