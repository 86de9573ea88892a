use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Languages and speech model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Spoken language (ISO 639-1).
    pub source_lang: String,
    /// Language spoken back (ISO 639-1).
    pub target_lang: String,
    /// Intermediate language for two-hop translation. Empty disables it.
    pub pivot_lang: String,
    /// Whisper model size (`small`) or path to a GGML file.
    pub whisper_model: String,
    /// Use GPU for inference if a GPU backend was compiled in (Metal/Vulkan).
    pub use_gpu: bool,
    /// Speak the recognized text untranslated when translation fails.
    pub speak_source_on_failure: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: "ru".to_string(),
            target_lang: "zh".to_string(),
            pivot_lang: String::new(),
            whisper_model: "small".to_string(),
            use_gpu: true,
            speak_source_on_failure: false,
        }
    }
}

impl TranslationConfig {
    /// Resolve `whisper_model` to a file.
    ///
    /// A bare size such as `small` maps to `<models_dir>/ggml-small.bin`;
    /// anything that looks like a path is used as given.
    pub fn model_path(&self, models_dir: &Path) -> PathBuf {
        let model = self.whisper_model.trim();
        let as_path = Path::new(model);

        if as_path.extension().is_some() || as_path.components().count() > 1 {
            as_path.to_path_buf()
        } else {
            models_dir.join(format!("ggml-{}.bin", model))
        }
    }

    /// Pivot language, if configured and distinct from both ends.
    pub fn pivot(&self) -> Option<&str> {
        let pivot = self.pivot_lang.trim();
        (!pivot.is_empty() && pivot != self.source_lang && pivot != self.target_lang)
            .then_some(pivot)
    }
}
