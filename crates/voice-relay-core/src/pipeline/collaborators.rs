//! Interfaces to the speech, translation and synthesis collaborators, plus
//! the decorators the pipeline composes them with.

use crate::{CoreError, CoreResult};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use error_location::ErrorLocation;
use tracing::{debug, warn};

/// Speech to text over 16 kHz mono samples.
pub trait Transcriber: Send + Sync {
    /// Transcribe `samples`. `Ok(None)` means nothing was recognized.
    fn transcribe(&self, samples: &[f32], language_hint: &str) -> CoreResult<Option<String>>;
}

/// Text translation between two language codes.
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target`.
    fn translate(&self, text: &str, source: &str, target: &str) -> CoreResult<String>;
}

/// Voice parameters handed to a [`Synthesizer`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoiceParams {
    /// Voice name, e.g. `en-US-GuyNeural`.
    pub voice: String,
    /// Relative speaking rate, e.g. `-20%`.
    pub rate: String,
    /// Relative volume, e.g. `+30%`.
    pub volume: String,
}

/// Text to speech.
pub trait Synthesizer: Send + Sync {
    /// Render `text` to an audio file and return its path.
    ///
    /// The path is fixed per synthesizer and overwritten by every call.
    /// `Ok(None)` means there was nothing to say.
    fn synthesize(&self, text: &str, voice: &VoiceParams) -> CoreResult<Option<PathBuf>>;
}

/// A transcriber slot that is filled once the speech model has loaded.
///
/// Lets the pipeline be built at startup while the model loads in the
/// background.
#[derive(Default)]
pub struct DeferredTranscriber {
    slot: OnceLock<Arc<dyn Transcriber>>,
}

impl DeferredTranscriber {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the slot. Returns `false` if it was already filled.
    pub fn install(&self, transcriber: Arc<dyn Transcriber>) -> bool {
        self.slot.set(transcriber).is_ok()
    }

    /// Whether a transcriber has been installed.
    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl Transcriber for DeferredTranscriber {
    fn transcribe(&self, samples: &[f32], language_hint: &str) -> CoreResult<Option<String>> {
        match self.slot.get() {
            Some(inner) => inner.transcribe(samples, language_hint),
            None => Err(CoreError::ModelNotReady {
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// Translates through an intermediate language: source → pivot → target.
///
/// Hops that would translate a language into itself are skipped.
pub struct PivotTranslator {
    inner: Box<dyn Translator>,
    pivot: String,
}

impl PivotTranslator {
    /// Wrap `inner`, routing every translation through `pivot`.
    pub fn new(inner: Box<dyn Translator>, pivot: impl Into<String>) -> Self {
        Self {
            inner,
            pivot: pivot.into(),
        }
    }
}

impl Translator for PivotTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> CoreResult<String> {
        let pivot = self.pivot.as_str();

        let intermediate = if source == pivot {
            text.to_string()
        } else {
            self.inner.translate(text, source, pivot)?
        };

        debug!(source, pivot, target, "Pivot hop complete");

        if pivot == target {
            Ok(intermediate)
        } else {
            self.inner.translate(&intermediate, pivot, target)
        }
    }
}

/// Returns the untranslated text when the inner translator fails.
pub struct FallbackTranslator {
    inner: Box<dyn Translator>,
}

impl FallbackTranslator {
    /// Wrap `inner` with fallback behaviour.
    pub fn new(inner: Box<dyn Translator>) -> Self {
        Self { inner }
    }
}

impl Translator for FallbackTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> CoreResult<String> {
        match self.inner.translate(text, source, target) {
            Ok(translated) => Ok(translated),
            Err(e) => {
                warn!(error = %e, source, target, "Translation failed, speaking source text");
                Ok(text.to_string())
            }
        }
    }
}
