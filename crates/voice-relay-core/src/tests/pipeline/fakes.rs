//! Recording stand-ins for the speech, translation and synthesis collaborators.

use crate::{
    CoreError, CoreResult,
    pipeline::{Synthesizer, Transcriber, Translator, VoiceParams},
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::Mutex,
};

use error_location::ErrorLocation;

/// Returns a fixed transcript and remembers how many samples it saw.
pub struct FakeTranscriber {
    pub text: Option<String>,
    pub calls: Mutex<Vec<(usize, String)>>,
}

impl FakeTranscriber {
    pub fn saying(text: Option<&str>) -> Self {
        Self {
            text: text.map(str::to_string),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(usize, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transcriber for FakeTranscriber {
    fn transcribe(&self, samples: &[f32], language_hint: &str) -> CoreResult<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .push((samples.len(), language_hint.to_string()));
        Ok(self.text.clone())
    }
}

/// Renders every hop as `text|source>target`, or fails when asked to.
#[derive(Default)]
pub struct FakeTranslator {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeTranslator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Translator for FakeTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> CoreResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), source.to_string(), target.to_string()));

        if self.fail {
            return Err(CoreError::TranslationFailed {
                reason: "service unreachable".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(format!("{text}|{source}>{target}"))
    }
}

impl Translator for std::sync::Arc<FakeTranslator> {
    fn translate(&self, text: &str, source: &str, target: &str) -> CoreResult<String> {
        self.as_ref().translate(text, source, target)
    }
}

/// Writes a small MP3-named file to a fixed path.
pub struct FakeSynthesizer {
    pub output: PathBuf,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSynthesizer {
    pub fn writing_to(output: PathBuf) -> Self {
        Self {
            output,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Synthesizer for FakeSynthesizer {
    fn synthesize(&self, text: &str, _voice: &VoiceParams) -> CoreResult<Option<PathBuf>> {
        self.calls.lock().unwrap().push(text.to_string());
        std::fs::write(&self.output, [0u8; 64]).map_err(|e| CoreError::SynthesisFailed {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
        Ok(Some(self.output.clone()))
    }
}
