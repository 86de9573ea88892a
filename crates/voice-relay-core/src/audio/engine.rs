use crate::{CoreError, CoreResult, pipeline::Transcriber};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Whisper speech recognizer.
///
/// Creates a fresh decoding state per call, so one engine can be shared
/// behind an `Arc` and invoked from any worker thread.
pub struct SttEngine {
    ctx: WhisperContext,
}

impl SttEngine {
    /// Load a GGML Whisper model from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ModelNotFound`] if the file does not exist and
    /// [`CoreError::TranscriptionFailed`] if whisper cannot load it.
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> CoreResult<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let path_str = path.to_str().ok_or(CoreError::ModelNotFound {
            path: path.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(path_str, ctx_params).map_err(|e| {
            CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        info!(model_path = ?path, use_gpu, "Whisper model loaded");

        Ok(Self { ctx })
    }

    /// Run greedy decoding over 16 kHz mono samples.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn infer(&self, samples: &[f32], language: &str) -> CoreResult<String> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        params.set_language(Some(language));
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        state
            .full(params, samples)
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let num_segments = state.full_n_segments();
        let mut text = String::new();

        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| CoreError::TranscriptionFailed {
                    source: format!("Failed to get segment {}", i).into(),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            text.push_str(&segment.to_string());
            text.push(' ');
        }

        let text = text.trim().to_string();

        debug!(
            sample_count = samples.len(),
            segment_count = num_segments,
            text_len = text.len(),
            language,
            "Inference complete"
        );

        Ok(text)
    }
}

impl Transcriber for SttEngine {
    fn transcribe(&self, samples: &[f32], language_hint: &str) -> CoreResult<Option<String>> {
        if samples.is_empty() {
            return Ok(None);
        }

        let text = self.infer(samples, language_hint)?;
        Ok((!text.is_empty()).then_some(text))
    }
}
