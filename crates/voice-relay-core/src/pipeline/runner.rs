//! Drives one captured utterance through
//! resample → trim → transcribe → translate → synthesize → play.
//!
//! ```text
//! Processing
//!   ├─ too short / silent / nothing recognized ──▶ Idle
//!   ├─ any stage fails ─────────────────────────▶ Idle
//!   └─ audio synthesized ─▶ Playing
//!                             └─ played / failed / timed out ─▶ Idle
//! ```
//!
//! Every blocking stage runs on the tokio blocking pool. Errors never leave
//! [`Pipeline::process`]; they are logged and reported as a
//! [`PipelineOutcome`].

use crate::{
    CoreError, CoreResult,
    audio::{estimate_duration, to_whisper_rate, trim, WHISPER_SAMPLE_RATE},
    pipeline::{Synthesizer, Transcriber, Translator, VoiceParams},
    player::{PlaybackController, PlaybackRequest, PlaybackRouting},
    session::{SessionState, SessionStateMachine},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Languages, voice and limits for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Sample rate of the captured audio.
    pub capture_sample_rate: u32,
    /// Recordings shorter than this after trimming are dropped.
    pub min_recording: Duration,
    /// Spoken language.
    pub source_lang: String,
    /// Language to speak back.
    pub target_lang: String,
    /// Synthesis voice.
    pub voice: VoiceParams,
    /// Output routing for playback.
    pub routing: PlaybackRouting,
    /// Longest the pipeline waits on a submitted playback.
    pub playback_max_timeout: Duration,
    /// Delete the synthesized file once playback is over.
    pub cleanup_after_play: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            capture_sample_rate: WHISPER_SAMPLE_RATE,
            min_recording: Duration::from_millis(500),
            source_lang: "en".to_string(),
            target_lang: "en".to_string(),
            voice: VoiceParams::default(),
            routing: PlaybackRouting::default(),
            playback_max_timeout: Duration::from_secs(30),
            cleanup_after_play: true,
        }
    }
}

/// How one utterance ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The translated speech was played.
    Played,
    /// Trimmed audio was shorter than the minimum recording length.
    TooShort {
        /// Length after trimming.
        duration: Duration,
    },
    /// The recording never rose above the silence threshold.
    Silent,
    /// Speech recognition produced no text.
    NothingRecognized,
    /// Translation or synthesis produced nothing to play.
    NothingToSay,
    /// Playback ran out of retries.
    PlaybackFailed,
    /// Playback did not report back in time and was abandoned.
    PlaybackTimedOut,
    /// A stage failed.
    Failed(String),
    /// Processing was requested while the session was not processing.
    InvariantViolated(SessionState),
}

enum Prepared {
    Ready(PathBuf),
    Rejected(PipelineOutcome),
}

/// The post-recording pipeline.
pub struct Pipeline {
    session: Arc<SessionStateMachine>,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    playback: PlaybackController,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        session: Arc<SessionStateMachine>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        playback: PlaybackController,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            session,
            transcriber,
            translator,
            synthesizer,
            playback,
            settings,
        }
    }

    /// Pipeline settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process samples captured by a `Recording → Processing` transition.
    ///
    /// Always leaves the session idle.
    #[instrument(skip(self, samples), fields(utterance = %utterance_id, sample_count = samples.len()))]
    pub async fn process(&self, samples: Vec<f32>, utterance_id: Uuid) -> PipelineOutcome {
        let state = self.session.state();
        if state != SessionState::Processing {
            warn!(state = %state, "Pipeline invoked outside Processing");
            self.session.recover_to_idle();
            return PipelineOutcome::InvariantViolated(state);
        }

        let path = match self.prepare(samples).await {
            Ok(Prepared::Ready(path)) => path,
            Ok(Prepared::Rejected(outcome)) => {
                self.session.abort_processing();
                return outcome;
            }
            Err(e) => {
                error!(error = %e, "Pipeline stage failed");
                self.session.abort_processing();
                return PipelineOutcome::Failed(e.to_string());
            }
        };

        self.play(path).await
    }

    async fn prepare(&self, samples: Vec<f32>) -> CoreResult<Prepared> {
        let capture_rate = self.settings.capture_sample_rate;

        let trimmed = run_blocking(move || {
            let mut resampled = to_whisper_rate(samples, capture_rate)?;
            let keep = trim::trimmed_len(&resampled, WHISPER_SAMPLE_RATE);
            resampled.truncate(keep);
            Ok(resampled)
        })
        .await?;

        let duration = trim::duration_of(trimmed.len(), WHISPER_SAMPLE_RATE);
        let min_samples = trim::samples_for(self.settings.min_recording, WHISPER_SAMPLE_RATE);

        if trimmed.len() < min_samples {
            info!(duration_ms = duration.as_millis(), "Recording too short, dropped");
            return Ok(Prepared::Rejected(PipelineOutcome::TooShort { duration }));
        }

        if trim::peak_amplitude(&trimmed) < trim::SILENCE_PEAK_THRESHOLD {
            info!("Recording is silent, dropped");
            return Ok(Prepared::Rejected(PipelineOutcome::Silent));
        }

        debug!(duration_ms = duration.as_millis(), "Recording trimmed");

        let transcriber = Arc::clone(&self.transcriber);
        let source = self.settings.source_lang.clone();
        let text = run_blocking(move || transcriber.transcribe(&trimmed, &source)).await?;

        let Some(text) = text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
            info!("Nothing recognized");
            return Ok(Prepared::Rejected(PipelineOutcome::NothingRecognized));
        };

        info!(text = %text, "Transcribed");

        let translated = if self.settings.source_lang == self.settings.target_lang {
            text
        } else {
            let translator = Arc::clone(&self.translator);
            let source = self.settings.source_lang.clone();
            let target = self.settings.target_lang.clone();
            run_blocking(move || translator.translate(&text, &source, &target)).await?
        };

        if translated.trim().is_empty() {
            info!("Translation is empty, nothing to say");
            return Ok(Prepared::Rejected(PipelineOutcome::NothingToSay));
        }

        info!(text = %translated, "Translated");

        let synthesizer = Arc::clone(&self.synthesizer);
        let voice = self.settings.voice.clone();
        let path = run_blocking(move || synthesizer.synthesize(&translated, &voice)).await?;

        match path {
            Some(path) => Ok(Prepared::Ready(path)),
            None => {
                info!("Synthesizer produced no audio");
                Ok(Prepared::Rejected(PipelineOutcome::NothingToSay))
            }
        }
    }

    async fn play(&self, path: PathBuf) -> PipelineOutcome {
        let estimated_duration = {
            let path = path.clone();
            run_blocking(move || Ok(estimate_duration(&path)))
                .await
                .unwrap_or(crate::audio::FALLBACK_DURATION)
        };

        if !self.session.begin_playback() {
            let state = self.session.state();
            warn!(state = %state, "Session left Processing before playback");
            self.session.recover_to_idle();
            self.remove_synthesized(&path);
            return PipelineOutcome::InvariantViolated(state);
        }

        let request = PlaybackRequest {
            path: path.clone(),
            estimated_duration,
            routing: self.settings.routing,
        };

        let handle = self.playback.submit(request);

        let outcome = match tokio::time::timeout(self.settings.playback_max_timeout, handle).await {
            Ok(Ok(true)) => PipelineOutcome::Played,
            Ok(Ok(false)) => PipelineOutcome::PlaybackFailed,
            Ok(Err(e)) => {
                error!(error = %e, "Playback task failed");
                PipelineOutcome::Failed(e.to_string())
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.settings.playback_max_timeout.as_secs(),
                    "Playback did not finish in time, abandoning"
                );
                PipelineOutcome::PlaybackTimedOut
            }
        };

        self.remove_synthesized(&path);
        self.session.finish_playback();

        info!(outcome = ?outcome, "Utterance finished");
        outcome
    }

    fn remove_synthesized(&self, path: &Path) {
        if !self.settings.cleanup_after_play {
            return;
        }

        if let Err(e) = std::fs::remove_file(path) {
            debug!(path = ?path, error = %e, "Could not remove synthesized audio");
        }
    }
}

/// Run `f` on the blocking pool, folding join failures into [`CoreError`].
async fn run_blocking<T, F>(f: F) -> CoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> CoreResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => Err(CoreError::TaskFailed {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
