//! Voice-relay Core Library
//!
//! Push-to-talk session lifecycle, audio capture and trimming, Whisper
//! transcription, and resilient playback through the Soundpad sound-injection
//! player.
//!
//! # Example
//!
//! ```no_run
//! use voice_relay_core::{SessionSettings, SessionStateMachine, ModelStatus, ReleaseOutcome};
//!
//! use std::{thread::sleep, time::{Duration, Instant}};
//!
//! let session = SessionStateMachine::new(SessionSettings::default());
//! session.set_model_status(ModelStatus::Ready);
//!
//! session.on_hotkey_down(Instant::now());
//! sleep(Duration::from_millis(500));
//!
//! if let ReleaseOutcome::Captured { samples, .. } = session.on_hotkey_up(Instant::now()) {
//!     println!("Captured {} samples", samples.len());
//! }
//! ```

mod audio;
mod error;
pub mod pipeline;
pub mod player;
mod retry;
mod session;
mod shutdown;

pub use {
    audio::{
        AudioBlock, CaptureBuffer, FALLBACK_DURATION, MicrophoneCapture, Resampler, SttEngine,
        WHISPER_SAMPLE_RATE, downmix, estimate_duration, to_whisper_rate, trim,
    },
    error::{CoreError, Result as CoreResult},
    retry::RetryPolicy,
    session::{
        AtomicSessionState, ModelStatus, PressOutcome, ReleaseOutcome, SessionSettings,
        SessionState, SessionStateMachine,
    },
    shutdown::ShutdownFlag,
};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests;
