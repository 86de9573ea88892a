//! Push-to-talk session lifecycle.
//!
//! [`SessionStateMachine`] is the single owner of the session state and the
//! capture buffer. Hotkey edges arrive from the coordinator task, audio blocks
//! from the microphone callback, and completion events from the pipeline task.
//! Every state change goes through [`SessionStateMachine::change_state`], a
//! compare-and-set, and callers branch on its result instead of re-reading the
//! state afterwards.

use crate::{
    audio::{AudioBlock, CaptureBuffer},
    session::{AtomicSessionState, ModelStatus, SessionState},
};

use std::{
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicU8, Ordering},
    },
    time::{Duration, Instant},
};

use tracing::{debug, error, info, instrument, warn};

/// Timing and sizing knobs for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Presses shorter than this are treated as accidental.
    pub min_press: Duration,
    /// A press this soon after the previous release is ignored.
    pub debounce: Duration,
    /// Longest recording kept in memory; later audio is dropped.
    pub max_recording: Duration,
    /// Sample rate of the blocks handed to [`SessionStateMachine::on_audio_block`].
    pub sample_rate: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            min_press: Duration::from_millis(100),
            debounce: Duration::from_millis(50),
            max_recording: Duration::from_secs(60),
            sample_rate: 16_000,
        }
    }
}

/// Result of a hotkey-down edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Idle → Recording happened.
    Started,
    /// The speech model is still loading.
    ModelLoading,
    /// The speech model failed to load.
    ModelFailed,
    /// The press fell inside the debounce window after the last release.
    Debounced,
    /// The session was not idle.
    Busy(SessionState),
}

/// Result of a hotkey-up edge.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// No recording was in progress.
    NotRecording(SessionState),
    /// The press was too short; the buffer was discarded and the session is
    /// idle again.
    Discarded {
        /// How long the key was held.
        held: Duration,
    },
    /// Recording → Processing happened; the caller now owns the audio and
    /// must drive the pipeline to completion.
    Captured {
        /// How long the key was held.
        held: Duration,
        /// Flattened mono samples at [`SessionSettings::sample_rate`].
        samples: Vec<f32>,
    },
}

#[derive(Debug, Default)]
struct HotkeyTiming {
    pressed_at: Option<Instant>,
    last_release_at: Option<Instant>,
}

/// The session singleton: state, hotkey timing, and capture buffer.
pub struct SessionStateMachine {
    state: AtomicSessionState,
    model: AtomicU8,
    timing: Mutex<HotkeyTiming>,
    capture: CaptureBuffer,
    settings: SessionSettings,
}

impl SessionStateMachine {
    /// Create an idle session with the model marked as loading.
    pub fn new(settings: SessionSettings) -> Self {
        let capture = CaptureBuffer::for_duration(settings.max_recording, settings.sample_rate);

        debug!(
            max_samples = capture.max_samples(),
            sample_rate = settings.sample_rate,
            "Session created"
        );

        Self {
            state: AtomicSessionState::new(SessionState::Idle),
            model: AtomicU8::new(ModelStatus::Loading as u8),
            timing: Mutex::new(HotkeyTiming::default()),
            capture,
            settings,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state.load()
    }

    /// Session settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// The capture buffer owned by this session.
    pub fn capture(&self) -> &CaptureBuffer {
        &self.capture
    }

    /// Speech model availability.
    pub fn model_status(&self) -> ModelStatus {
        ModelStatus::from_u8(self.model.load(Ordering::Acquire))
    }

    /// Record the outcome of the background model load.
    pub fn set_model_status(&self, status: ModelStatus) {
        self.model.store(status as u8, Ordering::Release);
        info!(status = ?status, "Speech model status changed");
    }

    /// Atomically move from `expected` to `new`.
    ///
    /// Returns `false`, leaving the state untouched, if the session is not in
    /// `expected` or the edge is not part of the lifecycle.
    pub fn change_state(&self, expected: SessionState, new: SessionState) -> bool {
        if !expected.can_transition_to(new) {
            warn!(from = %expected, to = %new, "Rejected transition outside the lifecycle");
            return false;
        }

        let changed = self.state.compare_and_set(expected, new);
        if changed {
            debug!(from = %expected, to = %new, "Session state changed");
        }
        changed
    }

    /// Handle a hotkey-down edge received at `now`.
    #[instrument(skip(self))]
    pub fn on_hotkey_down(&self, now: Instant) -> PressOutcome {
        match self.model_status() {
            ModelStatus::Loading => {
                info!("Speech model still loading, ignoring hotkey");
                return PressOutcome::ModelLoading;
            }
            ModelStatus::Failed => {
                warn!("Speech model failed to load, ignoring hotkey");
                return PressOutcome::ModelFailed;
            }
            ModelStatus::Ready => {}
        }

        let debounced = self
            .timing()
            .last_release_at
            .is_some_and(|released| now.saturating_duration_since(released) < self.settings.debounce);

        if debounced {
            debug!("Hotkey press inside debounce window, ignoring");
            return PressOutcome::Debounced;
        }

        if !self.change_state(SessionState::Idle, SessionState::Recording) {
            let current = self.state();
            debug!(state = %current, "Hotkey press while busy, ignoring");
            return PressOutcome::Busy(current);
        }

        self.timing().pressed_at = Some(now);
        debug!("Recording started");

        PressOutcome::Started
    }

    /// Handle a hotkey-up edge received at `now`.
    #[instrument(skip(self))]
    pub fn on_hotkey_up(&self, now: Instant) -> ReleaseOutcome {
        let pressed_at = {
            let mut timing = self.timing();
            timing.last_release_at = Some(now);
            timing.pressed_at.take()
        };

        let held = pressed_at
            .map(|pressed| now.saturating_duration_since(pressed))
            .unwrap_or_default();

        if held < self.settings.min_press {
            if self.change_state(SessionState::Recording, SessionState::Idle) {
                self.capture.clear();
                debug!(held_ms = held.as_millis(), "Press too short, recording discarded");
                return ReleaseOutcome::Discarded { held };
            }
            return ReleaseOutcome::NotRecording(self.state());
        }

        if !self.change_state(SessionState::Recording, SessionState::Processing) {
            return ReleaseOutcome::NotRecording(self.state());
        }

        let samples = self.capture.drain_and_flatten();
        debug!(
            held_ms = held.as_millis(),
            sample_count = samples.len(),
            "Recording finished"
        );

        ReleaseOutcome::Captured { held, samples }
    }

    /// Offer a microphone block. Kept only while the session is recording.
    ///
    /// Returns `true` if the block was stored.
    pub fn on_audio_block(&self, block: AudioBlock) -> bool {
        self.capture
            .append_if(block, || self.state() == SessionState::Recording)
    }

    /// Processing → Playing once synthesis has produced audio.
    pub fn begin_playback(&self) -> bool {
        self.change_state(SessionState::Processing, SessionState::Playing)
    }

    /// Processing → Idle after a stage rejected or failed the request.
    pub fn abort_processing(&self) -> bool {
        self.change_state(SessionState::Processing, SessionState::Idle)
    }

    /// Playing → Idle once playback finished or was abandoned.
    pub fn finish_playback(&self) -> bool {
        self.change_state(SessionState::Playing, SessionState::Idle)
    }

    /// Force the session back to idle from whatever state it is in.
    ///
    /// Used when an invariant was violated. Returns the state it left.
    pub fn recover_to_idle(&self) -> SessionState {
        loop {
            let current = self.state();
            if current == SessionState::Idle {
                return current;
            }

            if self.change_state(current, SessionState::Idle) {
                if current == SessionState::Recording {
                    self.capture.clear();
                }
                warn!(from = %current, "Session forced back to idle");
                return current;
            }
        }
    }

    fn timing(&self) -> MutexGuard<'_, HotkeyTiming> {
        self.timing.lock().unwrap_or_else(|e| {
            error!("Hotkey timing lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
