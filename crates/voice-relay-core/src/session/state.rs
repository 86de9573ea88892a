use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle phase of the push-to-talk session.
///
/// ```text
/// Idle ──down──▶ Recording ──up (long)──▶ Processing ──synth ok──▶ Playing
///   ▲                │                        │                      │
///   └──── up (short) ┘◀──── stage failed ─────┘◀──── played/timeout ─┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState {
    /// Waiting for the hotkey.
    #[default]
    Idle = 0,
    /// Hotkey held; microphone blocks are being kept.
    Recording = 1,
    /// Recording finished; transcription, translation and synthesis running.
    Processing = 2,
    /// Synthesized speech handed to the external player.
    Playing = 3,
}

impl SessionState {
    /// Whether `self → to` is an edge of the lifecycle.
    pub fn can_transition_to(self, to: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, to),
            (Idle, Recording)
                | (Recording, Processing)
                | (Recording, Idle)
                | (Processing, Playing)
                | (Processing, Idle)
                | (Playing, Idle)
        )
    }

    /// Short label for logs.
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Processing => "processing",
            SessionState::Playing => "playing",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => SessionState::Recording,
            2 => SessionState::Processing,
            3 => SessionState::Playing,
            _ => SessionState::Idle,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lock-free holder for the current [`SessionState`].
#[derive(Debug, Default)]
pub struct AtomicSessionState(AtomicU8);

impl AtomicSessionState {
    /// Start in `state`.
    pub fn new(state: SessionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    /// Current state.
    pub fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Replace `expected` with `new` atomically. Returns `false` if the
    /// current state was not `expected`.
    pub fn compare_and_set(&self, expected: SessionState, new: SessionState) -> bool {
        self.0
            .compare_exchange(
                expected as u8,
                new as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Availability of the speech model, gating new recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ModelStatus {
    /// Still loading in the background.
    Loading = 0,
    /// Loaded and usable.
    Ready = 1,
    /// Load failed; recordings are refused for the rest of the run.
    Failed = 2,
}

impl ModelStatus {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ModelStatus::Ready,
            2 => ModelStatus::Failed,
            _ => ModelStatus::Loading,
        }
    }
}
