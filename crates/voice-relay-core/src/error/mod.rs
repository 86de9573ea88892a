use error_location::ErrorLocation;
use thiserror::Error;

/// Audio, transcription and collaborator errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper model file not found at specified path.
    #[error("Model not found at path: {path:?} {location}")]
    ModelNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The speech model has not finished loading.
    #[error("Speech model is not loaded yet {location}")]
    ModelNotReady {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transcription process failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from whisper-rs.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The translation collaborator failed.
    #[error("Translation failed: {reason} {location}")]
    TranslationFailed {
        /// Description of the translation failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The speech synthesis collaborator failed.
    #[error("Speech synthesis failed: {reason} {location}")]
    SynthesisFailed {
        /// Description of the synthesis failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A worker pool task panicked or was cancelled.
    #[error("Worker task failed: {reason} {location}")]
    TaskFailed {
        /// Description of the join failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
