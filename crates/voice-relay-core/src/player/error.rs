use error_location::ErrorLocation;
use std::{panic::Location, path::PathBuf};
use thiserror::Error;

/// Errors raised while talking to, launching, or playing through the
/// external player.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// The control channel could not be opened.
    #[error("Player connection failed: {reason} {location}")]
    ConnectFailed {
        /// Why the connection failed.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading from or writing to an open channel failed.
    #[error("Player I/O error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The player answered with an error code or an unparseable reply.
    #[error("Player rejected {command}: {response} {location}")]
    Rejected {
        /// Command that was sent.
        command: String,
        /// Raw response text.
        response: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The entry count did not grow after an upload.
    #[error("Upload not registered (entries {before} -> {after}) {location}")]
    UploadNotRegistered {
        /// Entry count before the upload.
        before: u32,
        /// Entry count after the upload.
        after: u32,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The audio file to play does not exist.
    #[error("Audio file not found: {path:?} {location}")]
    FileNotFound {
        /// Absolute path that was checked.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The supervisor could not bring the player up.
    #[error("Player unavailable {location}")]
    Unavailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Spawning the player executable failed.
    #[error("Failed to launch player {path:?}: {source} {location}")]
    LaunchFailed {
        /// Executable that was launched.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Shutdown has begun; no new player interaction is allowed.
    #[error("Shutdown in progress {location}")]
    ShuttingDown {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl PlayerError {
    /// Whether repeating the whole playback sequence could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            PlayerError::FileNotFound { .. } | PlayerError::ShuttingDown { .. }
        )
    }
}

impl From<std::io::Error> for PlayerError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        PlayerError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`PlayerError`].
pub type PlayerResult<T> = std::result::Result<T, PlayerError>;
