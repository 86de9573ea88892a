use voice_relay_core::CoreError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors that stop the voice-relay binary from starting or running.
///
/// Failures inside an utterance never get here; the pipeline turns those
/// into outcomes. What remains is startup and wiring.
#[derive(Error, Debug)]
pub enum AppError {
    /// Capture, model or player setup failed in voice-relay-core.
    #[error("Core error: {source} {location}")]
    Core {
        #[source]
        source: CoreError,
        location: ErrorLocation,
    },

    /// The push-to-talk key could not be parsed or registered.
    #[error("Hotkey error: {reason} {location}")]
    Hotkey {
        reason: String,
        location: ErrorLocation,
    },

    /// A config file could not be read, parsed or written.
    #[error("Config error: {reason} {location}")]
    Config {
        reason: String,
        location: ErrorLocation,
    },

    /// The global tracing subscriber could not be installed.
    #[error("Logging setup failed: {reason} {location}")]
    Logging {
        reason: String,
        location: ErrorLocation,
    },

    /// Log directory, runtime or thread creation failed.
    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl AppError {
    #[track_caller]
    pub(crate) fn hotkey(reason: impl Into<String>) -> Self {
        AppError::Hotkey {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        AppError::Config {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for AppError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        AppError::Core {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, AppError>;
