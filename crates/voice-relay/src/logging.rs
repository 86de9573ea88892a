//! Tracing subscriber setup: stdout plus a non-blocking file writer.

use crate::{AppError, AppResult};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_NAME: &str = "app.log";

/// Build the filter: `RUST_LOG` when set, otherwise `default_level` for this
/// crate and the core library.
pub(crate) fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,voice_relay={level},voice_relay_core={level}",
            level = default_level.to_ascii_lowercase()
        ))
    })
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
#[track_caller]
pub(crate) fn init(default_level: &str, log_dir: &Path) -> AppResult<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| AppError::Logging {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}
