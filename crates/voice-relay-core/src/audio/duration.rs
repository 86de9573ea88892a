use std::{path::Path, time::Duration};

use tracing::debug;

/// Duration assumed when a file cannot be inspected.
pub const FALLBACK_DURATION: Duration = Duration::from_secs(1);

/// Bit rate of the MP3 stream produced by edge-tts
/// (`audio-24khz-48kbitrate-mono-mp3`).
pub const SYNTHESIZED_MP3_BITRATE: u64 = 48_000;

/// Best-effort playback length of an audio file.
///
/// WAV files are measured from their header. MP3 files are estimated from
/// their size at [`SYNTHESIZED_MP3_BITRATE`]. Anything unreadable yields
/// [`FALLBACK_DURATION`].
pub fn estimate_duration(path: &Path) -> Duration {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let estimate = match extension.as_deref() {
        Some("wav") => wav_duration(path),
        Some("mp3") => mp3_duration(path),
        _ => None,
    };

    estimate.unwrap_or_else(|| {
        debug!(path = ?path, "Duration check failed, using fallback");
        FALLBACK_DURATION
    })
}

fn wav_duration(path: &Path) -> Option<Duration> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| debug!(path = ?path, error = %e, "Failed to read WAV header"))
        .ok()?;

    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }

    Some(Duration::from_secs_f64(
        f64::from(reader.duration()) / f64::from(spec.sample_rate),
    ))
}

fn mp3_duration(path: &Path) -> Option<Duration> {
    let bytes = std::fs::metadata(path).ok()?.len();
    if bytes == 0 {
        return None;
    }

    Some(Duration::from_secs_f64(
        (bytes * 8) as f64 / SYNTHESIZED_MP3_BITRATE as f64,
    ))
}
