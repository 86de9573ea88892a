//! Trailing-silence trimming and amplitude helpers.

use std::time::Duration;

/// Fraction of the recording's peak a sample must exceed to count as speech.
pub const TRIM_RELATIVE_THRESHOLD: f32 = 0.05;

/// Audio kept after the last energetic sample.
pub const TRIM_TAIL_MARGIN: Duration = Duration::from_millis(200);

/// Audio kept when nothing in the recording crosses the threshold.
pub const SILENT_LEADING_KEEP: Duration = Duration::from_millis(100);

/// Absolute peak below which a recording is treated as silence and never
/// handed to the transcriber.
pub const SILENCE_PEAK_THRESHOLD: f32 = 0.01;

/// Largest absolute sample value, or `0.0` for empty input.
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}

/// Number of samples to keep after trailing silence is removed.
///
/// Scans backward for the last sample above [`TRIM_RELATIVE_THRESHOLD`] of
/// the peak and keeps [`TRIM_TAIL_MARGIN`] after it. If no sample qualifies
/// only [`SILENT_LEADING_KEEP`] is kept. The result never exceeds the input
/// length, and applying it twice yields the same length.
pub fn trimmed_len(samples: &[f32], sample_rate: u32) -> usize {
    let threshold = peak_amplitude(samples) * TRIM_RELATIVE_THRESHOLD;

    let keep = match samples.iter().rposition(|s| s.abs() > threshold) {
        Some(last) => last + 1 + samples_for(TRIM_TAIL_MARGIN, sample_rate),
        None => samples_for(SILENT_LEADING_KEEP, sample_rate),
    };

    keep.min(samples.len())
}

/// Borrow `samples` without its trailing silence.
pub fn trim_trailing_silence(samples: &[f32], sample_rate: u32) -> &[f32] {
    &samples[..trimmed_len(samples, sample_rate)]
}

/// Sample count covering `duration` at `sample_rate`.
pub fn samples_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize
}

/// Playback length of `sample_count` mono samples at `sample_rate`.
pub fn duration_of(sample_count: usize, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(sample_count as f64 / f64::from(sample_rate))
}
