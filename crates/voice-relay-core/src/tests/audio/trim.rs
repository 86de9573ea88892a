use crate::audio::trim::{
    duration_of, peak_amplitude, samples_for, trim_trailing_silence, trimmed_len,
};

use std::time::Duration;

const RATE: u32 = 16_000;
const LOUD: f32 = 0.8;
const QUIET: f32 = 0.001;

fn speech_then_silence(speech: Duration, silence: Duration) -> Vec<f32> {
    let mut samples = vec![LOUD; samples_for(speech, RATE)];
    samples.extend(vec![QUIET; samples_for(silence, RATE)]);
    samples
}

/// WHAT: 0.3 s of speech followed by 0.9 s of silence trims to 0.5 s
/// WHY: Trailing silence is removed but a 0.2 s tail is kept after speech
#[test]
fn given_speech_with_long_trailing_silence_when_trimming_then_tail_margin_kept() {
    // Given: 1.2 s recording, last 0.9 s silent
    let samples = speech_then_silence(Duration::from_millis(300), Duration::from_millis(900));

    // When: Trimming
    let trimmed = trim_trailing_silence(&samples, RATE);

    // Then: 0.3 s of speech plus 0.2 s margin
    assert_eq!(trimmed.len(), samples_for(Duration::from_millis(500), RATE));
    assert_eq!(duration_of(trimmed.len(), RATE), Duration::from_millis(500));
}

/// WHAT: Trimming an already trimmed recording changes nothing
/// WHY: Trimming must be idempotent
#[test]
fn given_trimmed_recording_when_trimming_again_then_length_unchanged() {
    // Given: A trimmed recording
    let samples = speech_then_silence(Duration::from_millis(400), Duration::from_secs(1));
    let once = trim_trailing_silence(&samples, RATE).to_vec();

    // When: Trimming again
    let twice = trim_trailing_silence(&once, RATE);

    // Then: Same samples
    assert_eq!(twice, once.as_slice());
}

/// WHAT: An all-zero recording keeps only its leading 0.1 s
/// WHY: With no sample above threshold there is no speech end to anchor on
#[test]
fn given_all_zero_recording_when_trimming_then_leading_tenth_second_kept() {
    // Given: One second of zeros
    let samples = vec![0.0f32; RATE as usize];

    // When: Computing the trimmed length
    let keep = trimmed_len(&samples, RATE);

    // Then: 0.1 s kept
    assert_eq!(keep, samples_for(Duration::from_millis(100), RATE));
}

/// WHAT: Trimming never extends a recording
/// WHY: The tail margin is capped at the available samples
#[test]
fn given_speech_until_end_when_trimming_then_length_not_exceeded() {
    // Given: Speech running to the last sample
    let samples = vec![LOUD; 1_000];

    // When: Computing the trimmed length
    let keep = trimmed_len(&samples, RATE);

    // Then: Whole recording kept, nothing more
    assert_eq!(keep, samples.len());
}

/// WHAT: Peak amplitude is the largest absolute sample
/// WHY: Negative excursions count toward the silence check
#[test]
fn given_negative_peak_when_measuring_then_magnitude_returned() {
    // Given: Samples whose largest magnitude is negative
    let samples = [0.1f32, -0.7, 0.3];

    // When: Measuring the peak
    let peak = peak_amplitude(&samples);

    // Then: 0.7
    assert!((peak - 0.7).abs() < f32::EPSILON);
    assert_eq!(peak_amplitude(&[]), 0.0);
}
