use crate::{
    AudioBlock, ModelStatus, PressOutcome, SessionSettings, SessionStateMachine, audio::downmix,
};

use std::{sync::Arc, time::Instant};

const STEREO: usize = 2;
const BLOCK_SIZE: usize = 4;

/// WHAT: Stereo frames are averaged into one mono sample each
/// WHY: The capture buffer and the transcriber only accept mono audio
#[test]
fn given_stereo_frames_when_downmixing_then_each_frame_is_averaged() {
    // Given: Two stereo frames
    let interleaved = [1.0f32, 0.0, -0.5, 0.5];

    // When: Downmixing to mono
    let mono = downmix(&interleaved, STEREO);

    // Then: One averaged sample per frame
    assert_eq!(mono, vec![0.5, 0.0]);
}

/// WHAT: Mono input passes through untouched
/// WHY: Most microphones are mono; no averaging should alter them
#[test]
fn given_mono_input_when_downmixing_then_samples_unchanged() {
    // Given: Mono samples
    let samples = [0.1f32, 0.2, 0.3];

    // When: Downmixing with one channel
    let mono = downmix(&samples, 1);

    // Then: Same samples
    assert_eq!(mono, samples.to_vec());
}

/// WHAT: Blocks offered from another thread are kept only while recording
/// WHY: The capture callback runs on the audio thread and must never fill
/// the buffer outside a recording
#[test]
fn given_callback_thread_when_session_not_recording_then_blocks_dropped() {
    // Given: A ready, idle session shared with a simulated callback thread
    let session = Arc::new(SessionStateMachine::new(SessionSettings::default()));
    session.set_model_status(ModelStatus::Ready);

    let callback_session = Arc::clone(&session);
    let stored_while_idle = std::thread::spawn(move || {
        callback_session.on_audio_block(AudioBlock::from(vec![0.5; BLOCK_SIZE]))
    })
    .join()
    .unwrap();

    // When: Recording starts and the callback offers another block
    assert_eq!(session.on_hotkey_down(Instant::now()), PressOutcome::Started);
    let callback_session = Arc::clone(&session);
    let stored_while_recording = std::thread::spawn(move || {
        callback_session.on_audio_block(AudioBlock::from(vec![0.5; BLOCK_SIZE]))
    })
    .join()
    .unwrap();

    // Then: Only the block offered while recording was kept
    assert!(!stored_while_idle);
    assert!(stored_while_recording);
    assert_eq!(session.capture().len(), 1);
}
