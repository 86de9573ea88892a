use crate::{CoreError, audio::SttEngine, pipeline::Transcriber};

use std::path::PathBuf;

/// WHAT: SttEngine rejects non-existent model path
/// WHY: Early validation prevents runtime failures
#[test]
fn given_invalid_model_path_when_creating_engine_then_model_not_found_error() {
    // Given: Path to non-existent Whisper model
    let invalid_path = PathBuf::from("/nonexistent/model.bin");

    // When: Attempting to create SttEngine
    let result = SttEngine::new(&invalid_path, false);

    // Then: Returns ModelNotFound error
    assert!(matches!(result, Err(CoreError::ModelNotFound { .. })));
}

/// WHAT: Empty samples transcribe to nothing without running inference
/// WHY: A zero-length capture must not be reported as recognized speech
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn given_empty_samples_when_transcribing_then_nothing_recognized() {
    // Given: SttEngine with valid model
    let model_path = std::env::var("TEST_WHISPER_MODEL_PATH")
        .unwrap_or_else(|_| "models/ggml-base.bin".to_string());
    let engine = SttEngine::new(&model_path, false).unwrap();

    // When: Transcribing empty samples
    let result = engine.transcribe(&[], "en").unwrap();

    // Then: Nothing recognized
    assert!(result.is_none());
}

/// WHAT: One second of silence does not hallucinate a transcript
/// WHY: Blank suppression must stay enabled in the decoder parameters
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn given_silence_when_inferring_then_text_is_blank_or_short() {
    // Given: SttEngine with valid model and one second of silence
    let model_path = std::env::var("TEST_WHISPER_MODEL_PATH")
        .unwrap_or_else(|_| "models/ggml-base.bin".to_string());
    let engine = SttEngine::new(&model_path, false).unwrap();
    let silence = vec![0.0f32; 16_000];

    // When: Running inference
    let text = engine.infer(&silence, "en").unwrap();

    // Then: No meaningful text
    assert!(text.len() < 20, "unexpected transcript: {text}");
}
