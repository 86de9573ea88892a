mod capture;
mod capture_buffer;
mod duration;
mod engine;
mod resampler;
pub mod trim;

pub use {
    capture::{MicrophoneCapture, downmix},
    capture_buffer::{AudioBlock, CaptureBuffer},
    duration::{FALLBACK_DURATION, estimate_duration},
    engine::SttEngine,
    resampler::{Resampler, WHISPER_SAMPLE_RATE, to_whisper_rate},
};
