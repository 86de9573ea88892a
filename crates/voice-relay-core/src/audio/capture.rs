use crate::{
    CoreError, CoreResult,
    audio::AudioBlock,
    session::{SessionState, SessionStateMachine},
};

use std::{panic::Location, sync::Arc};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{error, info, instrument};

/// Always-on microphone stream feeding the session's capture buffer.
///
/// The stream runs for the life of the process. The callback downmixes to
/// mono, splits into blocks of at most `block_size` samples and hands them
/// to the session, which only keeps them while it is recording. Nothing in
/// the callback blocks beyond the capture buffer's append lock.
pub struct MicrophoneCapture {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl MicrophoneCapture {
    /// Open the default input device.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoMicrophoneFound`] if the host has no input
    /// device, or [`CoreError::DeviceError`] if its configuration is
    /// unavailable.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(CoreError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Microphone opened"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
        })
    }

    /// Native sample rate of the input stream.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Start streaming into `session`, splitting each callback's audio into
    /// blocks of at most `block_size` samples.
    ///
    /// The device picks its own callback size, so the last block of a
    /// callback is usually shorter.
    #[track_caller]
    #[instrument(skip(self, session))]
    pub fn start(&mut self, session: Arc<SessionStateMachine>, block_size: usize) -> CoreResult<()> {
        let channels = usize::from(self.config.channels.max(1));
        let block_size = block_size.max(1);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Cheap early-out; the session re-checks under the buffer lock.
                    if session.state() != SessionState::Recording {
                        return;
                    }

                    let mono = downmix(data, channels);
                    for chunk in mono.chunks(block_size) {
                        session.on_audio_block(AudioBlock::from(chunk));
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!(block_size, "Microphone capture started");

        Ok(())
    }

    /// Stop the stream. Dropping the capture has the same effect.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!("Microphone capture stopped");
        }
    }
}

/// Average interleaved frames down to a single channel.
pub fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }

    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
