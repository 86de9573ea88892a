use crate::{CoreError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Sample rate expected by the speech model.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Mono FFT resampler used to bring captured audio to [`WHISPER_SAMPLE_RATE`].
pub struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    /// Build a mono resampler from `input_rate` to `output_rate`.
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_SIZE,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| CoreError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, "Resampler initialized");

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    /// Resample a whole recording.
    ///
    /// The final partial chunk is zero-padded and the output truncated back to
    /// the exact rate-scaled length, so no padding leaks into the result.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let expected_len = (samples.len() as f64 * f64::from(self.output_rate)
            / f64::from(self.input_rate)) as usize;
        let mut output = Vec::with_capacity(expected_len + CHUNK_SIZE);

        let output_frames_max = self.resampler.output_frames_max();
        let mut input_chunk = vec![0.0f32; CHUNK_SIZE];
        let mut output_chunk = vec![0.0f32; output_frames_max];

        for chunk in samples.chunks(CHUNK_SIZE) {
            input_chunk[..chunk.len()].copy_from_slice(chunk);
            input_chunk[chunk.len()..].fill(0.0);

            let input_adapter = InterleavedSlice::new(&input_chunk, 1, CHUNK_SIZE)
                .map_err(|e| resampling_error("Failed to create input adapter", e))?;

            let mut output_adapter =
                InterleavedSlice::new_mut(&mut output_chunk, 1, output_frames_max)
                    .map_err(|e| resampling_error("Failed to create output adapter", e))?;

            let (_consumed, written) = self
                .resampler
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| resampling_error("Resampling failed", e))?;

            output.extend_from_slice(&output_chunk[..written]);
        }

        output.truncate(expected_len);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampled audio"
        );

        Ok(output)
    }
}

/// Bring `samples` captured at `input_rate` to [`WHISPER_SAMPLE_RATE`].
///
/// Returns the input unchanged when no conversion is needed.
#[track_caller]
pub fn to_whisper_rate(samples: Vec<f32>, input_rate: u32) -> CoreResult<Vec<f32>> {
    if input_rate == WHISPER_SAMPLE_RATE || samples.is_empty() {
        return Ok(samples);
    }

    Resampler::new(input_rate, WHISPER_SAMPLE_RATE)?.resample(&samples)
}

#[track_caller]
fn resampling_error(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::ResamplingError {
        reason: format!("{}: {}", context, e),
        location: ErrorLocation::from(Location::caller()),
    }
}
