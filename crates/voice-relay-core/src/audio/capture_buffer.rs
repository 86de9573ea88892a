use std::{
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use tracing::{debug, error, warn};

/// One microphone callback's worth of mono samples.
///
/// Immutable once constructed; the buffer only ever moves blocks around.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock(Box<[f32]>);

impl AudioBlock {
    /// Samples in this block.
    pub fn samples(&self) -> &[f32] {
        &self.0
    }

    /// Number of samples in this block.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the block carries no samples.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for AudioBlock {
    fn from(samples: Vec<f32>) -> Self {
        Self(samples.into_boxed_slice())
    }
}

impl From<&[f32]> for AudioBlock {
    fn from(samples: &[f32]) -> Self {
        Self(samples.into())
    }
}

#[derive(Debug, Default)]
struct Inner {
    blocks: Vec<AudioBlock>,
    samples: usize,
    overflow_warned: bool,
}

/// Bounded, append-only block store filled by the capture callback.
///
/// Every operation takes the same lock, so a drain racing an append either
/// sees the block or leaves it for the next drain; it is never split or
/// duplicated. Capacity is counted in samples, so the limit holds whatever
/// block sizes the audio callback produces. Once `max_samples` is reached
/// further blocks are dropped and a single warning is logged until the buffer
/// is next emptied.
#[derive(Debug)]
pub struct CaptureBuffer {
    inner: Mutex<Inner>,
    max_samples: usize,
}

impl CaptureBuffer {
    /// Create a buffer that stops accepting blocks once it holds
    /// `max_samples` samples.
    ///
    /// The block that crosses the limit is kept whole, so at least
    /// `max_samples` samples always fit.
    pub fn new(max_samples: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_samples: max_samples.max(1),
        }
    }

    /// Size the buffer for `max_duration` of audio at `sample_rate`.
    pub fn for_duration(max_duration: Duration, sample_rate: u32) -> Self {
        let max_samples = (max_duration.as_secs_f64() * f64::from(sample_rate)).ceil() as usize;
        Self::new(max_samples)
    }

    /// Sample count at which the buffer is full.
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Append a block unconditionally (subject to the capacity limit).
    ///
    /// Returns `true` if the block was stored.
    pub fn append(&self, block: AudioBlock) -> bool {
        self.append_if(block, || true)
    }

    /// Append a block if `admit` returns `true` while the lock is held.
    ///
    /// Evaluating the admission check under the buffer lock lets the caller
    /// gate appends on session state without a window where a block lands
    /// after the buffer has been drained.
    pub fn append_if<F>(&self, block: AudioBlock, admit: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let mut inner = self.lock();

        if !admit() {
            return false;
        }

        if inner.samples >= self.max_samples {
            if !inner.overflow_warned {
                inner.overflow_warned = true;
                warn!(
                    max_samples = self.max_samples,
                    "Capture buffer full, dropping further audio until recording ends"
                );
            }
            return false;
        }

        inner.samples += block.len();
        inner.blocks.push(block);
        true
    }

    /// Concatenate every stored block and empty the buffer in one step.
    pub fn drain_and_flatten(&self) -> Vec<f32> {
        let blocks = {
            let mut inner = self.lock();
            inner.overflow_warned = false;
            inner.samples = 0;
            std::mem::take(&mut inner.blocks)
        };

        let total: usize = blocks.iter().map(AudioBlock::len).sum();
        let mut samples = Vec::with_capacity(total);
        for block in &blocks {
            samples.extend_from_slice(block.samples());
        }

        debug!(
            block_count = blocks.len(),
            sample_count = samples.len(),
            "Capture buffer drained"
        );

        samples
    }

    /// Discard all stored blocks.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.blocks.clear();
        inner.samples = 0;
        inner.overflow_warned = false;
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.lock().blocks.len()
    }

    /// Whether the buffer holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.lock().blocks.is_empty()
    }

    /// Whether the capacity limit has been reached.
    pub fn is_full(&self) -> bool {
        self.lock().samples >= self.max_samples
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock still holds valid blocks; keep using them.
        self.inner.lock().unwrap_or_else(|e| {
            error!("Capture buffer lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
