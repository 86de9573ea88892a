use crate::{AudioBlock, CaptureBuffer};

use std::{
    sync::{Arc, Barrier},
    thread,
    time::Duration,
};

const BLOCK_SIZE: usize = 1024;
const SAMPLE_RATE: u32 = 16_000;
const WRITER_BLOCKS: usize = 2_000;

fn block(value: f32) -> AudioBlock {
    AudioBlock::from(vec![value; BLOCK_SIZE])
}

/// WHAT: Buffer sizing counts samples for the maximum duration
/// WHY: The maximum recording length must fit entirely, never be cut short
#[test]
fn given_max_duration_when_sizing_buffer_then_capacity_in_samples() {
    // Given: 60 s at 16 kHz
    let max = Duration::from_secs(60);

    // When: Sizing the buffer
    let buffer = CaptureBuffer::for_duration(max, SAMPLE_RATE);

    // Then: 960 000 samples
    assert_eq!(buffer.max_samples(), 960_000);
}

/// WHAT: Short blocks fill the buffer up to the full duration
/// WHY: Audio callbacks deliver whatever size the device picks, often far
/// smaller than the configured block size
#[test]
fn given_short_blocks_when_filling_then_full_duration_kept() {
    // Given: A 60 s buffer at 48 kHz
    let rate = 48_000;
    let buffer = CaptureBuffer::for_duration(Duration::from_secs(60), rate);
    let max = buffer.max_samples();

    // When: 90 s of 10 ms (480-sample) blocks arrive
    for _ in 0..9_000 {
        buffer.append(AudioBlock::from(vec![0.1; 480]));
    }

    // Then: At least 60 s and less than one extra block were kept
    let kept = buffer.drain_and_flatten().len();
    assert!(kept >= max, "kept {} of {} samples", kept, max);
    assert!(kept < max + 480);
}

/// WHAT: Mixed block sizes are capped by total samples, not block count
/// WHY: One callback can emit a full block followed by a short remainder
#[test]
fn given_mixed_block_sizes_when_filling_then_capped_by_samples() {
    // Given: A buffer for three full blocks
    let buffer = CaptureBuffer::new(3 * BLOCK_SIZE);

    // When: Alternating full and 100-sample blocks until full
    let mut stored = 0;
    while !buffer.is_full() {
        let len = if stored % 2 == 0 { BLOCK_SIZE } else { 100 };
        assert!(buffer.append(AudioBlock::from(vec![0.2; len])));
        stored += 1;
    }

    // Then: More than three blocks fit and the next one is refused
    assert!(buffer.len() > 3);
    assert!(!buffer.append(block(0.3)));
}

/// WHAT: Appends stop silently once the buffer is full
/// WHY: A stuck hotkey must not grow memory without bound
#[test]
fn given_full_buffer_when_appending_then_block_dropped_without_error() {
    // Given: A two-block buffer that is already full
    let buffer = CaptureBuffer::new(2 * BLOCK_SIZE);
    assert!(buffer.append(block(0.1)));
    assert!(buffer.append(block(0.2)));

    // When: Appending a third block
    let stored = buffer.append(block(0.3));

    // Then: Dropped, contents unchanged
    assert!(!stored);
    assert!(buffer.is_full());
    assert_eq!(buffer.len(), 2);
}

/// WHAT: Drain concatenates blocks in order and empties the buffer
/// WHY: The pipeline must see the recording exactly as captured
#[test]
fn given_blocks_when_draining_then_flattened_in_order_and_buffer_empty() {
    // Given: Two distinct blocks
    let buffer = CaptureBuffer::new(BLOCK_SIZE);
    buffer.append(AudioBlock::from(vec![1.0, 2.0]));
    buffer.append(AudioBlock::from(vec![3.0]));

    // When: Draining
    let samples = buffer.drain_and_flatten();

    // Then: In-order samples, buffer empty
    assert_eq!(samples, vec![1.0, 2.0, 3.0]);
    assert!(buffer.is_empty());
}

/// WHAT: A drained full buffer accepts blocks again
/// WHY: Overflow state must reset between recordings
#[test]
fn given_overflowed_buffer_when_drained_then_appends_accepted_again() {
    // Given: An overflowed one-block buffer
    let buffer = CaptureBuffer::new(BLOCK_SIZE);
    buffer.append(block(0.1));
    assert!(!buffer.append(block(0.2)));

    // When: Draining and appending again
    buffer.drain_and_flatten();
    let stored = buffer.append(block(0.3));

    // Then: Accepted
    assert!(stored);
    assert_eq!(buffer.len(), 1);
}

/// WHAT: Rejected admission leaves the buffer untouched
/// WHY: The session gates appends on Recording under the buffer lock
#[test]
fn given_admission_refused_when_appending_then_nothing_stored() {
    // Given: An empty buffer
    let buffer = CaptureBuffer::new(BLOCK_SIZE);

    // When: Appending with a refusing admission check
    let stored = buffer.append_if(block(0.5), || false);

    // Then: Nothing stored
    assert!(!stored);
    assert!(buffer.is_empty());
}

/// WHAT: Concurrent drains and appends never lose or duplicate a block
/// WHY: The capture callback keeps appending while the coordinator drains
#[test]
fn given_concurrent_appends_when_draining_repeatedly_then_every_block_seen_once() {
    // Given: A large buffer, a writer appending numbered single-sample blocks
    let buffer = Arc::new(CaptureBuffer::new(WRITER_BLOCKS + 1));
    let start = Arc::new(Barrier::new(2));

    let writer = {
        let buffer = Arc::clone(&buffer);
        let start = Arc::clone(&start);
        thread::spawn(move || {
            start.wait();
            for i in 0..WRITER_BLOCKS {
                assert!(buffer.append(AudioBlock::from(vec![i as f32])));
            }
        })
    };

    // When: Draining repeatedly while the writer runs, then once more
    start.wait();
    let mut seen = Vec::new();
    while !writer.is_finished() {
        seen.extend(buffer.drain_and_flatten());
    }
    writer.join().unwrap();
    seen.extend(buffer.drain_and_flatten());

    // Then: Every block observed exactly once, in order
    let expected: Vec<f32> = (0..WRITER_BLOCKS).map(|i| i as f32).collect();
    assert_eq!(seen, expected);
}
