//! CTR (Counter) mode.
//!
//! The chain holds a big-endian unsigned counter as wide as the block. Block
//! `i` of a batch is XORed with `E(counter + i)`, every position computed in
//! parallel; afterwards the counter advances by the batch length. All
//! counter arithmetic wraps modulo `2^(8 * block_size)`.

use ciphercore_types::CryptoError;

use super::worker::WorkerJob;
use super::Step;

/// Add `delta` to a big-endian counter in place, wrapping at its width.
pub fn add_to_counter(counter: &mut [u8], delta: u64) {
    let mut carry = delta;
    for byte in counter.iter_mut().rev() {
        if carry == 0 {
            break;
        }
        let sum = u64::from(*byte) + (carry & 0xff);
        *byte = sum as u8;
        carry = (carry >> 8) + (sum >> 8);
    }
}

/// Stage `counter + i` into worker slot `i`; the spare last slot carries
/// the running counter.
pub(super) fn prepare(step: Step<'_>) -> Result<Option<WorkerJob>, CryptoError> {
    let Step {
        blocks,
        chain,
        scratch,
        ..
    } = step;

    let slots = scratch.slots_mut();
    let (workers, spare) = slots.split_at_mut(slots.len() - 1);
    let counter = &mut spare[0];
    counter.copy_from_slice(chain.as_bytes());
    for slot in workers.iter_mut().take(blocks.len()) {
        slot.copy_from_slice(counter);
        add_to_counter(counter, 1);
    }
    Ok(Some(WorkerJob::KeystreamXor))
}

/// Store the advanced counter once every block of the batch is done.
pub(super) fn finish(step: Step<'_>) -> Result<(), CryptoError> {
    let Step { chain, scratch, .. } = step;
    if let Some(counter) = scratch.slots_mut().last() {
        chain.set(counter);
    }
    Ok(())
}
