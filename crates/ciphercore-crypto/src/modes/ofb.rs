//! OFB (Output Feedback) mode.
//!
//! The keystream `O_i = E(O_{i-1})` depends only on the IV, but each value
//! feeds the next, so both directions run as one sequential loop.

use ciphercore_types::CryptoError;

use super::worker::WorkerJob;
use super::{xor_into, Step};

pub(super) fn prepare(step: Step<'_>) -> Result<Option<WorkerJob>, CryptoError> {
    let Step {
        cipher,
        blocks,
        chain,
        cancel,
        ..
    } = step;

    for block in blocks.iter_mut() {
        cancel.check()?;
        cipher.encrypt_block(chain.as_mut_bytes())?;
        xor_into(block, chain.as_bytes());
    }
    Ok(None)
}
