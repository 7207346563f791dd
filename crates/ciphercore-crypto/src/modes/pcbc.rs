//! PCBC (Propagating Cipher Block Chaining) mode.
//!
//! The chaining value after block `i` is `P_i ^ C_i`, so one corrupted
//! ciphertext block garbles every block after it.

use ciphercore_types::{CipherDirection, CryptoError};

use super::worker::WorkerJob;
use super::{xor_into, Step};

pub(super) fn prepare(
    direction: CipherDirection,
    step: Step<'_>,
) -> Result<Option<WorkerJob>, CryptoError> {
    let Step {
        cipher,
        blocks,
        chain,
        scratch,
        cancel,
    } = step;

    match direction {
        CipherDirection::Encrypt => {
            // Slot 0 keeps the plaintext while the block is overwritten.
            let plain = &mut scratch.slots_mut()[0];
            for block in blocks.iter_mut() {
                cancel.check()?;
                plain.copy_from_slice(block);
                xor_into(block, chain.as_bytes());
                cipher.encrypt_block(block)?;
                xor_into(plain, block);
                chain.set(plain);
            }
            Ok(None)
        }
        CipherDirection::Decrypt => Ok(Some(WorkerJob::DecryptIntoSlot)),
    }
}

/// Decrypt fixup: `P_i = D(C_i) ^ (P_{i-1} ^ C_{i-1})`, in stream order.
pub(super) fn finish(direction: CipherDirection, step: Step<'_>) -> Result<(), CryptoError> {
    debug_assert_eq!(direction, CipherDirection::Decrypt);
    let Step {
        blocks,
        chain,
        scratch,
        ..
    } = step;

    for (block, slot) in blocks.iter_mut().zip(scratch.slots_mut()) {
        xor_into(slot, chain.as_bytes());
        xor_into(block, slot);
        chain.set(block);
        block.copy_from_slice(slot);
    }
    Ok(())
}
