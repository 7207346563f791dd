//! CBC (Cipher Block Chaining) mode.
//!
//! Encryption is a sequential loop: `C_i = E(P_i ^ C_{i-1})`. Decryption
//! decrypts every block in parallel into its scratch slot, then a sequential
//! pass XORs in the previous ciphertext.

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
        cancel,
        ..
    } = step;

    match direction {
        CipherDirection::Encrypt => {
            for block in blocks.iter_mut() {
                cancel.check()?;
                xor_into(block, chain.as_bytes());
                cipher.encrypt_block(block)?;
                chain.set(block);
            }
            Ok(None)
        }
        CipherDirection::Decrypt => Ok(Some(WorkerJob::DecryptIntoSlot)),
    }
}

/// Decrypt fixup: `P_i = D(C_i) ^ C_{i-1}`, in stream order.
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
        chain.set(block);
        block.copy_from_slice(slot);
    }
    Ok(())
}
