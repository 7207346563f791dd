//! CFB (Cipher Feedback) mode, full-block feedback.
//!
//! Encryption is sequential: `C_i = P_i ^ E(C_{i-1})`. Decryption only ever
//! encrypts ciphertext that is already known, so each worker can rebuild its
//! own keystream block. The preceding ciphertext block of every position is
//! staged in that position's scratch slot before dispatch; workers never
//! read a neighbour's block.

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
            for block in blocks.iter_mut() {
                cancel.check()?;
                cipher.encrypt_block(chain.as_mut_bytes())?;
                xor_into(block, chain.as_bytes());
                chain.set(block);
            }
            Ok(None)
        }
        CipherDirection::Decrypt => {
            let slots = scratch.slots_mut();
            slots[0].copy_from_slice(chain.as_bytes());
            for (slot, prev) in slots[1..].iter_mut().zip(blocks.iter()) {
                slot.copy_from_slice(prev);
            }
            if let Some(last) = blocks.last() {
                chain.set(last);
            }
            Ok(Some(WorkerJob::KeystreamXor))
        }
    }
}
