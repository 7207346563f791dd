//! The block cipher capability consumed by the mode engine.

use ciphercore_types::CryptoError;

/// A keyed block cipher (e.g., AES, SHACAL-1).
///
/// Implementations hold their key schedule and transform exactly one
/// `block_size()`-byte block per call. They must be shareable across the
/// worker threads of a batch, hence `Send + Sync`.
pub trait BlockCipher: Send + Sync {
    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Key size in bytes.
    fn key_size(&self) -> usize;

    /// Encrypt a single block in-place.
    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;

    /// Decrypt a single block in-place.
    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;
}

/// Reject a block whose length is not the cipher's block size.
pub(crate) fn check_block_len(block: &[u8], expected: usize) -> Result<(), CryptoError> {
    if block.len() != expected {
        return Err(CryptoError::InvalidBlockSize {
            expected,
            got: block.len(),
        });
    }
    Ok(())
}
