//! AES (Advanced Encryption Standard) block cipher, FIPS 197.
//!
//! Provides AES-128, AES-192 and AES-256 single-block operations behind the
//! [`BlockCipher`] trait; chaining is left to the [`modes`](crate::modes)
//! engine.

mod soft;

use ciphercore_types::CryptoError;
use zeroize::Zeroize;

use crate::provider::{check_block_len, BlockCipher};

/// AES block size in bytes (128 bits).
pub const AES_BLOCK_SIZE: usize = 16;

/// An AES key with its expanded round-key schedule.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct AesKey {
    key_len: usize,
    round_keys: Vec<[u8; AES_BLOCK_SIZE]>,
}

impl AesKey {
    /// Create a new AES key from raw bytes.
    ///
    /// Accepts 16, 24, or 32-byte keys for AES-128, AES-192, and AES-256.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let round_keys = soft::expand_key(key)?;
        Ok(Self {
            key_len: key.len(),
            round_keys,
        })
    }

    /// Number of cipher rounds (10, 12 or 14).
    pub fn rounds(&self) -> usize {
        self.round_keys.len() - 1
    }
}

impl BlockCipher for AesKey {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn key_size(&self) -> usize {
        self.key_len
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        check_block_len(block, AES_BLOCK_SIZE)?;
        let mut state = [0u8; AES_BLOCK_SIZE];
        state.copy_from_slice(block);
        soft::encrypt(&mut state, &self.round_keys);
        block.copy_from_slice(&state);
        state.zeroize();
        Ok(())
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        check_block_len(block, AES_BLOCK_SIZE)?;
        let mut state = [0u8; AES_BLOCK_SIZE];
        state.copy_from_slice(block);
        soft::decrypt(&mut state, &self.round_keys);
        block.copy_from_slice(&state);
        state.zeroize();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    /// FIPS 197 Appendix B: AES-128
    #[test]
    fn aes128_fips197_appendix_b() {
        let aes = AesKey::new(&hex("2b7e151628aed2a6abf7158809cf4f3c")).unwrap();
        let mut block = hex("3243f6a8885a308d313198a2e0370734");
        aes.encrypt_block(&mut block).unwrap();
        assert_eq!(block, hex("3925841d02dc09fbdc118597196a0b32"));
        aes.decrypt_block(&mut block).unwrap();
        assert_eq!(block, hex("3243f6a8885a308d313198a2e0370734"));
    }

    /// FIPS 197 Appendix C.2: AES-192
    #[test]
    fn aes192_fips197_appendix_c2() {
        let aes = AesKey::new(&hex("000102030405060708090a0b0c0d0e0f1011121314151617")).unwrap();
        assert_eq!(aes.rounds(), 12);
        assert_eq!(aes.key_size(), 24);
        let mut block = hex("00112233445566778899aabbccddeeff");
        aes.encrypt_block(&mut block).unwrap();
        assert_eq!(block, hex("dda97ca4864cdfe06eaf70a0ec0d7191"));
        aes.decrypt_block(&mut block).unwrap();
        assert_eq!(block, hex("00112233445566778899aabbccddeeff"));
    }

    /// FIPS 197 Appendix C.3: AES-256
    #[test]
    fn aes256_fips197_appendix_c3() {
        let key = hex("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f");
        let aes = AesKey::new(&key).unwrap();
        assert_eq!(aes.rounds(), 14);
        let mut block = hex("00112233445566778899aabbccddeeff");
        aes.encrypt_block(&mut block).unwrap();
        assert_eq!(block, hex("8ea2b7ca516745bfeafc49904b496089"));
        aes.decrypt_block(&mut block).unwrap();
        assert_eq!(block, hex("00112233445566778899aabbccddeeff"));
    }

    #[test]
    fn invalid_key_length_rejected() {
        for len in [0, 15, 17, 31, 33] {
            assert!(AesKey::new(&vec![0u8; len]).is_err(), "{len}-byte key accepted");
        }
    }

    #[test]
    fn invalid_block_size_rejected() {
        let aes = AesKey::new(&[0u8; 16]).unwrap();
        let mut short = [0u8; 8];
        assert!(matches!(
            aes.encrypt_block(&mut short),
            Err(CryptoError::InvalidBlockSize { expected: 16, got: 8 })
        ));
        let mut long = [0u8; 32];
        assert!(aes.decrypt_block(&mut long).is_err());
    }
}
