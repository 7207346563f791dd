//! Final-block padding schemes: zeros, PKCS#7, ANSI X9.23 and ISO 10126.
//!
//! Only the last block of a stream is ever padded or unpadded. Validity
//! checks on unpad compare bytes in constant time.

use ciphercore_types::{CryptoError, PaddingMode};
use subtle::{Choice, ConstantTimeEq, ConstantTimeGreater};

/// What to do when a decrypted final block carries malformed padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingCheck {
    /// Leave the block untouched and report its full length.
    #[default]
    Lenient,
    /// Fail with [`CryptoError::InvalidPadding`].
    Strict,
}

/// A padding scheme bound to a block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    mode: PaddingMode,
    block_size: usize,
    check: PaddingCheck,
}

impl Padding {
    /// Count-byte schemes store the pad length in one byte, so they need
    /// `block_size <= 255`.
    pub fn new(mode: PaddingMode, block_size: usize) -> Result<Self, CryptoError> {
        if block_size == 0 {
            return Err(CryptoError::InvalidArg);
        }
        if mode != PaddingMode::Zeros && block_size > u8::MAX as usize {
            return Err(CryptoError::NotSupported);
        }
        Ok(Self {
            mode,
            block_size,
            check: PaddingCheck::default(),
        })
    }

    pub fn with_check(mut self, check: PaddingCheck) -> Self {
        self.check = check;
        self
    }

    pub fn mode(&self) -> PaddingMode {
        self.mode
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Whether block-aligned input still gets a whole block of padding.
    ///
    /// Count-byte schemes always pad so the count can be read back; zero
    /// padding has nothing to record and leaves aligned input alone.
    pub fn pads_aligned_input(&self) -> bool {
        self.mode != PaddingMode::Zeros
    }

    /// Pad the first `data_len` bytes of `block` out to a full block.
    pub fn pad(&self, block: &mut Vec<u8>, data_len: usize) -> Result<(), CryptoError> {
        let bs = self.block_size;
        if data_len > bs || data_len > block.len() {
            return Err(CryptoError::InvalidBlockSize {
                expected: bs,
                got: data_len,
            });
        }
        let n = bs - data_len;
        block.truncate(data_len);
        if n == 0 {
            return Ok(());
        }

        match self.mode {
            PaddingMode::Zeros => block.resize(bs, 0),
            PaddingMode::Pkcs7 => block.resize(bs, n as u8),
            PaddingMode::AnsiX923 => {
                block.resize(bs, 0);
                block[bs - 1] = n as u8;
            }
            PaddingMode::Iso10126 => {
                block.resize(bs, 0);
                random_filler(&mut block[data_len..bs - 1])?;
                block[bs - 1] = n as u8;
            }
        }
        Ok(())
    }

    /// Recover the unpadded length of a full final block.
    ///
    /// With `force_resize` the block is truncated to that length.
    pub fn unpad(&self, block: &mut Vec<u8>, force_resize: bool) -> Result<usize, CryptoError> {
        let bs = self.block_size;
        if block.len() != bs {
            return Err(CryptoError::InvalidBlockSize {
                expected: bs,
                got: block.len(),
            });
        }

        let len = match self.mode {
            PaddingMode::Zeros => block.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1),
            _ => {
                let (valid, pad_len) = self.check_count_padding(block);
                if bool::from(valid) {
                    bs - pad_len
                } else if self.check == PaddingCheck::Strict {
                    return Err(CryptoError::InvalidPadding);
                } else {
                    tracing::debug!(mode = ?self.mode, "malformed padding left in place");
                    bs
                }
            }
        };

        if force_resize {
            block.truncate(len);
        }
        Ok(len)
    }

    /// Validate a count-byte scheme without branching on the data.
    fn check_count_padding(&self, block: &[u8]) -> (Choice, usize) {
        let bs = self.block_size;
        let v = block[bs - 1];
        let v64 = v as u64;
        let mut valid = !v.ct_eq(&0) & !v64.ct_gt(&(bs as u64));

        let filler_checked = self.mode != PaddingMode::Iso10126;
        if filler_checked {
            let expected = match self.mode {
                PaddingMode::Pkcs7 => v,
                _ => 0,
            };
            // Bytes at distance 2..=v from the end are filler.
            for (i, &b) in block[..bs - 1].iter().enumerate() {
                let distance = (bs - i) as u64;
                let in_pad = !distance.ct_gt(&v64);
                valid &= !in_pad | b.ct_eq(&expected);
            }
        }
        (valid, v as usize)
    }
}

/// Fill ISO 10126 filler bytes from the OS generator.
fn random_filler(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|_| CryptoError::RandGenFail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padding(mode: PaddingMode) -> Padding {
        Padding::new(mode, 16).unwrap()
    }

    #[test]
    fn test_pkcs7_empty_block_is_all_sixteens() {
        let p = padding(PaddingMode::Pkcs7);
        let mut block = Vec::new();
        p.pad(&mut block, 0).unwrap();
        assert_eq!(block, vec![0x10; 16]);
        assert_eq!(p.unpad(&mut block, true).unwrap(), 0);
        assert!(block.is_empty());
    }

    #[test]
    fn test_pkcs7_roundtrip_all_lengths() {
        let p = padding(PaddingMode::Pkcs7);
        for len in 0..16 {
            let data: Vec<u8> = (1..=len as u8).collect();
            let mut block = data.clone();
            p.pad(&mut block, len).unwrap();
            assert_eq!(block.len(), 16);
            assert!(block[len..].iter().all(|&b| b as usize == 16 - len));
            assert_eq!(p.unpad(&mut block, true).unwrap(), len);
            assert_eq!(block, data);
        }
    }

    #[test]
    fn test_ansix923_layout() {
        let p = padding(PaddingMode::AnsiX923);
        let mut block = b"hello".to_vec();
        p.pad(&mut block, 5).unwrap();
        assert_eq!(&block[5..15], &[0u8; 10]);
        assert_eq!(block[15], 11);
        assert_eq!(p.unpad(&mut block, false).unwrap(), 5);
        assert_eq!(block.len(), 16);
    }

    #[test]
    fn test_iso10126_checks_count_only() {
        let p = padding(PaddingMode::Iso10126);
        let mut block = b"abc".to_vec();
        p.pad(&mut block, 3).unwrap();
        assert_eq!(block[15], 13);
        // Filler is random and never validated.
        block[7] ^= 0xff;
        assert_eq!(p.unpad(&mut block, true).unwrap(), 3);
        assert_eq!(block, b"abc");
    }

    #[test]
    fn test_random_filler_error_is_general() {
        let mut filler = [0u8; 64];
        random_filler(&mut filler).unwrap();
        assert!(filler.iter().any(|&b| b != 0));
        assert_eq!(CryptoError::RandGenFail.to_string(), "random generation failed");
        assert!(!matches!(CryptoError::RandGenFail, CryptoError::BnRandGenFail));
    }

    #[test]
    fn test_zeros_strips_trailing_zeros() {
        let p = padding(PaddingMode::Zeros);
        let mut block = b"data".to_vec();
        p.pad(&mut block, 4).unwrap();
        assert_eq!(&block[4..], &[0u8; 12]);
        assert_eq!(p.unpad(&mut block, true).unwrap(), 4);
        // A plaintext ending in zero bytes loses them.
        let mut ambiguous = vec![7, 0, 0, 0];
        p.pad(&mut ambiguous, 4).unwrap();
        assert_eq!(p.unpad(&mut ambiguous, true).unwrap(), 1);
    }

    #[test]
    fn test_malformed_padding_lenient_keeps_block() {
        let p = padding(PaddingMode::Pkcs7);
        let mut block = vec![0x41; 16];
        block[15] = 3;
        block[14] = 3;
        block[13] = 9;
        let original = block.clone();
        assert_eq!(p.unpad(&mut block, true).unwrap(), 16);
        assert_eq!(block, original);

        let mut zero_count = vec![0u8; 16];
        assert_eq!(p.unpad(&mut zero_count, true).unwrap(), 16);

        let mut too_big = vec![17u8; 16];
        assert_eq!(p.unpad(&mut too_big, true).unwrap(), 16);
    }

    #[test]
    fn test_malformed_padding_strict_errors() {
        let p = padding(PaddingMode::AnsiX923).with_check(PaddingCheck::Strict);
        let mut block = vec![0u8; 16];
        block[15] = 4;
        block[13] = 1;
        assert!(matches!(
            p.unpad(&mut block, true),
            Err(CryptoError::InvalidPadding)
        ));
        block[13] = 0;
        assert_eq!(p.unpad(&mut block, true).unwrap(), 12);
    }

    #[test]
    fn test_unpad_requires_full_block() {
        let p = padding(PaddingMode::Pkcs7);
        let mut short = vec![1u8; 15];
        assert!(matches!(
            p.unpad(&mut short, true),
            Err(CryptoError::InvalidBlockSize { expected: 16, got: 15 })
        ));
        let mut data = vec![0u8; 20];
        assert!(p.pad(&mut data, 17).is_err());
    }

    #[test]
    fn test_block_size_limits() {
        assert!(Padding::new(PaddingMode::Pkcs7, 0).is_err());
        assert!(Padding::new(PaddingMode::Pkcs7, 256).is_err());
        assert!(Padding::new(PaddingMode::Zeros, 256).is_ok());
        assert!(Padding::new(PaddingMode::AnsiX923, 255).is_ok());
    }
}
