//! SHACAL-1 block cipher.
//!
//! SHACAL-1 is the SHA-1 compression function run as a cipher: the 160-bit
//! block is the chaining state `(A, B, C, D, E)` and the key is the 512-bit
//! message block. Keys shorter than 64 bytes are zero-extended. Words are
//! big-endian, as in SHA-1.

use ciphercore_types::CryptoError;
use zeroize::Zeroize;

use crate::provider::{check_block_len, BlockCipher};

/// SHACAL-1 block size in bytes (160 bits).
pub const SHACAL1_BLOCK_SIZE: usize = 20;
/// Shortest accepted key (128 bits).
pub const SHACAL1_MIN_KEY_SIZE: usize = 16;
/// Longest accepted key (512 bits).
pub const SHACAL1_MAX_KEY_SIZE: usize = 64;

const ROUNDS: usize = 80;
const K: [u32; 4] = [0x5A82_7999, 0x6ED9_EBA1, 0x8F1B_BCDC, 0xCA62_C1D6];

/// A SHACAL-1 key with its 80-word expanded schedule.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Shacal1Key {
    key_len: usize,
    schedule: [u32; ROUNDS],
}

impl Shacal1Key {
    /// Create a key from 16 to 64 raw bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if !(SHACAL1_MIN_KEY_SIZE..=SHACAL1_MAX_KEY_SIZE).contains(&key.len()) {
            return Err(CryptoError::InvalidKeyLength {
                expected: SHACAL1_MAX_KEY_SIZE,
                got: key.len(),
            });
        }

        let mut padded = [0u8; SHACAL1_MAX_KEY_SIZE];
        padded[..key.len()].copy_from_slice(key);

        let mut w = [0u32; ROUNDS];
        for (word, bytes) in w.iter_mut().zip(padded.chunks_exact(4)) {
            *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        for t in 16..ROUNDS {
            w[t] = (w[t - 3] ^ w[t - 8] ^ w[t - 14] ^ w[t - 16]).rotate_left(1);
        }
        padded.zeroize();

        Ok(Self {
            key_len: key.len(),
            schedule: w,
        })
    }
}

/// Round function and constant for round `t`.
fn round_fn(t: usize, b: u32, c: u32, d: u32) -> (u32, u32) {
    match t / 20 {
        0 => ((b & c) | (!b & d), K[0]),
        1 => (b ^ c ^ d, K[1]),
        2 => ((b & c) | (b & d) | (c & d), K[2]),
        _ => (b ^ c ^ d, K[3]),
    }
}

fn load(block: &[u8]) -> [u32; 5] {
    let mut s = [0u32; 5];
    for (word, bytes) in s.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    s
}

fn store(state: &[u32; 5], block: &mut [u8]) {
    for (word, bytes) in state.iter().zip(block.chunks_exact_mut(4)) {
        bytes.copy_from_slice(&word.to_be_bytes());
    }
}

impl BlockCipher for Shacal1Key {
    fn block_size(&self) -> usize {
        SHACAL1_BLOCK_SIZE
    }

    fn key_size(&self) -> usize {
        self.key_len
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        check_block_len(block, SHACAL1_BLOCK_SIZE)?;
        let [mut a, mut b, mut c, mut d, mut e] = load(block);

        for (t, &w) in self.schedule.iter().enumerate() {
            let (f, k) = round_fn(t, b, c, d);
            let temp = a
                .rotate_left(5)
                .wrapping_add(f)
                .wrapping_add(e)
                .wrapping_add(k)
                .wrapping_add(w);
            e = d;
            d = c;
            c = b.rotate_left(30);
            b = a;
            a = temp;
        }

        store(&[a, b, c, d, e], block);
        Ok(())
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        check_block_len(block, SHACAL1_BLOCK_SIZE)?;
        let [mut a, mut b, mut c, mut d, mut e] = load(block);

        for (t, &w) in self.schedule.iter().enumerate().rev() {
            let prev_a = b;
            let prev_b = c.rotate_right(30);
            let prev_c = d;
            let prev_d = e;
            let (f, k) = round_fn(t, prev_b, prev_c, prev_d);
            let prev_e = a
                .wrapping_sub(prev_a.rotate_left(5))
                .wrapping_sub(f)
                .wrapping_sub(k)
                .wrapping_sub(w);
            a = prev_a;
            b = prev_b;
            c = prev_c;
            d = prev_d;
            e = prev_e;
        }

        store(&[a, b, c, d, e], block);
        Ok(())
    }
}
