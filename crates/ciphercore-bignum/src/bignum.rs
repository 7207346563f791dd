//! Big number type, conversions and comparisons.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use ciphercore_types::CryptoError;
use zeroize::Zeroize;

/// Limb type for big number representation.
pub type Limb = u64;
/// Double-width type for multiplication intermediates.
pub type DoubleLimb = u128;

/// Bits per limb.
pub const LIMB_BITS: usize = 64;

/// Largest power of ten that fits in a limb, used for decimal conversion.
const DEC_CHUNK: u64 = 10_000_000_000_000_000_000;
const DEC_CHUNK_DIGITS: usize = 19;

/// A heap-allocated signed big number that is zeroized on drop.
///
/// Internally represented as a little-endian array of `u64` limbs.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct BigNum {
    /// Little-endian limbs (limbs[0] is the least significant).
    limbs: Vec<Limb>,
    negative: bool,
}

impl BigNum {
    pub fn zero() -> Self {
        Self {
            limbs: vec![0],
            negative: false,
        }
    }

    pub fn one() -> Self {
        Self::from_u64(1)
    }

    pub fn from_u64(value: u64) -> Self {
        Self {
            limbs: vec![value],
            negative: false,
        }
    }

    /// Create a BigNum from a vector of little-endian limbs.
    pub fn from_limbs(limbs: Vec<Limb>) -> Self {
        let mut bn = Self {
            limbs: if limbs.is_empty() { vec![0] } else { limbs },
            negative: false,
        };
        bn.normalize();
        bn
    }

    /// Create a BigNum from big-endian bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::zero();
        }

        let mut limbs = vec![0u64; bytes.len().div_ceil(8)];
        for (i, &byte) in bytes.iter().rev().enumerate() {
            limbs[i / 8] |= (byte as u64) << ((i % 8) * 8);
        }
        Self::from_limbs(limbs)
    }

    /// Export the magnitude to minimal big-endian bytes (`[0]` for zero).
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let bits = self.bit_len();
        if bits == 0 {
            return vec![0];
        }

        let num_bytes = bits.div_ceil(8);
        let mut bytes = vec![0u8; num_bytes];
        for (i, byte) in bytes.iter_mut().rev().enumerate() {
            *byte = (self.limbs[i / 8] >> ((i % 8) * 8)) as u8;
        }
        bytes
    }

    /// Parse an unsigned or `-`-prefixed decimal string.
    pub fn from_dec_str(s: &str) -> Result<Self, CryptoError> {
        let (negative, digits) = match s.trim().strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.trim()),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CryptoError::BnParseFail);
        }

        let mut acc = BigNum::zero();
        for chunk in digits.as_bytes().chunks(DEC_CHUNK_DIGITS) {
            let mut value = 0u64;
            for &b in chunk {
                value = value * 10 + u64::from(b - b'0');
            }
            let scale = 10u64.pow(chunk.len() as u32);
            acc = acc.mul(&BigNum::from_u64(scale)).add(&BigNum::from_u64(value));
        }
        acc.set_negative(negative);
        acc.normalize();
        Ok(acc)
    }

    /// The value as a `u64`, if it is non-negative and fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.is_negative() || self.bit_len() > LIMB_BITS {
            return None;
        }
        Some(self.limbs[0])
    }

    /// Return the number of significant bits.
    pub fn bit_len(&self) -> usize {
        for i in (0..self.limbs.len()).rev() {
            if self.limbs[i] != 0 {
                return i * LIMB_BITS + (LIMB_BITS - self.limbs[i].leading_zeros() as usize);
            }
        }
        0
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    pub fn is_one(&self) -> bool {
        !self.negative && self.limbs.len() == 1 && self.limbs[0] == 1
    }

    pub fn is_even(&self) -> bool {
        self.limbs[0] & 1 == 0
    }

    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }

    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    pub(crate) fn limbs_mut(&mut self) -> &mut Vec<Limb> {
        &mut self.limbs
    }

    pub fn set_negative(&mut self, neg: bool) {
        self.negative = neg;
    }

    /// Absolute value.
    pub fn abs(&self) -> BigNum {
        let mut r = self.clone();
        r.negative = false;
        r
    }

    /// Get bit at position `idx` (0-indexed from LSB).
    pub fn get_bit(&self, idx: usize) -> u64 {
        let limb_idx = idx / LIMB_BITS;
        if limb_idx >= self.limbs.len() {
            0
        } else {
            (self.limbs[limb_idx] >> (idx % LIMB_BITS)) & 1
        }
    }

    /// Set bit at position `idx` (0-indexed from LSB).
    pub fn set_bit(&mut self, idx: usize) {
        let limb_idx = idx / LIMB_BITS;
        if limb_idx >= self.limbs.len() {
            self.limbs.resize(limb_idx + 1, 0);
        }
        self.limbs[limb_idx] |= 1u64 << (idx % LIMB_BITS);
    }

    /// Remove leading zero limbs.
    pub(crate) fn normalize(&mut self) {
        while self.limbs.len() > 1 && self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        if self.is_zero() {
            self.negative = false;
        }
    }

    fn to_dec_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let chunk = BigNum::from_u64(DEC_CHUNK);
        let mut rest = self.abs();
        let mut parts = Vec::new();
        while !rest.is_zero() {
            // Divisor is a non-zero constant, so this cannot fail.
            let (q, r) = match rest.div_rem(&chunk) {
                Ok(qr) => qr,
                Err(_) => break,
            };
            parts.push(r.limbs[0]);
            rest = q;
        }
        let mut out = String::new();
        if self.is_negative() {
            out.push('-');
        }
        let mut iter = parts.iter().rev();
        if let Some(first) = iter.next() {
            out.push_str(&first.to_string());
        }
        for part in iter {
            out.push_str(&format!("{part:0width$}", width = DEC_CHUNK_DIGITS));
        }
        out
    }
}

impl fmt::Debug for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let hex = self
            .to_bytes_be()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();
        write!(f, "BigNum({sign}0x{hex})")
    }
}

impl fmt::Display for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dec_string())
    }
}

impl FromStr for BigNum {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.cmp_abs(other),
            (true, true) => other.cmp_abs(self),
        }
    }
}
