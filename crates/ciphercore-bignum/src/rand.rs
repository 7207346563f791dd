//! Random big number generation using OS randomness.

use crate::bignum::BigNum;
use ciphercore_types::CryptoError;

/// Uniform random value with at most `bits` bits.
fn random_bits(bits: usize) -> Result<BigNum, CryptoError> {
    let num_bytes = bits.div_ceil(8);
    let mut buf = vec![0u8; num_bytes];
    getrandom::getrandom(&mut buf).map_err(|_| CryptoError::BnRandGenFail)?;

    let excess = num_bytes * 8 - bits;
    if excess > 0 {
        buf[0] &= 0xFF >> excess;
    }
    Ok(BigNum::from_bytes_be(&buf))
}

impl BigNum {
    /// Generate a random BigNum with exactly `bits` bits.
    ///
    /// If `odd` is true, the least significant bit is forced to 1.
    pub fn random(bits: usize, odd: bool) -> Result<BigNum, CryptoError> {
        if bits == 0 {
            return Ok(BigNum::zero());
        }

        let mut result = random_bits(bits)?;
        result.set_bit(bits - 1);
        if odd {
            result.set_bit(0);
        }
        Ok(result)
    }

    /// Generate a random BigNum uniformly in [1, upper) by rejection sampling.
    pub fn random_range(upper: &BigNum) -> Result<BigNum, CryptoError> {
        BigNum::random_between(&BigNum::one(), upper)
    }

    /// Generate a random BigNum uniformly in [low, high).
    pub fn random_between(low: &BigNum, high: &BigNum) -> Result<BigNum, CryptoError> {
        if low.is_negative() || low >= high {
            return Err(CryptoError::InvalidArg);
        }

        let span = high.sub(low);
        let bits = span.bit_len();
        loop {
            let candidate = random_bits(bits)?;
            if candidate < span {
                return Ok(candidate.add(low));
            }
        }
    }
}
