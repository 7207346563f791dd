//! Basic arithmetic operations for BigNum.

use std::cmp::Ordering;

use crate::bignum::{BigNum, DoubleLimb, Limb, LIMB_BITS};
use ciphercore_types::CryptoError;

impl BigNum {
    /// Add two BigNums: self + other.
    pub fn add(&self, other: &BigNum) -> BigNum {
        if self.is_negative() == other.is_negative() {
            let mut result = add_unsigned(self.limbs(), other.limbs());
            result.set_negative(self.is_negative());
            result
        } else if self.is_negative() {
            // (-a) + b = b - a
            sub_unsigned(other.limbs(), self.limbs())
        } else {
            // a + (-b) = a - b
            sub_unsigned(self.limbs(), other.limbs())
        }
    }

    /// Subtract: self - other.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        if self.is_negative() != other.is_negative() {
            let mut result = add_unsigned(self.limbs(), other.limbs());
            result.set_negative(self.is_negative());
            result
        } else if self.is_negative() {
            // (-a) - (-b) = b - a
            sub_unsigned(other.limbs(), self.limbs())
        } else {
            sub_unsigned(self.limbs(), other.limbs())
        }
    }

    /// Multiply: self * other.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        let mut result = mul_unsigned(self.limbs(), other.limbs());
        result.set_negative(self.is_negative() != other.is_negative());
        result.normalize();
        result
    }

    /// Division of magnitudes with remainder: returns (|self| / |d|, |self| mod |d|).
    pub fn div_rem(&self, divisor: &BigNum) -> Result<(BigNum, BigNum), CryptoError> {
        if divisor.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        Ok(div_rem_unsigned(self.limbs(), divisor.limbs()))
    }

    /// Least non-negative residue of self modulo |modulus|.
    pub fn mod_reduce(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        let (_, r) = self.div_rem(modulus)?;
        if self.is_negative() && !r.is_zero() {
            Ok(modulus.abs().sub(&r))
        } else {
            Ok(r)
        }
    }

    /// Modular multiplication: self * other mod modulus.
    pub fn mod_mul(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.mul(other).mod_reduce(modulus)
    }

    /// Modular exponentiation by square-and-multiply: self^exp mod modulus.
    ///
    /// `exp` is treated as non-negative.
    pub fn mod_exp(&self, exp: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        if modulus.is_one() {
            return Ok(BigNum::zero());
        }
        let mut result = BigNum::one();
        let mut base = self.mod_reduce(modulus)?;

        for i in 0..exp.bit_len() {
            if exp.get_bit(i) == 1 {
                result = result.mod_mul(&base, modulus)?;
            }
            base = base.mod_mul(&base, modulus)?;
        }

        Ok(result)
    }

    /// Logical right shift of the magnitude by `bits`. Sign is preserved.
    pub fn shr(&self, bits: usize) -> BigNum {
        let limb_shift = bits / LIMB_BITS;
        let bit_shift = bits % LIMB_BITS;
        let src = self.limbs();
        if limb_shift >= src.len() {
            return BigNum::zero();
        }

        let mut limbs = vec![0u64; src.len() - limb_shift];
        for (i, out) in limbs.iter_mut().enumerate() {
            let lo = src[i + limb_shift] >> bit_shift;
            let hi = if bit_shift > 0 && i + limb_shift + 1 < src.len() {
                src[i + limb_shift + 1] << (LIMB_BITS - bit_shift)
            } else {
                0
            };
            *out = lo | hi;
        }
        let mut bn = BigNum::from_limbs(limbs);
        bn.set_negative(self.is_negative());
        bn.normalize();
        bn
    }

    /// Left shift of the magnitude by `bits`. Sign is preserved.
    pub fn shl(&self, bits: usize) -> BigNum {
        let limb_shift = bits / LIMB_BITS;
        let bit_shift = bits % LIMB_BITS;
        let src = self.limbs();

        let mut limbs = vec![0u64; src.len() + limb_shift + 1];
        for (i, &limb) in src.iter().enumerate() {
            limbs[i + limb_shift] |= limb << bit_shift;
            if bit_shift > 0 {
                limbs[i + limb_shift + 1] |= limb >> (LIMB_BITS - bit_shift);
            }
        }
        let mut bn = BigNum::from_limbs(limbs);
        bn.set_negative(self.is_negative());
        bn.normalize();
        bn
    }

    /// Number of trailing zero bits (0 for zero).
    pub fn trailing_zeros(&self) -> usize {
        for (i, &limb) in self.limbs().iter().enumerate() {
            if limb != 0 {
                return i * LIMB_BITS + limb.trailing_zeros() as usize;
            }
        }
        0
    }

    /// Compare absolute values.
    pub fn cmp_abs(&self, other: &BigNum) -> Ordering {
        cmp_limbs(self.limbs(), other.limbs())
    }
}

fn cmp_limbs(a: &[Limb], b: &[Limb]) -> Ordering {
    let max_len = a.len().max(b.len());
    for i in (0..max_len).rev() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        if av != bv {
            return av.cmp(&bv);
        }
    }
    Ordering::Equal
}

/// Add two unsigned limb arrays.
fn add_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    let max_len = a.len().max(b.len());
    let mut limbs = vec![0u64; max_len + 1];
    let mut carry: u64 = 0;

    for (i, out) in limbs.iter_mut().take(max_len).enumerate() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        let sum = av as DoubleLimb + bv as DoubleLimb + carry as DoubleLimb;
        *out = sum as Limb;
        carry = (sum >> LIMB_BITS) as u64;
    }
    limbs[max_len] = carry;

    BigNum::from_limbs(limbs)
}

/// Subtract unsigned magnitudes: a - b, negative if b > a.
fn sub_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    let (larger, smaller, negative) = match cmp_limbs(a, b) {
        Ordering::Less => (b, a, true),
        Ordering::Equal => return BigNum::zero(),
        Ordering::Greater => (a, b, false),
    };

    let mut limbs = vec![0u64; larger.len()];
    let mut borrow: u64 = 0;

    for (i, out) in limbs.iter_mut().enumerate() {
        let sv = smaller.get(i).copied().unwrap_or(0);
        let (diff, b1) = larger[i].overflowing_sub(sv);
        let (diff2, b2) = diff.overflowing_sub(borrow);
        *out = diff2;
        borrow = (b1 as u64) + (b2 as u64);
    }

    let mut bn = BigNum::from_limbs(limbs);
    bn.set_negative(negative);
    bn
}

/// Schoolbook multiplication of two unsigned limb arrays.
fn mul_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    if a.iter().all(|&l| l == 0) || b.iter().all(|&l| l == 0) {
        return BigNum::zero();
    }

    let mut limbs = vec![0u64; a.len() + b.len()];

    for (i, &av) in a.iter().enumerate() {
        let mut carry: u64 = 0;
        for (j, &bv) in b.iter().enumerate() {
            let prod = av as DoubleLimb * bv as DoubleLimb
                + limbs[i + j] as DoubleLimb
                + carry as DoubleLimb;
            limbs[i + j] = prod as Limb;
            carry = (prod >> LIMB_BITS) as u64;
        }
        limbs[i + b.len()] = carry;
    }

    BigNum::from_limbs(limbs)
}

/// Binary long division for unsigned values.
fn div_rem_unsigned(a: &[Limb], b: &[Limb]) -> (BigNum, BigNum) {
    let dividend = BigNum::from_limbs(a.to_vec());
    let divisor = BigNum::from_limbs(b.to_vec());

    if dividend.cmp_abs(&divisor) == Ordering::Less {
        return (BigNum::zero(), dividend);
    }

    // Single-limb fast path.
    if let (Some(x), Some(y)) = (dividend.to_u64(), divisor.to_u64()) {
        return (BigNum::from_u64(x / y), BigNum::from_u64(x % y));
    }

    let bits = dividend.bit_len();
    let mut quotient = vec![0u64; bits.div_ceil(LIMB_BITS)];
    let mut remainder = BigNum::zero();

    for i in (0..bits).rev() {
        remainder = remainder.shl(1);
        if dividend.get_bit(i) == 1 {
            remainder.limbs_mut()[0] |= 1;
        }

        if remainder.cmp_abs(&divisor) != Ordering::Less {
            remainder = sub_unsigned(remainder.limbs(), divisor.limbs());
            quotient[i / LIMB_BITS] |= 1u64 << (i % LIMB_BITS);
        }
    }

    (BigNum::from_limbs(quotient), remainder)
}
