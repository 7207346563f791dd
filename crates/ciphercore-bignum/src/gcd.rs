//! GCD, modular inverse and the Jacobi symbol.

use crate::bignum::BigNum;
use ciphercore_types::CryptoError;

impl BigNum {
    /// Greatest common divisor of |self| and |other| (Euclidean algorithm).
    pub fn gcd(&self, other: &BigNum) -> Result<BigNum, CryptoError> {
        if self.is_zero() && other.is_zero() {
            return Err(CryptoError::InvalidArg);
        }

        let mut a = self.abs();
        let mut b = other.abs();
        if a < b {
            std::mem::swap(&mut a, &mut b);
        }

        while !b.is_zero() {
            let (_, rem) = a.div_rem(&b)?;
            a = b;
            b = rem;
        }
        Ok(a)
    }

    /// Compute the modular inverse: self^(-1) mod modulus.
    ///
    /// Returns `Err(BnNoInverse)` if gcd(self, modulus) != 1.
    pub fn mod_inv(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_zero() || modulus.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        let mut old_r = self.mod_reduce(modulus)?;
        if old_r.is_zero() {
            return Err(CryptoError::BnNoInverse);
        }
        let mut r = modulus.abs();
        let mut old_s = BigNum::one();
        let mut s = BigNum::zero();

        // Invariant: old_r = old_s * self (mod modulus)
        while !r.is_zero() {
            let (quotient, remainder) = old_r.div_rem(&r)?;
            old_r = r;
            r = remainder;

            let new_s = old_s.sub(&quotient.mul(&s));
            old_s = s;
            s = new_s;
        }

        if !old_r.is_one() {
            return Err(CryptoError::BnNoInverse);
        }
        old_s.mod_reduce(modulus)
    }

    /// Jacobi symbol (self / n) for odd positive `n`, returned as -1, 0 or 1.
    pub fn jacobi(&self, n: &BigNum) -> Result<i8, CryptoError> {
        if n.is_negative() || n.is_zero() || n.is_even() {
            return Err(CryptoError::InvalidArg);
        }

        let mut a = self.mod_reduce(n)?;
        let mut n = n.clone();
        let mut t: i8 = 1;

        while !a.is_zero() {
            let twos = a.trailing_zeros();
            a = a.shr(twos);
            // (2/n) = -1 exactly when n = 3, 5 (mod 8)
            let n_mod_8 = n.limbs()[0] & 7;
            if twos % 2 == 1 && (n_mod_8 == 3 || n_mod_8 == 5) {
                t = -t;
            }

            std::mem::swap(&mut a, &mut n);
            if a.limbs()[0] & 3 == 3 && n.limbs()[0] & 3 == 3 {
                t = -t;
            }
            a = a.mod_reduce(&n)?;
        }

        Ok(if n.is_one() { t } else { 0 })
    }
}
