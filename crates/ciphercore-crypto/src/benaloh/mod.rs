//! Benaloh additively homomorphic encryption.
//!
//! Messages live in Z_r. The public key is (n, y, r) with n = p * q, where
//! r divides p - 1 but neither (p - 1) / r nor q - 1. Encryption computes
//! `c = y^m * u^r mod n` for a random unit u; multiplying two ciphertexts
//! adds their messages mod r.
//!
//! Decryption raises c to phi / r, which strips the `u^r` blinding, and then
//! finds the discrete log of the result to base `x = y^(phi / r)` by linear
//! search. Only small r are practical.

use ciphercore_bignum::{BigNum, PrimalityTest};
use ciphercore_types::CryptoError;

/// Candidate steps tried before a prime search gives up.
const MAX_PRIME_STEPS: usize = 1 << 16;
/// Random draws tried before a unit search gives up.
const MAX_RANDOM_DRAWS: usize = 1000;

/// A Benaloh key pair.
pub struct BenalohKeyPair {
    /// Public modulus n = p * q.
    n: BigNum,
    /// Public base y.
    y: BigNum,
    /// Message space size.
    r: BigNum,
    /// phi / r, the decryption exponent.
    phi_over_r: BigNum,
    /// y^(phi / r) mod n, a generator of the r-th roots of unity.
    x: BigNum,
    /// r as a machine word, bounding the decryption search.
    r_word: u64,
}

impl BenalohKeyPair {
    /// Generate a key pair whose primes have about `bits` bits each, accepted
    /// by `test` with at least `min_probability`.
    ///
    /// `r` should be prime (or at least such that y^(phi/r) has order r);
    /// it must fit in a `u64` and be well below 2^bits.
    pub fn generate(
        test: &dyn PrimalityTest,
        min_probability: f64,
        bits: usize,
        r: &BigNum,
    ) -> Result<Self, CryptoError> {
        check_r(r)?;
        if bits < r.bit_len() + 2 {
            return Err(CryptoError::InvalidArg);
        }

        let p = prime_p(test, min_probability, bits, r)?;
        let q = prime_q(test, min_probability, bits, r, &p)?;
        tracing::debug!(bits, r = %r, "benaloh primes found");
        Self::from_primes(&p, &q, r)
    }

    /// Build a key pair from known primes.
    ///
    /// Fails with `InvalidArg` if `p` and `q` do not satisfy the divisibility
    /// conditions on r.
    pub fn from_primes(p: &BigNum, q: &BigNum, r: &BigNum) -> Result<Self, CryptoError> {
        let r_word = check_r(r)?;
        let one = BigNum::one();
        let p1 = p.sub(&one);
        let q1 = q.sub(&one);
        if p == q || !valid_p(p, r)? || !r.gcd(&q1)?.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        let n = p.mul(q);
        let (phi_over_r, _) = p1.mul(&q1).div_rem(r)?;

        for _ in 0..MAX_RANDOM_DRAWS {
            let y = BigNum::random_range(&n)?;
            if !y.gcd(&n)?.is_one() {
                continue;
            }
            let x = y.mod_exp(&phi_over_r, &n)?;
            if x.is_one() {
                continue;
            }
            return Ok(Self {
                n,
                y,
                r: r.clone(),
                phi_over_r,
                x,
                r_word,
            });
        }
        Err(CryptoError::BnRandGenFail)
    }

    /// The public modulus n.
    pub fn modulus(&self) -> &BigNum {
        &self.n
    }

    /// The public base y.
    pub fn base(&self) -> &BigNum {
        &self.y
    }

    /// The message space size r.
    pub fn block_size(&self) -> &BigNum {
        &self.r
    }

    /// Encrypt `m`, which must be smaller than r.
    pub fn encrypt(&self, m: &BigNum) -> Result<BigNum, CryptoError> {
        if m.is_negative() || *m >= self.r {
            return Err(CryptoError::BenalohMessageTooLarge);
        }
        let u = self.random_unit()?;
        let ym = self.y.mod_exp(m, &self.n)?;
        let ur = u.mod_exp(&self.r, &self.n)?;
        ym.mod_mul(&ur, &self.n)
    }

    /// Recover the message of `c`.
    pub fn decrypt(&self, c: &BigNum) -> Result<BigNum, CryptoError> {
        let a = c.mod_reduce(&self.n)?.mod_exp(&self.phi_over_r, &self.n)?;
        let mut power = BigNum::one();
        for i in 0..self.r_word {
            if power == a {
                return Ok(BigNum::from_u64(i));
            }
            power = power.mod_mul(&self.x, &self.n)?;
        }
        Err(CryptoError::BenalohDecryptFail)
    }

    /// E(m1) * E(m2) = E(m1 + m2 mod r).
    pub fn add_ciphertexts(&self, c1: &BigNum, c2: &BigNum) -> Result<BigNum, CryptoError> {
        c1.mod_mul(c2, &self.n)
    }

    /// Uniform u in [2, n - 1) with gcd(u, n) = 1.
    fn random_unit(&self) -> Result<BigNum, CryptoError> {
        let low = BigNum::from_u64(2);
        let high = self.n.sub(&BigNum::one());
        for _ in 0..MAX_RANDOM_DRAWS {
            let u = BigNum::random_between(&low, &high)?;
            if u.gcd(&self.n)?.is_one() {
                return Ok(u);
            }
        }
        Err(CryptoError::BnRandGenFail)
    }
}

fn check_r(r: &BigNum) -> Result<u64, CryptoError> {
    match r.to_u64() {
        Some(w) if w >= 2 && !r.is_negative() => Ok(w),
        _ => Err(CryptoError::InvalidArg),
    }
}

/// r | p - 1 and gcd(r, (p - 1) / r) = 1.
fn valid_p(p: &BigNum, r: &BigNum) -> Result<bool, CryptoError> {
    let (k, rem) = p.sub(&BigNum::one()).div_rem(r)?;
    Ok(rem.is_zero() && !k.is_zero() && r.gcd(&k)?.is_one())
}

/// Walk p = k * r + 1 upwards from a random start until it is prime and
/// `valid_p` holds. Steps of 2r keep p odd.
fn prime_p(
    test: &dyn PrimalityTest,
    epsilon: f64,
    bits: usize,
    r: &BigNum,
) -> Result<BigNum, CryptoError> {
    let one = BigNum::one();
    let start = BigNum::random(bits, true)?;
    let (_, rem) = start.sub(&one).div_rem(r)?;
    let mut p = start.sub(&rem);
    if p <= *r {
        p = p.add(r);
    }
    if p.is_even() {
        p = p.add(r);
    }
    let step = r.add(r);

    for _ in 0..MAX_PRIME_STEPS {
        if valid_p(&p, r)? && test.check_primality(&p, epsilon)? {
            return Ok(p);
        }
        p = p.add(&step);
    }
    Err(CryptoError::BnPrimeGenFail)
}

/// Walk odd q upwards from a random start until it is a prime other than p
/// with gcd(r, q - 1) = 1.
fn prime_q(
    test: &dyn PrimalityTest,
    epsilon: f64,
    bits: usize,
    r: &BigNum,
    p: &BigNum,
) -> Result<BigNum, CryptoError> {
    let one = BigNum::one();
    let two = BigNum::from_u64(2);
    let mut q = BigNum::random(bits, true)?;

    for _ in 0..MAX_PRIME_STEPS {
        if q != *p && r.gcd(&q.sub(&one))?.is_one() && test.check_primality(&q, epsilon)? {
            return Ok(q);
        }
        q = q.add(&two);
    }
    Err(CryptoError::BnPrimeGenFail)
}
