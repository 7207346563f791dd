//! Probabilistic primality tests and random prime generation.
//!
//! Each test repeats a randomized round whose false-positive rate on a
//! composite input is bounded by a per-test constant `q`. Given a minimum
//! acceptable probability `epsilon` that a "prime" verdict is correct, the
//! number of rounds is the smallest `k` with `1 - q^k > epsilon`.

use crate::bignum::BigNum;
use ciphercore_types::{CryptoError, PrimalityTestId};

/// Small primes used for trial division while searching for primes.
const SMALL_PRIMES: [u64; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

/// A randomized primality test.
pub trait PrimalityTest: Send + Sync {
    /// Which test this is.
    fn id(&self) -> PrimalityTestId;

    /// Upper bound on the chance that one round passes a composite.
    fn round_error(&self) -> f64;

    /// One round against a random witness. `n` is odd and at least 5.
    fn round(&self, n: &BigNum) -> Result<bool, CryptoError>;

    /// Decide whether `value` is prime with probability greater than `epsilon`.
    ///
    /// `value` must be positive and `epsilon` must lie in (0, 1).
    fn check_primality(&self, value: &BigNum, epsilon: f64) -> Result<bool, CryptoError> {
        if value.is_negative() || value.is_zero() {
            return Err(CryptoError::InvalidArg);
        }
        let rounds = iterations_for(epsilon, self.round_error())?;

        match value.to_u64() {
            Some(1) => return Ok(false),
            Some(2) | Some(3) => return Ok(true),
            _ => {}
        }
        if value.is_even() {
            return Ok(false);
        }

        for _ in 0..rounds {
            if !self.round(value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Number of rounds needed so that `1 - round_error^k > epsilon`.
pub fn iterations_for(epsilon: f64, round_error: f64) -> Result<u32, CryptoError> {
    if !(epsilon > 0.0 && epsilon < 1.0) {
        return Err(CryptoError::InvalidProbability(epsilon));
    }
    let mut k = 1u32;
    while epsilon >= 1.0 - round_error.powi(k as i32) {
        k += 1;
    }
    Ok(k)
}

/// Build the tester for `id`.
pub fn tester(id: PrimalityTestId) -> Box<dyn PrimalityTest> {
    match id {
        PrimalityTestId::Fermat => Box::new(FermatTest),
        PrimalityTestId::SolovayStrassen => Box::new(SolovayStrassenTest),
        PrimalityTestId::MillerRabin => Box::new(MillerRabinTest),
    }
}

/// Uniform witness in [2, n - 1).
fn witness(n: &BigNum) -> Result<BigNum, CryptoError> {
    BigNum::random_between(&BigNum::from_u64(2), &n.sub(&BigNum::one()))
}

/// Fermat test: a^(n-1) = 1 (mod n).
#[derive(Debug, Clone, Copy, Default)]
pub struct FermatTest;

impl PrimalityTest for FermatTest {
    fn id(&self) -> PrimalityTestId {
        PrimalityTestId::Fermat
    }

    fn round_error(&self) -> f64 {
        0.5
    }

    fn round(&self, n: &BigNum) -> Result<bool, CryptoError> {
        let a = witness(n)?;
        Ok(a.mod_exp(&n.sub(&BigNum::one()), n)?.is_one())
    }
}

/// Solovay–Strassen test: a^((n-1)/2) = (a/n) (mod n).
#[derive(Debug, Clone, Copy, Default)]
pub struct SolovayStrassenTest;

impl PrimalityTest for SolovayStrassenTest {
    fn id(&self) -> PrimalityTestId {
        PrimalityTestId::SolovayStrassen
    }

    fn round_error(&self) -> f64 {
        0.5
    }

    fn round(&self, n: &BigNum) -> Result<bool, CryptoError> {
        let a = witness(n)?;
        if !a.gcd(n)?.is_one() {
            return Ok(false);
        }

        let n_minus_one = n.sub(&BigNum::one());
        let euler = a.mod_exp(&n_minus_one.shr(1), n)?;
        let expected = match a.jacobi(n)? {
            1 => BigNum::one(),
            -1 => n_minus_one,
            _ => return Ok(false),
        };
        Ok(euler == expected)
    }
}

/// Miller–Rabin strong pseudoprime test.
#[derive(Debug, Clone, Copy, Default)]
pub struct MillerRabinTest;

impl PrimalityTest for MillerRabinTest {
    fn id(&self) -> PrimalityTestId {
        PrimalityTestId::MillerRabin
    }

    fn round_error(&self) -> f64 {
        0.25
    }

    fn round(&self, n: &BigNum) -> Result<bool, CryptoError> {
        let n_minus_one = n.sub(&BigNum::one());
        // n - 1 = 2^s * d with d odd
        let s = n_minus_one.trailing_zeros();
        let d = n_minus_one.shr(s);

        let a = witness(n)?;
        let mut x = a.mod_exp(&d, n)?;
        if x.is_one() || x == n_minus_one {
            return Ok(true);
        }
        for _ in 1..s {
            x = x.mod_mul(&x, n)?;
            if x == n_minus_one {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Search for a random `bits`-bit prime accepted by `test` with probability `epsilon`.
pub fn generate_prime(
    bits: usize,
    test: &dyn PrimalityTest,
    epsilon: f64,
) -> Result<BigNum, CryptoError> {
    if bits < 2 {
        return Err(CryptoError::InvalidArg);
    }
    // Validate up front so a bad epsilon does not surface as a search failure.
    iterations_for(epsilon, test.round_error())?;

    let max_attempts = 100 * bits.max(16);
    'search: for _ in 0..max_attempts {
        let candidate = BigNum::random(bits, true)?;
        for &p in &SMALL_PRIMES {
            let p_bn = BigNum::from_u64(p);
            if candidate == p_bn {
                return Ok(candidate);
            }
            let (_, rem) = candidate.div_rem(&p_bn)?;
            if rem.is_zero() {
                continue 'search;
            }
        }
        if test.check_primality(&candidate, epsilon)? {
            return Ok(candidate);
        }
    }
    Err(CryptoError::BnPrimeGenFail)
}
