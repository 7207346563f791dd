//! Benaloh key generation and round-trip demonstration command.

use ciphercore_bignum::{tester, BigNum};
use ciphercore_crypto::benaloh::BenalohKeyPair;
use ciphercore_types::PrimalityTestId;

pub fn run(
    test: &str,
    probability: f64,
    bits: usize,
    r: &str,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let id: PrimalityTestId = test.parse()?;
    let r = BigNum::from_dec_str(r)?;
    let m = BigNum::from_dec_str(message)?;

    eprintln!("Generating Benaloh key ({bits}-bit primes, r = {r}, {})", id.name());
    let kp = BenalohKeyPair::generate(tester(id).as_ref(), probability, bits, &r)?;
    println!("n = {}", kp.modulus());
    println!("y = {}", kp.base());

    let c = kp.encrypt(&m)?;
    let back = kp.decrypt(&c)?;
    println!("m = {m}");
    println!("c = {c}");
    println!("D(c) = {back}");
    if back != m {
        return Err("decrypted message does not match".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benaloh_command() {
        run("miller-rabin", 0.99, 32, "257", "200").unwrap();
    }

    #[test]
    fn test_benaloh_command_rejects_large_message() {
        assert!(run("miller-rabin", 0.99, 32, "257", "257").is_err());
        assert!(run("miller-rabin", 0.99, 32, "two", "1").is_err());
    }
}
