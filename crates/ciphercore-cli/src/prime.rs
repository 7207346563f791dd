//! Probabilistic primality check command.

use ciphercore_bignum::{iterations_for, tester, BigNum};
use ciphercore_types::PrimalityTestId;

pub fn run(test: &str, probability: f64, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let verdict = check(test, probability, value)?;
    println!("{value}: {verdict}");
    Ok(())
}

fn check(test: &str, probability: f64, value: &str) -> Result<String, Box<dyn std::error::Error>> {
    let id: PrimalityTestId = test.parse()?;
    let n = BigNum::from_dec_str(value)?;
    let tester = tester(id);
    let rounds = iterations_for(probability, tester.round_error())?;
    tracing::debug!(test = id.name(), rounds, "primality check");

    let verdict = if tester.check_primality(&n, probability)? {
        format!("probably prime ({}, {rounds} rounds)", id.name())
    } else {
        "composite".to_string()
    };
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_verdicts() {
        assert!(check("miller-rabin", 0.999, "1000000007")
            .unwrap()
            .starts_with("probably prime"));
        assert_eq!(check("solovay-strassen", 0.99, "561").unwrap(), "composite");
        assert_eq!(check("fermat", 0.9, "1").unwrap(), "composite");
    }

    #[test]
    fn test_prime_bad_input() {
        assert!(check("aks", 0.9, "7").is_err());
        assert!(check("fermat", 1.5, "7").is_err());
        assert!(check("fermat", 0.9, "seven").is_err());
        assert!(check("fermat", 0.9, "0").is_err());
    }
}
