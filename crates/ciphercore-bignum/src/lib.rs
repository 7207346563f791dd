#![forbid(unsafe_code)]
#![doc = "Big number arithmetic and probabilistic primality testing for ciphercore."]

mod bignum;
mod gcd;
mod ops;
mod prime;
mod rand;

pub use bignum::BigNum;
pub use prime::{
    generate_prime, iterations_for, tester, FermatTest, MillerRabinTest, PrimalityTest,
    SolovayStrassenTest,
};
