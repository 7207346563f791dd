#![forbid(unsafe_code)]
#![doc = "Block cipher cores, a parallel mode-of-operation engine and the Benaloh cryptosystem."]

// Core traits
pub mod provider;

// Block ciphers
#[cfg(feature = "aes")]
pub mod aes;
#[cfg(feature = "shacal1")]
pub mod shacal1;

// Modes of operation
#[cfg(feature = "modes")]
pub mod modes;

// Asymmetric algorithms
#[cfg(feature = "benaloh")]
pub mod benaloh;

pub use provider::BlockCipher;
