#![no_main]
use std::sync::Arc;

use ciphercore_crypto::aes::AesKey;
use ciphercore_crypto::modes::{perform_cipher_with, CipherConfig, PaddingCheck};
use ciphercore_crypto::BlockCipher;
use ciphercore_types::{CipherDirection, CipherMode, PaddingMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let modes = [
        CipherMode::Ecb,
        CipherMode::Cbc,
        CipherMode::Pcbc,
        CipherMode::Cfb,
        CipherMode::Ofb,
        CipherMode::Ctr,
    ];
    let mode = modes[(selector & 0x07) as usize % modes.len()];
    let padding = PaddingMode::ALL[((selector >> 3) & 0x03) as usize];
    let check = if selector & 0x20 != 0 {
        PaddingCheck::Strict
    } else {
        PaddingCheck::Lenient
    };
    let parallelism = 1 + ((selector >> 6) as usize) * 3;

    let cipher: Arc<dyn BlockCipher> = match AesKey::new(&[0x5a; 16]) {
        Ok(key) => Arc::new(key),
        Err(_) => return,
    };
    let config = CipherConfig::new(mode, padding, parallelism).with_padding_check(check);
    let mut buf = rest.to_vec();
    let _ = perform_cipher_with(cipher, &config, &mut buf, CipherDirection::Decrypt, Some(&[0u8; 16]));
});
