//! Integration tests for ciphercore.
//! Cross-crate roundtrip and interoperability tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ciphercore_bignum::{generate_prime, tester, BigNum};
    use ciphercore_crypto::aes::AesKey;
    use ciphercore_crypto::benaloh::BenalohKeyPair;
    use ciphercore_crypto::modes::{
        perform_cipher, perform_cipher_async, perform_cipher_with, CancellationToken, CipherConfig,
    };
    use ciphercore_crypto::shacal1::Shacal1Key;
    use ciphercore_crypto::BlockCipher;
    use ciphercore_types::{
        CipherDirection, CipherMode, CryptoError, PaddingMode, PrimalityTestId,
    };

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    const MODES: [CipherMode; 6] = [
        CipherMode::Ecb,
        CipherMode::Cbc,
        CipherMode::Pcbc,
        CipherMode::Cfb,
        CipherMode::Ofb,
        CipherMode::Ctr,
    ];

    // -------------------------------------------------------
    // 1. AES-256 CBC known answer through the engine
    // -------------------------------------------------------
    #[test]
    fn test_aes256_cbc_known_answer() {
        // NIST SP 800-38A F.2.5
        let key = hex("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4");
        let iv = hex("000102030405060708090a0b0c0d0e0f");
        let plain = hex(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51\
             30c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710",
        );
        let expected = hex(
            "f58c4c04d6e5f1ba779eabfb5f7bfbd69cfc4e967edb808d679f777bc6702c7d\
             39f23369a9d9bacfa530e26304231461b2eb05e2c39be9fcda6c19078c6a9d1b",
        );
        let cipher: Arc<dyn BlockCipher> = Arc::new(AesKey::new(&key).unwrap());

        for parallelism in [1, 3, 4] {
            let mut data = plain.clone();
            perform_cipher(
                cipher.clone(),
                parallelism,
                CipherMode::Cbc,
                PaddingMode::Pkcs7,
                &mut data,
                CipherDirection::Encrypt,
                Some(&iv),
            )
            .unwrap();
            // Aligned input gains one whole padding block.
            assert_eq!(data.len(), 80);
            assert_eq!(data[..64], expected[..]);

            perform_cipher(
                cipher.clone(),
                parallelism,
                CipherMode::Cbc,
                PaddingMode::Pkcs7,
                &mut data,
                CipherDirection::Decrypt,
                Some(&iv),
            )
            .unwrap();
            assert_eq!(data, plain);
        }
    }

    // -------------------------------------------------------
    // 2. SHACAL-1 (20-byte blocks) through every mode and padding
    // -------------------------------------------------------
    #[test]
    fn test_shacal1_all_modes_roundtrip() {
        let cipher: Arc<dyn BlockCipher> = Arc::new(Shacal1Key::new(&[0x3c; 32]).unwrap());
        let iv = [0xa5u8; 20];
        let plain: Vec<u8> = (1..=117u8).collect();

        for mode in MODES {
            for padding in PaddingMode::ALL {
                let config = CipherConfig::new(mode, padding, 4);
                let mut data = plain.clone();
                perform_cipher_with(cipher.clone(), &config, &mut data, CipherDirection::Encrypt, Some(&iv))
                    .unwrap();
                assert_eq!(data.len(), 120);
                assert_ne!(data[..20], plain[..20]);
                perform_cipher_with(cipher.clone(), &config, &mut data, CipherDirection::Decrypt, Some(&iv))
                    .unwrap();
                assert_eq!(data, plain, "{mode:?} {padding:?}");
            }
        }
    }

    // -------------------------------------------------------
    // 3. Different ciphers, same engine, different ciphertexts
    // -------------------------------------------------------
    #[test]
    fn test_cipher_swap_changes_output() {
        let aes: Arc<dyn BlockCipher> = Arc::new(AesKey::new(&[7u8; 16]).unwrap());
        let shacal: Arc<dyn BlockCipher> = Arc::new(Shacal1Key::new(&[7u8; 16]).unwrap());
        let mut a = vec![0u8; 60];
        let mut s = vec![0u8; 60];
        perform_cipher(aes, 2, CipherMode::Ctr, PaddingMode::Zeros, &mut a, CipherDirection::Encrypt, Some(&[0; 16]))
            .unwrap();
        perform_cipher(shacal, 2, CipherMode::Ctr, PaddingMode::Zeros, &mut s, CipherDirection::Encrypt, Some(&[0; 20]))
            .unwrap();
        // 60 bytes: 3 AES blocks + zero tail block, exactly 3 SHACAL-1 blocks.
        assert_eq!(a.len(), 64);
        assert_eq!(s.len(), 60);
        assert_ne!(a[..60], s[..]);
    }

    // -------------------------------------------------------
    // 4. Benaloh ciphertext carried inside an AES-CTR stream
    // -------------------------------------------------------
    #[test]
    fn test_benaloh_ciphertext_over_aes_ctr() {
        let kp = BenalohKeyPair::from_primes(
            &BigNum::from_u64(1543),
            &BigNum::from_u64(1_000_000_007),
            &BigNum::from_u64(257),
        )
        .unwrap();
        let c1 = kp.encrypt(&BigNum::from_u64(19)).unwrap();
        let c2 = kp.encrypt(&BigNum::from_u64(23)).unwrap();
        let sum = kp.add_ciphertexts(&c1, &c2).unwrap();

        let aes: Arc<dyn BlockCipher> = Arc::new(AesKey::new(&[0x11; 24]).unwrap());
        let iv = [0xfe; 16];
        let mut wire = sum.to_bytes_be();
        let original_len = wire.len();
        perform_cipher(aes.clone(), 4, CipherMode::Ctr, PaddingMode::Pkcs7, &mut wire, CipherDirection::Encrypt, Some(&iv))
            .unwrap();
        perform_cipher(aes, 4, CipherMode::Ctr, PaddingMode::Pkcs7, &mut wire, CipherDirection::Decrypt, Some(&iv))
            .unwrap();
        assert_eq!(wire.len(), original_len);

        let received = BigNum::from_bytes_be(&wire);
        assert_eq!(kp.decrypt(&received).unwrap().to_u64(), Some(42));
    }

    // -------------------------------------------------------
    // 5. Primes from one test pass the others
    // -------------------------------------------------------
    #[test]
    fn test_generated_primes_cross_checked() {
        let ids = [
            PrimalityTestId::Fermat,
            PrimalityTestId::SolovayStrassen,
            PrimalityTestId::MillerRabin,
        ];
        for id in ids {
            let p = generate_prime(64, tester(id).as_ref(), 0.999).unwrap();
            assert_eq!(p.bit_len(), 64);
            for other in ids {
                assert!(tester(other).check_primality(&p, 0.999).unwrap(), "{id:?} -> {other:?}");
            }
        }
    }

    // -------------------------------------------------------
    // 6. Errors surface with the same variants across crates
    // -------------------------------------------------------
    #[test]
    fn test_error_variants() {
        let aes: Arc<dyn BlockCipher> = Arc::new(AesKey::new(&[0u8; 16]).unwrap());
        let mut data = vec![1u8; 16];
        let err = perform_cipher(aes, 1, CipherMode::Cfb, PaddingMode::Pkcs7, &mut data, CipherDirection::Encrypt, Some(&[0; 20]))
            .unwrap_err();
        assert!(matches!(err, CryptoError::InvalidIvLength { expected: 16, got: 20 }));
        assert_eq!(err.to_string(), "invalid iv length: expected 16, got 20");

        assert!(matches!(
            "rot13".parse::<CipherMode>(),
            Err(CryptoError::UnknownAlgorithm(_))
        ));
        assert!(matches!(
            tester(PrimalityTestId::Fermat).check_primality(&BigNum::from_u64(7), 0.0),
            Err(CryptoError::InvalidProbability(_))
        ));
    }

    // -------------------------------------------------------
    // 7. Async file path agrees with the in-memory path
    // -------------------------------------------------------
    #[tokio::test]
    async fn test_async_file_matches_buffer_for_shacal1() {
        let cipher: Arc<dyn BlockCipher> = Arc::new(Shacal1Key::new(&[0x42; 64]).unwrap());
        let iv = [0x01u8; 20];
        let plain: Vec<u8> = (0..1000u32).map(|i| (i % 253) as u8).collect();

        let dir = std::env::temp_dir().join(format!("ciphercore_interop_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let src = dir.join("plain.bin");
        let dst = dir.join("cipher.bin");
        tokio::fs::write(&src, &plain).await.unwrap();

        for mode in MODES {
            let config = CipherConfig::new(mode, PaddingMode::Iso10126, 6);
            perform_cipher_async(
                cipher.clone(),
                &config,
                CipherDirection::Encrypt,
                Some(&iv),
                &src,
                &dst,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

            // ISO 10126 filler is random, so compare by decrypting in memory.
            let mut ct = tokio::fs::read(&dst).await.unwrap();
            assert_eq!(ct.len(), 1020);
            perform_cipher_with(cipher.clone(), &config, &mut ct, CipherDirection::Decrypt, Some(&iv))
                .unwrap();
            assert_eq!(ct, plain, "{mode:?}");
        }

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
