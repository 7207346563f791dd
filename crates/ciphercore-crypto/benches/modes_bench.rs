//! Mode engine benchmarks.
//!
//! Run with: cargo bench -p ciphercore-crypto

use std::sync::Arc;

use ciphercore_crypto::aes::AesKey;
use ciphercore_crypto::modes::perform_cipher;
use ciphercore_crypto::shacal1::Shacal1Key;
use ciphercore_crypto::BlockCipher;
use ciphercore_types::{CipherDirection, CipherMode, PaddingMode};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const DATA_LEN: usize = 64 * 1024;

fn bench_aes_modes(c: &mut Criterion) {
    let cipher: Arc<dyn BlockCipher> = Arc::new(AesKey::new(&[0x2b; 16]).unwrap());
    let iv = [0u8; 16];
    let data = vec![0x5au8; DATA_LEN];

    let mut group = c.benchmark_group("aes128");
    group.throughput(Throughput::Bytes(DATA_LEN as u64));

    for mode in [CipherMode::Ecb, CipherMode::Cbc, CipherMode::Ctr] {
        for parallelism in [1, 4, 16] {
            group.bench_with_input(
                BenchmarkId::new(format!("{}-encrypt", mode.name()), parallelism),
                &parallelism,
                |bench, &parallelism| {
                    bench.iter(|| {
                        let mut buf = data.clone();
                        perform_cipher(
                            cipher.clone(),
                            parallelism,
                            mode,
                            PaddingMode::Pkcs7,
                            &mut buf,
                            CipherDirection::Encrypt,
                            Some(&iv),
                        )
                        .unwrap();
                        buf
                    });
                },
            );
        }
    }

    // CBC decryption is the parallel direction.
    let mut ct = data.clone();
    perform_cipher(
        cipher.clone(),
        1,
        CipherMode::Cbc,
        PaddingMode::Pkcs7,
        &mut ct,
        CipherDirection::Encrypt,
        Some(&iv),
    )
    .unwrap();
    for parallelism in [1, 4, 16] {
        group.bench_with_input(
            BenchmarkId::new("cbc-decrypt", parallelism),
            &parallelism,
            |bench, &parallelism| {
                bench.iter(|| {
                    let mut buf = ct.clone();
                    perform_cipher(
                        cipher.clone(),
                        parallelism,
                        CipherMode::Cbc,
                        PaddingMode::Pkcs7,
                        &mut buf,
                        CipherDirection::Decrypt,
                        Some(&iv),
                    )
                    .unwrap();
                    buf
                });
            },
        );
    }

    group.finish();
}

fn bench_shacal1(c: &mut Criterion) {
    let cipher: Arc<dyn BlockCipher> = Arc::new(Shacal1Key::new(&[0x17; 64]).unwrap());
    let iv = [0u8; 20];
    let data = vec![0xa5u8; DATA_LEN];

    let mut group = c.benchmark_group("shacal1");
    group.throughput(Throughput::Bytes(DATA_LEN as u64));
    group.bench_function("ctr-encrypt", |bench| {
        bench.iter(|| {
            let mut buf = data.clone();
            perform_cipher(
                cipher.clone(),
                8,
                CipherMode::Ctr,
                PaddingMode::Zeros,
                &mut buf,
                CipherDirection::Encrypt,
                Some(&iv),
            )
            .unwrap();
            buf
        });
    });
    group.finish();
}

criterion_group!(benches, bench_aes_modes, bench_shacal1);
criterion_main!(benches);
