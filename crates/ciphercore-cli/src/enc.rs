//! Block cipher mode encryption/decryption command.
//!
//! Streams the input file through the asynchronous mode engine. Ctrl-C
//! cancels the run and leaves a partial output file.

use std::path::Path;
use std::sync::Arc;

use ciphercore_crypto::aes::AesKey;
use ciphercore_crypto::modes::{perform_cipher_async, CancellationToken, CipherConfig, PaddingCheck};
use ciphercore_crypto::shacal1::Shacal1Key;
use ciphercore_crypto::BlockCipher;
use ciphercore_types::{BlockCipherId, CipherDirection, CipherMode, PaddingMode};

pub struct EncArgs<'a> {
    pub cipher: &'a str,
    pub mode: &'a str,
    pub padding: &'a str,
    pub threads: Option<usize>,
    pub key: &'a str,
    pub iv: Option<&'a str>,
    pub decrypt: bool,
    pub strict_padding: bool,
    pub input: &'a str,
    pub output: &'a str,
}

pub fn run(args: &EncArgs<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let op = if args.decrypt { "Decrypting" } else { "Encrypting" };
    eprintln!(
        "{op} {} -> {} with {}-{}",
        args.input, args.output, args.cipher, args.mode
    );

    let cipher = build_cipher(args.cipher, &hex_decode(args.key)?)?;
    let config = build_config(args)?;
    let direction = if args.decrypt {
        CipherDirection::Decrypt
    } else {
        CipherDirection::Encrypt
    };

    let iv = match args.iv {
        Some(hex) => Some(hex_decode(hex)?),
        None if !args.decrypt && config.mode.requires_iv() => {
            let mut iv = vec![0u8; cipher.block_size()];
            getrandom::getrandom(&mut iv).map_err(|e| format!("random failed: {e}"))?;
            eprintln!("IV (save this): {}", hex_encode(&iv));
            Some(iv)
        }
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let written = runtime.block_on(async {
        let token = CancellationToken::new();
        let watcher = {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            })
        };
        let result = perform_cipher_async(
            cipher,
            &config,
            direction,
            iv.as_deref(),
            Path::new(args.input),
            Path::new(args.output),
            &token,
        )
        .await;
        watcher.abort();
        result
    })?;

    eprintln!("Wrote {written} bytes");
    Ok(())
}

fn build_cipher(name: &str, key: &[u8]) -> Result<Arc<dyn BlockCipher>, Box<dyn std::error::Error>> {
    let cipher: Arc<dyn BlockCipher> = match name.parse::<BlockCipherId>()? {
        BlockCipherId::Aes => Arc::new(AesKey::new(key)?),
        BlockCipherId::Shacal1 => Arc::new(Shacal1Key::new(key)?),
    };
    Ok(cipher)
}

fn build_config(args: &EncArgs<'_>) -> Result<CipherConfig, Box<dyn std::error::Error>> {
    let mut config = CipherConfig::default()
        .with_mode(args.mode.parse::<CipherMode>()?)
        .with_padding(args.padding.parse::<PaddingMode>()?);
    if let Some(threads) = args.threads {
        config = config.with_parallelism(threads);
    }
    if args.strict_padding {
        config = config.with_padding_check(PaddingCheck::Strict);
    }
    Ok(config)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err("hex string must have even length".into());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at position {i}").into())
        })
        .collect()
}
