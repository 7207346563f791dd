//! The stream driver: whole buffers and whole files through a mode.
//!
//! Input is cut into batches of `parallelism` blocks. Only the final block of
//! a stream is padded (on encryption) or unpadded (on decryption); every other
//! block passes straight through the [`ModeTransform`].

use std::path::Path;
use std::sync::Arc;

use ciphercore_types::{CipherDirection, CipherMode, CryptoError, PaddingMode};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};

use super::cancel::CancellationToken;
use super::padding::{Padding, PaddingCheck};
use super::{BlockBatch, ChainState, ModeTransform};
use crate::provider::BlockCipher;

/// Everything about a cipher run except the key, IV and data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherConfig {
    pub mode: CipherMode,
    pub padding: PaddingMode,
    /// Blocks per batch, and the number of workers a batch fans out to.
    pub parallelism: usize,
    pub padding_check: PaddingCheck,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            mode: CipherMode::Cbc,
            padding: PaddingMode::Pkcs7,
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            padding_check: PaddingCheck::Lenient,
        }
    }
}

impl CipherConfig {
    pub fn new(mode: CipherMode, padding: PaddingMode, parallelism: usize) -> Self {
        Self {
            mode,
            padding,
            parallelism,
            padding_check: PaddingCheck::default(),
        }
    }

    pub fn with_mode(mut self, mode: CipherMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_padding_check(mut self, check: PaddingCheck) -> Self {
        self.padding_check = check;
        self
    }
}

/// One validated stream: transform, padding, chain and batch arena.
struct Session {
    transform: ModeTransform,
    padding: Padding,
    chain: ChainState,
    batch: BlockBatch,
    direction: CipherDirection,
}

impl Session {
    fn new(
        cipher: Arc<dyn BlockCipher>,
        config: &CipherConfig,
        direction: CipherDirection,
        iv: Option<&[u8]>,
    ) -> Result<Self, CryptoError> {
        let transform = ModeTransform::new(config.mode, cipher, config.parallelism)?;
        let bs = transform.block_size();

        let iv = if config.mode.requires_iv() {
            let iv = iv.ok_or(CryptoError::MissingIv)?;
            if iv.len() != bs {
                return Err(CryptoError::InvalidIvLength {
                    expected: bs,
                    got: iv.len(),
                });
            }
            Some(iv)
        } else {
            None
        };

        let padding = Padding::new(config.padding, bs)?.with_check(config.padding_check);
        Ok(Self {
            padding,
            chain: ChainState::new(iv, bs),
            batch: BlockBatch::new(config.parallelism, bs),
            transform,
            direction,
        })
    }

    fn block_size(&self) -> usize {
        self.transform.block_size()
    }

    /// Bytes covered by one full batch.
    fn span(&self) -> usize {
        self.transform.parallelism() * self.block_size()
    }

    /// Ciphertext must be whole blocks; an empty one only decodes under zero
    /// padding, where encryption of empty input emits nothing.
    fn check_ciphertext_len(&self, len: u64) -> Result<(), CryptoError> {
        let bs = self.block_size() as u64;
        let misaligned = len % bs != 0;
        let empty = len == 0 && self.padding.pads_aligned_input();
        if misaligned || empty {
            return Err(CryptoError::InvalidBlockSize {
                expected: bs as usize,
                got: (len % bs) as usize,
            });
        }
        Ok(())
    }

    /// Pad the plaintext tail so that `data` is a whole number of blocks.
    fn pad_tail(&self, data: &mut Vec<u8>) -> Result<(), CryptoError> {
        let bs = self.block_size();
        let tail = data.len() % bs;
        if tail == 0 && !self.padding.pads_aligned_input() {
            return Ok(());
        }
        let mut last = data.split_off(data.len() - tail);
        self.padding.pad(&mut last, tail)?;
        data.extend_from_slice(&last);
        Ok(())
    }

    /// Drop the padding from the final decrypted block.
    fn unpad_tail(&self, data: &mut Vec<u8>) -> Result<(), CryptoError> {
        let bs = self.block_size();
        if data.len() < bs {
            return Ok(());
        }
        let start = data.len() - bs;
        let mut last = data[start..].to_vec();
        let keep = self.padding.unpad(&mut last, false)?;
        data.truncate(start + keep);
        Ok(())
    }

    fn run(&mut self, data: &mut [u8]) -> Result<(), CryptoError> {
        let span = self.span();
        for (i, chunk) in data.chunks_mut(span).enumerate() {
            self.batch.load(chunk)?;
            self.transform
                .transform(self.direction, &mut self.batch, &mut self.chain)?;
            self.batch.store(chunk);
            tracing::trace!(batch = i, blocks = self.batch.len(), "batch transformed");
        }
        Ok(())
    }

    async fn run_async(
        &mut self,
        data: &mut [u8],
        cancel: &CancellationToken,
    ) -> Result<(), CryptoError> {
        let span = self.span();
        for (i, chunk) in data.chunks_mut(span).enumerate() {
            cancel.check()?;
            self.batch.load(chunk)?;
            self.transform
                .transform_async(self.direction, &mut self.batch, &mut self.chain, cancel)
                .await?;
            self.batch.store(chunk);
            tracing::trace!(batch = i, blocks = self.batch.len(), "batch transformed");
        }
        Ok(())
    }
}

/// Encrypt or decrypt `data` in place.
///
/// Encryption grows the buffer by the padding, decryption shrinks it by the
/// recovered padding. Argument errors (parallelism, mode, IV, ciphertext
/// length) are reported before the buffer is touched.
pub fn perform_cipher<'a>(
    cipher: Arc<dyn BlockCipher>,
    parallelism: usize,
    mode: CipherMode,
    padding: PaddingMode,
    data: &'a mut Vec<u8>,
    direction: CipherDirection,
    iv: Option<&[u8]>,
) -> Result<&'a mut Vec<u8>, CryptoError> {
    let config = CipherConfig::new(mode, padding, parallelism);
    perform_cipher_with(cipher, &config, data, direction, iv)
}

/// [`perform_cipher`] driven by a [`CipherConfig`].
///
/// With [`PaddingCheck::Strict`] a malformed final block fails with
/// [`CryptoError::InvalidPadding`]; the buffer then holds the full
/// decrypted text.
pub fn perform_cipher_with<'a>(
    cipher: Arc<dyn BlockCipher>,
    config: &CipherConfig,
    data: &'a mut Vec<u8>,
    direction: CipherDirection,
    iv: Option<&[u8]>,
) -> Result<&'a mut Vec<u8>, CryptoError> {
    let mut session = Session::new(cipher, config, direction, iv)?;
    tracing::debug!(
        mode = config.mode.name(),
        padding = config.padding.name(),
        parallelism = config.parallelism,
        ?direction,
        len = data.len(),
        "perform_cipher"
    );

    match direction {
        CipherDirection::Encrypt => {
            session.pad_tail(data)?;
            session.run(data)?;
        }
        CipherDirection::Decrypt => {
            session.check_ciphertext_len(data.len() as u64)?;
            session.run(data)?;
            session.unpad_tail(data)?;
        }
    }
    Ok(data)
}

/// Stream `input` through the cipher into `output`, returning the number of
/// bytes written.
///
/// Batches fan out to blocking tokio tasks. The token is polled before every
/// batch and around each fan-out; once it fires the call fails with
/// [`CryptoError::Cancelled`] and `output` keeps whatever was already
/// written.
pub async fn perform_cipher_async(
    cipher: Arc<dyn BlockCipher>,
    config: &CipherConfig,
    direction: CipherDirection,
    iv: Option<&[u8]>,
    input: &Path,
    output: &Path,
    cancel: &CancellationToken,
) -> Result<u64, CryptoError> {
    let mut session = Session::new(cipher, config, direction, iv)?;
    let total = tokio::fs::metadata(input).await?.len();
    if direction == CipherDirection::Decrypt {
        session.check_ciphertext_len(total)?;
    }
    tracing::debug!(
        mode = config.mode.name(),
        padding = config.padding.name(),
        parallelism = config.parallelism,
        ?direction,
        len = total,
        input = %input.display(),
        "perform_cipher_async"
    );
    cancel.check()?;

    let mut reader = BufReader::new(tokio::fs::File::open(input).await?);
    let mut writer = BufWriter::new(tokio::fs::File::create(output).await?);
    let outcome = pump(&mut session, &mut reader, &mut writer, total, cancel).await;
    // Batches finished before a failure stay in the output.
    let flushed = writer.flush().await;
    let written = outcome?;
    flushed?;
    tracing::debug!(written, "perform_cipher_async done");
    Ok(written)
}

/// Move `total` bytes from `reader` to `writer` one batch at a time.
async fn pump(
    session: &mut Session,
    reader: &mut BufReader<tokio::fs::File>,
    writer: &mut BufWriter<tokio::fs::File>,
    total: u64,
    cancel: &CancellationToken,
) -> Result<u64, CryptoError> {
    let span = session.span() as u64;
    let mut buf = Vec::with_capacity(session.span() + session.block_size());
    let mut remaining = total;
    let mut written = 0u64;

    loop {
        cancel.check()?;
        let take = remaining.min(span) as usize;
        buf.resize(take, 0);
        reader.read_exact(&mut buf).await?;
        remaining -= take as u64;
        let last = remaining == 0;

        match session.direction {
            CipherDirection::Encrypt => {
                if last {
                    session.pad_tail(&mut buf)?;
                }
                session.run_async(&mut buf, cancel).await?;
            }
            CipherDirection::Decrypt => {
                session.run_async(&mut buf, cancel).await?;
                if last {
                    session.unpad_tail(&mut buf)?;
                }
            }
        }

        writer.write_all(&buf).await?;
        written += buf.len() as u64;
        if last {
            return Ok(written);
        }
    }
}
