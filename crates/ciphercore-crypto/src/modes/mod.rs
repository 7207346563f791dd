//! Block cipher modes of operation.
//!
//! This module turns any [`BlockCipher`](crate::provider::BlockCipher) into
//! a stream transform using ECB, CBC, PCBC, CFB, OFB or CTR, with one of
//! four final-block padding schemes. Input is processed in batches of up to
//! `parallelism` blocks; the blocks of a batch are spread across workers
//! wherever the mode's data dependencies allow it, and the chaining value is
//! threaded from batch to batch so that every degree of parallelism yields
//! the same bytes.
//!
//! The entry points live in [`stream`]: [`perform_cipher`] works in place on
//! a buffer, [`perform_cipher_async`] streams one file into another and can
//! be cancelled.

pub mod cancel;
mod cbc;
mod cfb;
mod ctr;
mod ecb;
mod ofb;
pub mod padding;
mod pcbc;
pub mod stream;
mod worker;

use std::sync::Arc;

use ciphercore_types::{CipherDirection, CipherMode, CryptoError};
use zeroize::Zeroize;

use crate::provider::BlockCipher;
use worker::{build_pool, fan_out, fan_out_async, WorkerJob};

pub use cancel::CancellationToken;
pub use ctr::add_to_counter;
pub use padding::{Padding, PaddingCheck};
pub use stream::{perform_cipher, perform_cipher_async, perform_cipher_with, CipherConfig};

/// XOR `src` into `dst` byte by byte.
pub(crate) fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

/// The carry value threaded from one batch to the next.
///
/// Holds the IV at the start of a stream, then whatever the mode needs to
/// continue: the last ciphertext block (CBC, CFB), plaintext XOR ciphertext
/// of the last block (PCBC), the last keystream block (OFB) or the next
/// counter value (CTR).
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct ChainState {
    value: Vec<u8>,
}

impl ChainState {
    /// Start a chain from an IV (or from zeros for ECB, which never reads it).
    pub fn new(iv: Option<&[u8]>, block_size: usize) -> Self {
        let value = match iv {
            Some(iv) => iv.to_vec(),
            None => vec![0u8; block_size],
        };
        Self { value }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.value
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.value
    }

    pub(crate) fn set(&mut self, value: &[u8]) {
        self.value.copy_from_slice(value);
    }
}

impl std::fmt::Debug for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainState")
            .field("len", &self.value.len())
            .finish_non_exhaustive()
    }
}

/// Block-sized scratch buffers, one per worker slot.
///
/// Allocated once per transform and never resized. Worker `i` of a batch
/// owns slot `i` for the duration of that batch.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct ScratchPool {
    slots: Vec<Vec<u8>>,
}

impl ScratchPool {
    pub fn new(slots: usize, block_size: usize) -> Self {
        Self {
            slots: vec![vec![0u8; block_size]; slots],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Vec<u8>] {
        &mut self.slots
    }
}

/// One wave of up to `parallelism` blocks, copied out of the caller's buffer.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct BlockBatch {
    blocks: Vec<Vec<u8>>,
    len: usize,
    block_size: usize,
}

impl BlockBatch {
    pub fn new(capacity: usize, block_size: usize) -> Self {
        Self {
            blocks: vec![vec![0u8; block_size]; capacity],
            len: 0,
            block_size,
        }
    }

    /// Copy a run of whole blocks from `src` into the batch.
    pub fn load(&mut self, src: &[u8]) -> Result<(), CryptoError> {
        let bs = self.block_size;
        if src.len() % bs != 0 {
            return Err(CryptoError::InvalidBlockSize {
                expected: bs,
                got: src.len() % bs,
            });
        }
        let count = src.len() / bs;
        if count > self.blocks.len() {
            return Err(CryptoError::InvalidArg);
        }
        for (block, chunk) in self.blocks.iter_mut().zip(src.chunks_exact(bs)) {
            block.copy_from_slice(chunk);
        }
        self.len = count;
        Ok(())
    }

    /// Copy the batch back over the bytes it was loaded from.
    pub fn store(&self, dst: &mut [u8]) {
        for (chunk, block) in dst.chunks_exact_mut(self.block_size).zip(self.blocks()) {
            chunk.copy_from_slice(block);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn blocks(&self) -> &[Vec<u8>] {
        &self.blocks[..self.len]
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Vec<u8>] {
        &mut self.blocks[..self.len]
    }
}

/// The supported modes, chosen once per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeKind {
    Ecb,
    Cbc,
    Pcbc,
    Cfb,
    Ofb,
    Ctr,
}

/// Everything a mode step may touch for one batch.
pub(crate) struct Step<'a> {
    pub(crate) cipher: &'a dyn BlockCipher,
    pub(crate) blocks: &'a mut [Vec<u8>],
    pub(crate) chain: &'a mut ChainState,
    pub(crate) scratch: &'a mut ScratchPool,
    pub(crate) cancel: &'a CancellationToken,
}

/// A mode of operation bound to a cipher and its scratch pool.
///
/// Each batch runs in up to three stages: a sequential `prepare` (which for
/// inherently sequential directions does all the work), an optional
/// parallel [`WorkerJob`] over the blocks, and a sequential `finish` fixup.
/// Only the middle stage differs between the sync and async entry points.
/// The sync path runs on a rayon pool of `parallelism` threads that lives as
/// long as the transform, so every batch of a stream reuses the same workers.
pub struct ModeTransform {
    kind: ModeKind,
    cipher: Arc<dyn BlockCipher>,
    scratch: ScratchPool,
    pool: rayon::ThreadPool,
}

impl ModeTransform {
    /// Bind `mode` to `cipher` for batches of up to `parallelism` blocks.
    pub fn new(
        mode: CipherMode,
        cipher: Arc<dyn BlockCipher>,
        parallelism: usize,
    ) -> Result<Self, CryptoError> {
        if parallelism == 0 {
            return Err(CryptoError::InvalidParallelism);
        }
        let kind = match mode {
            CipherMode::Ecb => ModeKind::Ecb,
            CipherMode::Cbc => ModeKind::Cbc,
            CipherMode::Pcbc => ModeKind::Pcbc,
            CipherMode::Cfb => ModeKind::Cfb,
            CipherMode::Ofb => ModeKind::Ofb,
            CipherMode::Ctr => ModeKind::Ctr,
            CipherMode::RandomDelta => return Err(CryptoError::NotSupported),
        };
        let block_size = cipher.block_size();
        if block_size == 0 {
            return Err(CryptoError::InvalidArg);
        }
        // CTR keeps its running counter in one extra slot.
        let slots = if kind == ModeKind::Ctr {
            parallelism + 1
        } else {
            parallelism
        };
        Ok(Self {
            kind,
            cipher,
            scratch: ScratchPool::new(slots, block_size),
            pool: build_pool(parallelism)?,
        })
    }

    pub fn mode(&self) -> CipherMode {
        match self.kind {
            ModeKind::Ecb => CipherMode::Ecb,
            ModeKind::Cbc => CipherMode::Cbc,
            ModeKind::Pcbc => CipherMode::Pcbc,
            ModeKind::Cfb => CipherMode::Cfb,
            ModeKind::Ofb => CipherMode::Ofb,
            ModeKind::Ctr => CipherMode::Ctr,
        }
    }

    pub fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    pub fn cipher(&self) -> &Arc<dyn BlockCipher> {
        &self.cipher
    }

    /// Number of worker slots, i.e. the largest batch this transform accepts.
    pub fn parallelism(&self) -> usize {
        match self.kind {
            ModeKind::Ctr => self.scratch.len() - 1,
            _ => self.scratch.len(),
        }
    }

    /// ECB never reads the chain, so only the chaining modes check its length.
    fn check_batch(&self, batch: &BlockBatch, chain: &ChainState) -> Result<(), CryptoError> {
        let bs = self.block_size();
        if batch.block_size != bs || batch.len() > self.parallelism() {
            return Err(CryptoError::InvalidArg);
        }
        if self.kind != ModeKind::Ecb && chain.as_bytes().len() != bs {
            return Err(CryptoError::InvalidIvLength {
                expected: bs,
                got: chain.as_bytes().len(),
            });
        }
        Ok(())
    }

    /// Transform one batch in place on the transform's worker pool.
    pub fn transform(
        &mut self,
        direction: CipherDirection,
        batch: &mut BlockBatch,
        chain: &mut ChainState,
    ) -> Result<(), CryptoError> {
        self.check_batch(batch, chain)?;
        if batch.is_empty() {
            return Ok(());
        }
        let kind = self.kind;
        let cipher = Arc::clone(&self.cipher);
        let never = CancellationToken::new();

        let job = prepare(kind, direction, step(&*cipher, batch, chain, &mut self.scratch, &never))?;
        if let Some(job) = job {
            let n = batch.len();
            let slots = &mut self.scratch.slots_mut()[..n];
            fan_out(&self.pool, &*cipher, job, batch.blocks_mut(), slots)?;
            finish(kind, direction, step(&*cipher, batch, chain, &mut self.scratch, &never))?;
        }
        Ok(())
    }

    /// Transform one batch in place on blocking tokio tasks.
    ///
    /// Produces exactly the bytes [`transform`](Self::transform) would, and
    /// fails with [`CryptoError::Cancelled`] once `cancel` fires.
    pub async fn transform_async(
        &mut self,
        direction: CipherDirection,
        batch: &mut BlockBatch,
        chain: &mut ChainState,
        cancel: &CancellationToken,
    ) -> Result<(), CryptoError> {
        self.check_batch(batch, chain)?;
        cancel.check()?;
        if batch.is_empty() {
            return Ok(());
        }
        let kind = self.kind;
        let cipher = Arc::clone(&self.cipher);

        let job = prepare(kind, direction, step(&*cipher, batch, chain, &mut self.scratch, cancel))?;
        if let Some(job) = job {
            let n = batch.len();
            let slots = &mut self.scratch.slots_mut()[..n];
            fan_out_async(&cipher, job, batch.blocks_mut(), slots, cancel).await?;
            finish(kind, direction, step(&*cipher, batch, chain, &mut self.scratch, cancel))?;
        }
        Ok(())
    }
}

fn prepare(
    kind: ModeKind,
    direction: CipherDirection,
    step: Step<'_>,
) -> Result<Option<WorkerJob>, CryptoError> {
    match kind {
        ModeKind::Ecb => Ok(Some(ecb::job(direction))),
        ModeKind::Cbc => cbc::prepare(direction, step),
        ModeKind::Pcbc => pcbc::prepare(direction, step),
        ModeKind::Cfb => cfb::prepare(direction, step),
        ModeKind::Ofb => ofb::prepare(step),
        ModeKind::Ctr => ctr::prepare(step),
    }
}

fn finish(kind: ModeKind, direction: CipherDirection, step: Step<'_>) -> Result<(), CryptoError> {
    match kind {
        ModeKind::Cbc => cbc::finish(direction, step),
        ModeKind::Pcbc => pcbc::finish(direction, step),
        ModeKind::Ctr => ctr::finish(step),
        ModeKind::Ecb | ModeKind::Cfb | ModeKind::Ofb => Ok(()),
    }
}

fn step<'a>(
    cipher: &'a dyn BlockCipher,
    batch: &'a mut BlockBatch,
    chain: &'a mut ChainState,
    scratch: &'a mut ScratchPool,
    cancel: &'a CancellationToken,
) -> Step<'a> {
    Step {
        cipher,
        blocks: batch.blocks_mut(),
        chain,
        scratch,
        cancel,
    }
}
