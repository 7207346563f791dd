//! Per-block work units and the fan-out/fan-in executors that run them.
//!
//! Work is partitioned before dispatch: every worker receives exactly one
//! `(block, scratch slot)` pair, so no two workers can touch the same
//! buffer. The synchronous executor runs the pairs on the transform's rayon
//! pool; the asynchronous one moves each pair into a blocking tokio task and
//! hands it back on join.

use std::sync::Arc;

use ciphercore_types::CryptoError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::cancel::CancellationToken;
use super::xor_into;
use crate::provider::{check_block_len, BlockCipher};

/// What a worker does with its block and scratch slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerJob {
    /// `block = E(block)`
    Encrypt,
    /// `block = D(block)`
    Decrypt,
    /// `slot = D(block)`; the ciphertext stays in the block for the fixup pass.
    DecryptIntoSlot,
    /// `slot = E(slot); block ^= slot`
    KeystreamXor,
}

impl WorkerJob {
    pub(crate) fn run(
        self,
        cipher: &dyn BlockCipher,
        block: &mut [u8],
        slot: &mut [u8],
    ) -> Result<(), CryptoError> {
        check_block_len(block, cipher.block_size())?;
        match self {
            WorkerJob::Encrypt => cipher.encrypt_block(block),
            WorkerJob::Decrypt => cipher.decrypt_block(block),
            WorkerJob::DecryptIntoSlot => {
                slot.copy_from_slice(block);
                cipher.decrypt_block(slot)
            }
            WorkerJob::KeystreamXor => {
                cipher.encrypt_block(slot)?;
                xor_into(block, slot);
                Ok(())
            }
        }
    }
}

/// Build the pool a transform fans its batches out to.
pub(crate) fn build_pool(threads: usize) -> Result<ThreadPool, CryptoError> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("ciphercore-worker-{i}"))
        .build()
        .map_err(|e| CryptoError::WorkerPool(e.to_string()))
}

/// Run `job` over every `(block, slot)` pair on `pool` and wait for all.
///
/// A single pair runs inline. The first error (in position order) wins.
pub(crate) fn fan_out(
    pool: &ThreadPool,
    cipher: &dyn BlockCipher,
    job: WorkerJob,
    blocks: &mut [Vec<u8>],
    slots: &mut [Vec<u8>],
) -> Result<(), CryptoError> {
    debug_assert!(slots.len() >= blocks.len());
    if let ([block], [slot, ..]) = (&mut *blocks, &mut *slots) {
        return job.run(cipher, block, slot);
    }

    let results: Vec<Result<(), CryptoError>> = pool.install(|| {
        blocks
            .par_iter_mut()
            .zip(slots.par_iter_mut())
            .map(|(block, slot)| job.run(cipher, block, slot))
            .collect()
    });
    results.into_iter().collect()
}

/// Async counterpart of [`fan_out`]: one blocking task per pair.
///
/// Blocks and slots are moved into their tasks and restored to the same
/// positions on join. Cancellation is checked before dispatch and after the
/// last join.
pub(crate) async fn fan_out_async(
    cipher: &Arc<dyn BlockCipher>,
    job: WorkerJob,
    blocks: &mut [Vec<u8>],
    slots: &mut [Vec<u8>],
    cancel: &CancellationToken,
) -> Result<(), CryptoError> {
    debug_assert!(slots.len() >= blocks.len());
    cancel.check()?;

    let handles: Vec<_> = blocks
        .iter_mut()
        .zip(slots.iter_mut())
        .map(|(block, slot)| {
            let cipher = Arc::clone(cipher);
            let mut block = std::mem::take(block);
            let mut slot = std::mem::take(slot);
            tokio::task::spawn_blocking(move || {
                let result = job.run(cipher.as_ref(), &mut block, &mut slot);
                (block, slot, result)
            })
        })
        .collect();

    let mut outcome = Ok(());
    for ((block, slot), handle) in blocks.iter_mut().zip(slots.iter_mut()).zip(handles) {
        let result = match handle.await {
            Ok((b, s, result)) => {
                *block = b;
                *slot = s;
                result
            }
            Err(e) => Err(CryptoError::TaskJoin(e.to_string())),
        };
        if outcome.is_ok() {
            outcome = result;
        }
    }
    outcome?;
    cancel.check()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_cipher::ToyCipher;

    fn pool() -> ThreadPool {
        build_pool(4).unwrap()
    }

    fn blocks(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i as u8; 4]).collect()
    }

    #[test]
    fn test_fan_out_matches_inline() {
        let cipher = ToyCipher::new(4, 0x5c);
        let mut parallel = blocks(6);
        let mut slots = vec![vec![0u8; 4]; 6];
        fan_out(&pool(), &cipher, WorkerJob::Encrypt, &mut parallel, &mut slots).unwrap();

        for (i, block) in parallel.iter().enumerate() {
            let mut expected = vec![i as u8; 4];
            cipher.encrypt_block(&mut expected).unwrap();
            assert_eq!(block, &expected);
        }
    }

    #[test]
    fn test_decrypt_into_slot_keeps_ciphertext() {
        let cipher = ToyCipher::new(4, 0x11);
        let mut data = blocks(3);
        let original = data.clone();
        let mut slots = vec![vec![0u8; 4]; 3];
        fan_out(&pool(), &cipher, WorkerJob::DecryptIntoSlot, &mut data, &mut slots).unwrap();
        assert_eq!(data, original);
        for (slot, ct) in slots.iter().zip(&original) {
            let mut back = slot.clone();
            cipher.encrypt_block(&mut back).unwrap();
            assert_eq!(&back, ct);
        }
    }

    #[test]
    fn test_wrong_block_length_surfaces() {
        let cipher = ToyCipher::new(4, 0);
        let mut data = vec![vec![0u8; 4], vec![0u8; 3]];
        let mut slots = vec![vec![0u8; 4]; 2];
        assert!(matches!(
            fan_out(&pool(), &cipher, WorkerJob::Encrypt, &mut data, &mut slots),
            Err(CryptoError::InvalidBlockSize { expected: 4, got: 3 })
        ));
    }

    #[test]
    fn test_first_error_in_position_order_wins() {
        let cipher = ToyCipher::new(4, 0);
        let mut data = vec![vec![0u8; 4], vec![0u8; 2], vec![0u8; 3]];
        let mut slots = vec![vec![0u8; 4]; 3];
        assert!(matches!(
            fan_out(&pool(), &cipher, WorkerJob::Encrypt, &mut data, &mut slots),
            Err(CryptoError::InvalidBlockSize { expected: 4, got: 2 })
        ));
    }

    #[test]
    fn test_pool_thread_count() {
        assert_eq!(build_pool(3).unwrap().current_num_threads(), 3);
    }

    #[tokio::test]
    async fn test_fan_out_async_restores_positions() {
        let cipher: Arc<dyn BlockCipher> = Arc::new(ToyCipher::new(4, 0x33));
        let mut sync_blocks = blocks(5);
        let mut async_blocks = blocks(5);
        let mut slots = vec![vec![9u8; 4]; 5];
        let mut async_slots = slots.clone();

        fan_out(&pool(), cipher.as_ref(), WorkerJob::KeystreamXor, &mut sync_blocks, &mut slots).unwrap();
        fan_out_async(
            &cipher,
            WorkerJob::KeystreamXor,
            &mut async_blocks,
            &mut async_slots,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(sync_blocks, async_blocks);
        assert_eq!(slots, async_slots);
    }

    #[tokio::test]
    async fn test_fan_out_async_honours_cancel() {
        let cipher: Arc<dyn BlockCipher> = Arc::new(ToyCipher::new(4, 0));
        let token = CancellationToken::new();
        token.cancel();
        let mut data = blocks(2);
        let mut slots = vec![vec![0u8; 4]; 2];
        let err = fan_out_async(&cipher, WorkerJob::Encrypt, &mut data, &mut slots, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, CryptoError::Cancelled));
        assert_eq!(data, blocks(2));
    }
}
