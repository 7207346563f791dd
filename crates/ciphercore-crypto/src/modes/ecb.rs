//! ECB (Electronic Codebook) mode: every block on its own.

use ciphercore_types::CipherDirection;

use super::worker::WorkerJob;

/// ECB is fully parallel in both directions and never touches the chain.
pub(super) fn job(direction: CipherDirection) -> WorkerJob {
    match direction {
        CipherDirection::Encrypt => WorkerJob::Encrypt,
        CipherDirection::Decrypt => WorkerJob::Decrypt,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ciphercore_types::{CipherDirection, CipherMode};

    use crate::modes::test_cipher::{run_blocks, ToyCipher};
    use crate::provider::BlockCipher;

    #[test]
    fn test_ecb_equal_blocks_encrypt_equally() {
        let cipher: Arc<dyn BlockCipher> = Arc::new(ToyCipher::new(8, 0x42));
        let data = [[0x11u8; 8], [0x22; 8], [0x11; 8]].concat();
        let ct = run_blocks(CipherMode::Ecb, cipher.clone(), 3, CipherDirection::Encrypt, None, &data);
        assert_eq!(ct[..8], ct[16..]);
        assert_ne!(ct[..8], ct[8..16]);

        let pt = run_blocks(CipherMode::Ecb, cipher, 2, CipherDirection::Decrypt, None, &ct);
        assert_eq!(pt, data);
    }

    #[test]
    fn test_ecb_parallelism_invariant() {
        let cipher: Arc<dyn BlockCipher> = Arc::new(ToyCipher::new(4, 0x9e));
        let data: Vec<u8> = (0..4 * 19).map(|i| i as u8).collect();
        let one = run_blocks(CipherMode::Ecb, cipher.clone(), 1, CipherDirection::Encrypt, None, &data);
        let eight = run_blocks(CipherMode::Ecb, cipher, 8, CipherDirection::Encrypt, None, &data);
        assert_eq!(one, eight);
    }
}
