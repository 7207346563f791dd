//! Cooperative cancellation for the asynchronous cipher path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ciphercore_types::CryptoError;

/// A cloneable cancellation flag.
///
/// All clones share one flag; once [`cancel`](Self::cancel) is called the
/// async driver stops at its next check and returns
/// [`CryptoError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancellation has been requested.
    pub fn check(&self) -> Result<(), CryptoError> {
        if self.is_cancelled() {
            tracing::warn!("cipher operation cancelled");
            return Err(CryptoError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(CryptoError::Cancelled)));
    }
}
