/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("operation not supported")]
    NotSupported,
    #[error("invalid key")]
    InvalidKey,
    #[error("unknown algorithm name: {0}")]
    UnknownAlgorithm(String),
    #[error("random generation failed")]
    RandGenFail,

    // Symmetric cipher errors
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("initialization vector required by this mode")]
    MissingIv,
    #[error("invalid iv length: expected {expected}, got {got}")]
    InvalidIvLength { expected: usize, got: usize },
    #[error("degree of parallelism must be at least 1")]
    InvalidParallelism,
    #[error("invalid block size: expected {expected}, got {got}")]
    InvalidBlockSize { expected: usize, got: usize },
    #[error("invalid padding")]
    InvalidPadding,

    // Driver errors
    #[error("operation cancelled")]
    Cancelled,
    #[error("worker task failed: {0}")]
    TaskJoin(String),
    #[error("worker pool unavailable: {0}")]
    WorkerPool(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // BigNum errors
    #[error("big number: division by zero")]
    BnDivisionByZero,
    #[error("big number: no modular inverse")]
    BnNoInverse,
    #[error("big number: prime generation failed")]
    BnPrimeGenFail,
    #[error("big number: random generation failed")]
    BnRandGenFail,
    #[error("big number: malformed decimal string")]
    BnParseFail,

    // Primality errors
    #[error("probability must lie strictly between 0 and 1, got {0}")]
    InvalidProbability(f64),

    // Benaloh errors
    #[error("benaloh: message must be smaller than the block size r")]
    BenalohMessageTooLarge,
    #[error("benaloh: ciphertext does not decrypt to any residue class")]
    BenalohDecryptFail,
}
