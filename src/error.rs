//! Error types for minichain

use thiserror::Error;

/// Every way a transaction, block, or whole chain can be rejected.
///
/// Validation failures are ordinary `Err` values carrying a diagnostic
/// message; callers treat them as rejection, not exceptional control flow.
/// Failures of the cryptographic provider are carried as
/// [`ChainError::Crypto`] rather than aborting the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    #[error("Dangling input: {0}")]
    DanglingInput(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Value mismatch: {0}")]
    ValueMismatch(String),

    #[error("Hash mismatch: {0}")]
    HashMismatch(String),

    #[error("Chain broken: {0}")]
    ChainBroken(String),

    #[error("Proof of work unsatisfied: {0}")]
    ProofOfWorkUnsatisfied(String),

    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    #[error("Mining exhausted: {0}")]
    MiningExhausted(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
