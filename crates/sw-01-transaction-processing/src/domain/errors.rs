//! # Domain Errors
//!
//! Error types for transaction processing.

use shared_types::StorageError;
use thiserror::Error;

/// Transaction processing error types.
///
/// A bloom filter refresh is not an error; it is reported through
/// `ProcessOutcome::AppliedNeedsFilterRefresh`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// A locally created transaction is already in the ledger.
    #[error("Transaction already exists: {0}")]
    TransactionAlreadyExists(String),

    /// A batch contains transactions spending each other in a loop.
    #[error("Dependency cycle detected at transaction {0}")]
    CycleDetected(String),

    /// A batch exceeds the configured size.
    #[error("Batch too large: {got} > {max}")]
    BatchTooLarge {
        /// Transactions in the batch
        got: usize,
        /// Configured maximum
        max: usize,
    },

    /// The public key manager could not extend the key gap.
    #[error("Key manager error: {0}")]
    KeyManager(String),

    /// Storage failed; the batch was rolled back.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
