//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised by ledger storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Record not found in storage.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Record already present.
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Snapshot could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),
}
