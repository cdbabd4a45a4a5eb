//! # Broadcast Errors

use shared_types::StorageError;
use thiserror::Error;

/// Errors raised while broadcasting transactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// Not enough synced peers to send anything.
    #[error("Peers are not synced")]
    PeersNotSynced,

    /// A peer could not take the transaction.
    #[error("Peer {peer} failed: {reason}")]
    PeerFailed {
        /// Peer identifier.
        peer: String,
        /// Failure description.
        reason: String,
    },

    /// The broadcast API rejected the transaction.
    #[error("Broadcast API rejected transaction: {0}")]
    ApiRejected(String),

    /// The send worker is no longer running.
    #[error("Broadcast worker stopped")]
    WorkerStopped,

    /// Sent-transaction storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BroadcastError::PeerFailed {
            peer: "10.0.0.1:8333".to_string(),
            reason: "disconnected".to_string(),
        };
        assert_eq!(err.to_string(), "Peer 10.0.0.1:8333 failed: disconnected");
        assert_eq!(BroadcastError::PeersNotSynced.to_string(), "Peers are not synced");
    }
}
