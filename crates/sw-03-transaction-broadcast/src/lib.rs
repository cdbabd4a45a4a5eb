//! # SW-03 Transaction Broadcast
//!
//! Gets locally created transactions onto the network.
//!
//! **Subsystem ID:** 3  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Pick the peers a transaction is announced to
//! - Track every send round in a `SentTransaction` record
//! - Resend on a timer until the network relays the transaction back or
//!   the retry budget runs out
//! - Alternatively push through a broadcast API, once, and report the
//!   answer to the ledger
//!
//! ## Peer Selection
//!
//! | Rule | Effect |
//! |------|--------|
//! | fewer than `min_connected_peers` connected | nothing is sent |
//! | no synced peer | nothing is sent |
//! | one synced peer | kept free, never selected |
//! | remaining ready peers | half of them, not-yet-synced first |
//!
//! ## Module Structure
//!
//! ```text
//! sw-03-transaction-broadcast/
//! ├── domain/          # Errors, retry policy
//! ├── algorithms/      # Peer selection
//! ├── ports/           # Sender API (inbound) + peers, store, source, API (outbound)
//! ├── adapters/        # In-memory sent-transaction store
//! ├── application/     # Sender state machine, serial worker
//! └── config.rs        # BroadcastConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::InMemorySentTransactionStore;
pub use algorithms::PeerSelector;
pub use application::{
    spawn_broadcast_worker, BroadcastHandle, BroadcastPorts, Dispatch, SendType,
    TransactionSender,
};
pub use config::BroadcastConfig;
pub use domain::{BroadcastError, RetryPolicy, RoundOutcome};
pub use ports::{
    ApiBroadcaster, BroadcastListener, InitialDownload, MockApiBroadcaster, MockPeer,
    MockPeerNetwork, MockPendingSource, MockTimeSource, Peer, PeerBehavior, PeerManager,
    PendingTransactionSource, RecordingBroadcastListener, SentTransactionStore, SystemTimeSource,
    TimeSource, TransactionSenderApi,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
