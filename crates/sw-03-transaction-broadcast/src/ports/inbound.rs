//! Inbound ports (API) for the transaction broadcast subsystem.

use async_trait::async_trait;
use shared_types::{FullTransaction, Hash};

use crate::domain::BroadcastError;

/// Outbound transaction sender.
#[async_trait]
pub trait TransactionSenderApi: Send + Sync {
    /// Fail with `PeersNotSynced` when no peer would receive a send now.
    fn verify_can_send(&self) -> Result<(), BroadcastError>;

    /// Queue a locally created transaction for broadcast.
    async fn send(&self, transaction: FullTransaction) -> Result<(), BroadcastError>;

    /// The network relayed these transactions back to us.
    async fn transactions_relayed(&self, hashes: Vec<Hash>) -> Result<(), BroadcastError>;

    /// Initial download finished on every peer; flush pending sends.
    async fn all_peers_synced(&self) -> Result<(), BroadcastError>;
}
