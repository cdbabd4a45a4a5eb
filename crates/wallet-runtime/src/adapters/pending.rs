//! # Pending Transaction Source
//!
//! Feeds broadcast outcomes back into the ledger through the syncer.

use shared_types::{short_hex, FullTransaction, Hash};
use sw_01_transaction_processing::{Ledger, TransactionSyncer};
use sw_03_transaction_broadcast::PendingTransactionSource;
use tracing::error;

/// [`PendingTransactionSource`] backed by a [`TransactionSyncer`].
///
/// Ledger failures are logged: the broadcast side has no way to act on them
/// and retries on its own schedule.
pub struct SyncerPendingSource<L: Ledger> {
    syncer: TransactionSyncer<L>,
}

impl<L: Ledger> SyncerPendingSource<L> {
    /// Wrap `syncer`.
    pub fn new(syncer: TransactionSyncer<L>) -> Self {
        Self { syncer }
    }
}

impl<L: Ledger> PendingTransactionSource for SyncerPendingSource<L> {
    fn new_transactions(&self) -> Vec<FullTransaction> {
        self.syncer.new_transactions()
    }

    fn handle_relayed(&self, transactions: Vec<FullTransaction>) {
        let count = transactions.len();
        if let Err(err) = self.syncer.handle_relayed(transactions) {
            error!("[sw-rt] failed to mark {} transactions relayed: {}", count, err);
        }
    }

    fn handle_invalid(&self, hash: &Hash) {
        if let Err(err) = self.syncer.handle_invalid(hash) {
            error!("[sw-rt] failed to invalidate {}: {}", short_hex(hash), err);
        }
    }
}
