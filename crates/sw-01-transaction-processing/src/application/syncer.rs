//! # Transaction Syncer
//!
//! Bridge between the broadcast side and the processing service: lists
//! unsent wallet transactions and feeds relay and rejection reports back
//! into the ledger.

use shared_types::{short_hex, FullTransaction, Hash, TransactionStatus};
use std::sync::Arc;
use tracing::debug;

use crate::application::service::TransactionProcessingService;
use crate::domain::{ProcessOutcome, ProcessReport, ProcessingError};
use crate::ports::{Ledger, LedgerReader, TransactionProcessorApi};

/// Syncs locally created transactions with what peers report.
pub struct TransactionSyncer<L: Ledger> {
    service: Arc<TransactionProcessingService<L>>,
}

impl<L: Ledger> Clone for TransactionSyncer<L> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<L: Ledger> TransactionSyncer<L> {
    /// Create a syncer over `service`.
    pub fn new(service: Arc<TransactionProcessingService<L>>) -> Self {
        Self { service }
    }

    /// Transactions not yet relayed back by any peer, oldest first.
    pub fn new_transactions(&self) -> Vec<FullTransaction> {
        self.service
            .ledger()
            .read(|store| store.transactions_with_status(TransactionStatus::New))
    }

    /// Peers relayed `transactions` back; treat them as pending.
    pub fn handle_relayed(
        &self,
        transactions: Vec<FullTransaction>,
    ) -> Result<ProcessOutcome, ProcessingError> {
        let outcome = self.service.process_pending(transactions)?;
        if outcome.needs_filter_refresh() {
            self.service.refresh_filter()?;
        }
        Ok(outcome)
    }

    /// A peer or API rejected `hash`.
    pub fn handle_invalid(&self, hash: &Hash) -> Result<ProcessReport, ProcessingError> {
        debug!("[sw-01] invalid report for {}", short_hex(hash));
        self.service.invalidate(hash)
    }

    /// Whether the protocol layer should fetch the announced `hash`.
    pub fn should_request_transaction(&self, hash: &Hash) -> bool {
        !self.service.ledger().read(|store| {
            store
                .transaction(hash)
                .is_some_and(|tx| tx.status == TransactionStatus::Relayed)
        })
    }
}
