//! # Pending and Created Lanes
//!
//! Mempool announcements never invalidate: a pending transaction that
//! supersedes another only flags the loser (and its descendants) with
//! `conflicting_tx_hash`. The block lane settles the conflict later.

use shared_types::{short_hex, FullTransaction, TransactionStatus, TransactionType};
use tracing::debug;

use crate::algorithms::in_topological_order;
use crate::application::service::{Batch, TransactionProcessingService};
use crate::domain::{ProcessOutcome, ProcessingError};
use crate::ports::{Ledger, LedgerReader, LedgerStore};

impl<L: Ledger> TransactionProcessingService<L> {
    pub(crate) fn apply_pending(
        &self,
        transactions: Vec<FullTransaction>,
    ) -> Result<ProcessOutcome, ProcessingError> {
        let mut lane = self.pending_lane.lock();
        self.check_batch_size(transactions.len())?;
        let ordered = in_topological_order(transactions, self.config.reject_cycles)?;

        self.run_batch("pending", |store| {
            let mut batch = Batch::default();

            for (order, mut transaction) in ordered.into_iter().enumerate() {
                let order = order as u32;
                let hash = transaction.hash();

                if lane.not_mine.contains(&hash) || store.invalid_transaction(&hash).is_some() {
                    continue;
                }

                if let Some(existing) = store.full_transaction(&hash) {
                    self.flag_pending_conflicts(&existing, store, &mut batch)?;
                    if existing.header.status == TransactionStatus::Relayed {
                        continue;
                    }
                    // flagging may have touched the stored header
                    let mut header = store.transaction(&hash).unwrap_or(existing.header);
                    header.status = TransactionStatus::Relayed;
                    header.order = order;
                    store.update_header(&header)?;
                    batch.updated(&header);
                    continue;
                }

                transaction.header.status = TransactionStatus::Relayed;
                transaction.header.order = order;
                self.extract(&mut transaction, &*store);
                batch.extracted(&transaction);

                if !transaction.header.is_mine {
                    lane.not_mine.put(hash, ());
                    for conflict in self
                        .resolver
                        .incoming_pending_conflicts(&transaction, &*store)
                    {
                        debug!(
                            "[sw-01] foreign {} may double-spend {}",
                            short_hex(&hash),
                            short_hex(&conflict.hash())
                        );
                        let mut header = conflict.header;
                        if header.conflicting_tx_hash != Some(hash) {
                            header.conflicting_tx_hash = Some(hash);
                            store.update_header(&header)?;
                            batch.updated(&header);
                        }
                    }
                    continue;
                }

                self.flag_pending_conflicts(&transaction, store, &mut batch)?;

                if self.config.ignore_incoming
                    && transaction.metadata.transaction_type == TransactionType::Incoming
                {
                    debug!("[sw-01] ignoring incoming {}", short_hex(&hash));
                    continue;
                }

                store.insert_transaction(&transaction)?;
                batch.inserted(&transaction);

                if !transaction.header.is_outgoing
                    || self.irregular.has_irregular_output(&transaction.outputs)
                {
                    batch.needs_refresh = true;
                }
            }
            Ok(batch)
        })
    }

    pub(crate) fn apply_created(
        &self,
        mut transaction: FullTransaction,
    ) -> Result<ProcessOutcome, ProcessingError> {
        let _lane = self.pending_lane.lock();
        let hash = transaction.hash();

        self.run_batch("created", |store| {
            if store.transaction(&hash).is_some() || store.invalid_transaction(&hash).is_some() {
                return Err(ProcessingError::TransactionAlreadyExists(short_hex(&hash)));
            }
            let mut batch = Batch::default();

            transaction.header.status = TransactionStatus::New;
            self.extract(&mut transaction, &*store);
            batch.extracted(&transaction);
            store.insert_transaction(&transaction)?;
            batch.inserted(&transaction);
            batch.needs_refresh = self.irregular.has_irregular_output(&transaction.outputs);
            Ok(batch)
        })
    }

    /// Flag every pending transaction `transaction` supersedes.
    fn flag_pending_conflicts(
        &self,
        transaction: &FullTransaction,
        store: &mut L::Store,
        batch: &mut Batch,
    ) -> Result<(), ProcessingError> {
        let winner = transaction.hash();
        for conflict in self
            .resolver
            .conflicts_with_pending_transaction(transaction, &*store)
        {
            debug!(
                "[sw-01] {} supersedes pending {}",
                short_hex(&winner),
                short_hex(&conflict.hash())
            );
            self.flag_superseded(&conflict.hash(), winner, store, batch)?;
        }
        Ok(())
    }
}
