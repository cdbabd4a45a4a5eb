//! # Block Lane
//!
//! Transactions confirmed in a block. A confirmed transaction always wins:
//! every pending transaction spending one of its inputs is invalidated, and
//! a wallet transaction held in the invalid set is resurrected.

use shared_types::{short_hex, Block, FullTransaction, Transaction, TransactionStatus};
use tracing::debug;

use crate::algorithms::in_topological_order;
use crate::application::service::{Batch, TransactionProcessingService};
use crate::domain::{ProcessOutcome, ProcessingError};
use crate::ports::{Ledger, LedgerReader, LedgerStore};

fn confirm(header: &mut Transaction, block: &Block, order: u32) {
    header.block_hash = Some(block.hash);
    header.timestamp = block.timestamp;
    header.order = order;
    header.status = TransactionStatus::Relayed;
    header.conflicting_tx_hash = None;
}

impl<L: Ledger> TransactionProcessingService<L> {
    pub(crate) fn apply_block(
        &self,
        transactions: Vec<FullTransaction>,
        mut block: Block,
    ) -> Result<ProcessOutcome, ProcessingError> {
        let _lane = self.block_lane.lock();
        self.check_batch_size(transactions.len())?;
        let ordered = in_topological_order(transactions, self.config.reject_cycles)?;

        self.run_batch("block", |store| {
            let mut batch = Batch::for_block(&block);

            for (order, mut transaction) in ordered.into_iter().enumerate() {
                let order = order as u32;
                let hash = transaction.hash();

                if let Some(mut existing) = store.full_transaction(&hash) {
                    self.extract(&mut existing, &*store);
                    confirm(&mut existing.header, &block, order);
                    batch.extracted(&existing);
                    self.invalidate_block_conflicts(&existing, store, &mut batch)?;
                    store.update_transaction(&existing)?;
                    batch.updated(&existing.header);
                    continue;
                }

                self.extract(&mut transaction, &*store);

                if !transaction.header.is_mine {
                    batch.extracted(&transaction);
                    let conflicts = self
                        .resolver
                        .incoming_pending_conflicts(&transaction, &*store);
                    for conflict in conflicts {
                        debug!(
                            "[sw-01] foreign {} double-spends {}",
                            short_hex(&hash),
                            short_hex(&conflict.hash())
                        );
                        let headers =
                            self.invalidator
                                .invalidate(&conflict.hash(), Some(hash), store)?;
                        batch.invalidated(headers);
                        batch.needs_refresh = true;
                    }
                    continue;
                }

                confirm(&mut transaction.header, &block, order);
                batch.extracted(&transaction);
                self.invalidate_block_conflicts(&transaction, store, &mut batch)?;

                if store.invalid_transaction(&hash).is_some() {
                    self.invalidator.resurrect(&transaction, store)?;
                    batch.resurrected(&transaction);
                } else {
                    store.insert_transaction(&transaction)?;
                    batch.inserted(&transaction);
                }

                if self.irregular.has_irregular_output(&transaction.outputs) {
                    batch.needs_refresh = true;
                }
            }

            if !batch.report.is_empty() {
                block.has_transactions = true;
                store.upsert_block(&block)?;
                batch.update.block = Some(block.clone());
            }
            Ok(batch)
        })
    }
}
