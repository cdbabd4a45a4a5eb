//! # Transaction Invalidator
//!
//! Moves a transaction and every transaction that transitively spends its
//! outputs from the active ledger to the invalid set. The walk uses an
//! explicit work queue so long descendant chains cannot exhaust the stack.
//!
//! Resurrection is the only way back: a block confirming a hash held in
//! the invalid set moves it into the active ledger again.

use shared_types::{
    short_hex, FullTransaction, Hash, InvalidTransaction, Transaction, TransactionStatus,
};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::domain::ProcessingError;
use crate::ports::{LedgerReader, LedgerStore};

/// Cascading invalidation and resurrection.
#[derive(Debug, Clone, Default)]
pub struct TransactionInvalidator;

impl TransactionInvalidator {
    /// Create an invalidator.
    pub fn new() -> Self {
        Self
    }

    /// `root` followed by every active transaction spending its outputs,
    /// transitively, in breadth-first order.
    pub fn descendants<R: LedgerReader + ?Sized>(&self, root: &Hash, ledger: &R) -> Vec<Hash> {
        if ledger.transaction(root).is_none() {
            return Vec::new();
        }
        let mut seen: HashSet<Hash> = HashSet::from([*root]);
        let mut queue: VecDeque<Hash> = VecDeque::from([*root]);
        let mut ordered = Vec::new();

        while let Some(hash) = queue.pop_front() {
            ordered.push(hash);
            for spender in ledger.spenders_of(&hash) {
                if seen.insert(spender) {
                    queue.push_back(spender);
                }
            }
        }
        ordered
    }

    /// Invalidate `root` and its descendants.
    ///
    /// `root` records `conflicting_tx_hash`; each descendant records the same
    /// hash, or `root` itself when none was given. Wallet outputs spent by an
    /// invalidated transaction are flagged `failed_to_spend`. Returns the
    /// invalidated headers.
    pub fn invalidate<S: LedgerStore + ?Sized>(
        &self,
        root: &Hash,
        conflicting_tx_hash: Option<Hash>,
        store: &mut S,
    ) -> Result<Vec<Transaction>, ProcessingError> {
        let hashes = self.descendants(root, &*store);
        let inherited = conflicting_tx_hash.or(Some(*root));

        let mut invalidated = Vec::with_capacity(hashes.len());
        for hash in &hashes {
            let mut transaction = store.delete_transaction(hash)?;
            transaction.header.status = TransactionStatus::Invalid;
            transaction.header.conflicting_tx_hash = if hash == root {
                conflicting_tx_hash
            } else {
                inherited
            };
            store.insert_invalid(InvalidTransaction::snapshot(&transaction)?)?;
            invalidated.push(transaction);
        }

        for transaction in &invalidated {
            self.flag_spent_outputs(transaction, true, store)?;
        }

        debug!(
            "[sw-01] invalidated {} ({} descendants)",
            short_hex(root),
            hashes.len().saturating_sub(1)
        );
        Ok(invalidated.into_iter().map(|tx| tx.header).collect())
    }

    /// Move `transaction`, now confirmed, from the invalid set back into the
    /// active ledger.
    pub fn resurrect<S: LedgerStore + ?Sized>(
        &self,
        transaction: &FullTransaction,
        store: &mut S,
    ) -> Result<(), ProcessingError> {
        store.delete_invalid(&transaction.header.hash)?;
        store.insert_transaction(transaction)?;
        self.flag_spent_outputs(transaction, false, store)?;
        debug!("[sw-01] resurrected {}", short_hex(&transaction.header.hash));
        Ok(())
    }

    fn flag_spent_outputs<S: LedgerStore + ?Sized>(
        &self,
        transaction: &FullTransaction,
        failed: bool,
        store: &mut S,
    ) -> Result<(), ProcessingError> {
        for outpoint in transaction.spent_outpoints() {
            let Some(output) = store.output(&outpoint) else {
                continue;
            };
            if output.is_mine() && output.failed_to_spend != failed {
                store.set_failed_to_spend(&outpoint, failed)?;
            }
        }
        Ok(())
    }
}
