//! # Conflict Resolver
//!
//! Two transactions conflict when they spend the same outpoint.
//!
//! Only pending transactions can lose to a confirmed one. Between two
//! pending transactions an optional sequence heuristic treats an existing
//! transaction with a higher input sequence as a not-yet-relayed
//! replacement that the incoming one must not supersede.

use shared_types::{FullTransaction, Hash};

use crate::ports::LedgerReader;

/// Finds ledger transactions sharing inputs with a given transaction.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    sequence_heuristic: bool,
}

impl ConflictResolver {
    /// Create a resolver; `sequence_heuristic` enables the RBF sequence rule.
    pub fn new(sequence_heuristic: bool) -> Self {
        Self { sequence_heuristic }
    }

    /// Active transactions spending any outpoint `transaction` spends.
    fn conflicting_transactions<R: LedgerReader + ?Sized>(
        &self,
        transaction: &FullTransaction,
        ledger: &R,
    ) -> Vec<FullTransaction> {
        let own_hash = transaction.hash();
        let mut hashes: Vec<Hash> = Vec::new();
        for outpoint in transaction.spent_outpoints() {
            for input in ledger.inputs_spending(&outpoint) {
                if input.transaction_hash != own_hash && !hashes.contains(&input.transaction_hash) {
                    hashes.push(input.transaction_hash);
                }
            }
        }
        hashes
            .iter()
            .filter_map(|hash| ledger.full_transaction(hash))
            .collect()
    }

    /// Pending transactions that lose to `transaction` now that it is confirmed.
    pub fn conflicts_with_block_transaction<R: LedgerReader + ?Sized>(
        &self,
        transaction: &FullTransaction,
        ledger: &R,
    ) -> Vec<FullTransaction> {
        self.conflicting_transactions(transaction, ledger)
            .into_iter()
            .filter(|existing| existing.header.is_pending())
            .collect()
    }

    /// Pending transactions superseded by the mempool transaction `transaction`.
    ///
    /// Empty when any conflicting transaction is already confirmed: the
    /// incoming transaction can then never confirm itself.
    pub fn conflicts_with_pending_transaction<R: LedgerReader + ?Sized>(
        &self,
        transaction: &FullTransaction,
        ledger: &R,
    ) -> Vec<FullTransaction> {
        let conflicting = self.conflicting_transactions(transaction, ledger);
        if !conflicting.iter().all(|existing| existing.header.is_pending()) {
            return Vec::new();
        }
        conflicting
            .into_iter()
            .filter(|existing| !self.existing_has_higher_sequence(transaction, existing))
            .collect()
    }

    /// Whether a pending conflict of `transaction` already replaced it.
    pub fn is_transaction_replaced<R: LedgerReader + ?Sized>(
        &self,
        transaction: &FullTransaction,
        ledger: &R,
    ) -> bool {
        let conflicting = self.conflicting_transactions(transaction, ledger);
        if conflicting.is_empty() || !conflicting.iter().all(|c| c.header.is_pending()) {
            return false;
        }
        conflicting
            .iter()
            .any(|existing| self.existing_has_higher_sequence(transaction, existing))
    }

    /// Pending incoming transactions double-spent by `transaction`.
    ///
    /// Used when `transaction` is foreign: a third party spent the coins
    /// that were about to pay the wallet.
    pub fn incoming_pending_conflicts<R: LedgerReader + ?Sized>(
        &self,
        transaction: &FullTransaction,
        ledger: &R,
    ) -> Vec<FullTransaction> {
        let own_hash = transaction.hash();
        ledger
            .pending_transactions()
            .into_iter()
            .filter(|pending| {
                pending.hash() != own_hash
                    && !pending.header.is_outgoing
                    && pending.shares_input_with(transaction)
            })
            .collect()
    }

    /// For a shared outpoint, the existing input carries a higher sequence.
    pub fn existing_has_higher_sequence(
        &self,
        mempool: &FullTransaction,
        existing: &FullTransaction,
    ) -> bool {
        if !self.sequence_heuristic {
            return false;
        }
        existing.inputs.iter().any(|existing_input| {
            mempool
                .inputs
                .iter()
                .find(|input| input.outpoint() == existing_input.outpoint())
                .is_some_and(|input| existing_input.sequence > input.sequence)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LedgerState;
    use crate::domain::fixtures::{hash, tx};
    use crate::ports::LedgerStore;
    use shared_types::{Transaction, SEQUENCE_RBF};

    fn ledger_with(transactions: Vec<FullTransaction>) -> LedgerState {
        let mut state = LedgerState::default();
        for transaction in transactions {
            state.insert_transaction(&transaction).unwrap();
        }
        state
    }

    fn confirmed(mut transaction: FullTransaction) -> FullTransaction {
        transaction.header.block_hash = Some(hash(200));
        transaction
    }

    #[test]
    fn test_block_conflicts_are_pending_only() {
        let pending = tx(2).spend(1, 0).receive(900).build();
        let in_block = confirmed(tx(3).spend(1, 1).receive(900).build());
        let ledger = ledger_with(vec![pending, in_block]);

        let incoming = tx(4).spend(1, 0).spend(1, 1).pay(1_700).build();
        let resolver = ConflictResolver::new(true);
        let conflicts = resolver.conflicts_with_block_transaction(&incoming, &ledger);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].hash(), hash(2));
    }

    #[test]
    fn test_transaction_never_conflicts_with_itself() {
        let existing = tx(2).spend(1, 0).receive(900).build();
        let ledger = ledger_with(vec![existing.clone()]);

        let resolver = ConflictResolver::new(true);
        assert!(resolver.conflicts_with_block_transaction(&existing, &ledger).is_empty());
        assert!(resolver.conflicts_with_pending_transaction(&existing, &ledger).is_empty());
    }

    #[test]
    fn test_pending_conflicts_empty_when_any_confirmed() {
        let pending = tx(2).spend(1, 0).receive(900).build();
        let in_block = confirmed(tx(3).spend(1, 1).receive(900).build());
        let ledger = ledger_with(vec![pending, in_block]);

        let incoming = tx(4).spend(1, 0).spend(1, 1).pay(1_700).build();
        let resolver = ConflictResolver::new(true);
        assert!(resolver
            .conflicts_with_pending_transaction(&incoming, &ledger)
            .is_empty());
    }

    #[test]
    fn test_higher_existing_sequence_is_not_superseded() {
        let replacement = tx(2).spend_with_sequence(1, 0, SEQUENCE_RBF + 1).pay(800).build();
        let ledger = ledger_with(vec![replacement]);

        let original = tx(3).spend_with_sequence(1, 0, SEQUENCE_RBF).pay(900).build();
        let resolver = ConflictResolver::new(true);

        assert!(resolver
            .conflicts_with_pending_transaction(&original, &ledger)
            .is_empty());
        assert!(resolver.is_transaction_replaced(&original, &ledger));
    }

    #[test]
    fn test_lower_existing_sequence_is_superseded() {
        let original = tx(2).spend_with_sequence(1, 0, SEQUENCE_RBF).pay(900).build();
        let ledger = ledger_with(vec![original]);

        let replacement = tx(3).spend_with_sequence(1, 0, SEQUENCE_RBF + 1).pay(800).build();
        let resolver = ConflictResolver::new(true);
        let conflicts = resolver.conflicts_with_pending_transaction(&replacement, &ledger);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].hash(), hash(2));
        assert!(!resolver.is_transaction_replaced(&replacement, &ledger));
    }

    #[test]
    fn test_heuristic_disabled_reports_every_pending_conflict() {
        let replacement = tx(2).spend_with_sequence(1, 0, SEQUENCE_RBF + 1).pay(800).build();
        let ledger = ledger_with(vec![replacement]);

        let original = tx(3).spend_with_sequence(1, 0, SEQUENCE_RBF).pay(900).build();
        let resolver = ConflictResolver::new(false);

        assert_eq!(
            resolver
                .conflicts_with_pending_transaction(&original, &ledger)
                .len(),
            1
        );
        assert!(!resolver.is_transaction_replaced(&original, &ledger));
    }

    #[test]
    fn test_sequence_only_compared_on_shared_inputs() {
        // Existing outranks on 1:0 only; its unrelated input 5:0 is irrelevant.
        let existing = tx(2)
            .spend_with_sequence(1, 0, 10)
            .spend_with_sequence(5, 0, 1)
            .pay(800)
            .build();
        let incoming = tx(3)
            .spend_with_sequence(1, 0, 5)
            .spend_with_sequence(6, 0, 100)
            .pay(900)
            .build();

        let resolver = ConflictResolver::new(true);
        assert!(resolver.existing_has_higher_sequence(&incoming, &existing));
        assert!(!resolver.existing_has_higher_sequence(&existing, &incoming));
    }

    #[test]
    fn test_incoming_pending_conflicts() {
        let mut incoming = tx(2).spend(1, 0).receive(900).build();
        incoming.header.is_mine = true;
        let mut outgoing = tx(3).spend(1, 1).pay(900).build();
        outgoing.header = Transaction {
            is_mine: true,
            is_outgoing: true,
            ..outgoing.header
        };
        let ledger = ledger_with(vec![incoming, outgoing]);

        let double_spend = tx(4).spend(1, 0).spend(1, 1).pay(1_800).build();
        let resolver = ConflictResolver::new(true);
        let conflicts = resolver.incoming_pending_conflicts(&double_spend, &ledger);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].hash(), hash(2));
    }
}
