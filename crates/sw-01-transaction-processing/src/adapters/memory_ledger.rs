//! # In-Memory Ledger
//!
//! `Ledger` backed by hash maps. A batch runs against a draft copy taken
//! under the write lock and replaces the committed state only on success.

use parking_lot::RwLock;
use shared_types::{
    short_hex, Block, FullTransaction, Hash, Input, InvalidTransaction, Outpoint, Output,
    StorageError, Transaction, TransactionStatus, UnspentOutput,
};
use std::collections::HashMap;

use crate::domain::ProcessingError;
use crate::ports::{Ledger, LedgerReader, LedgerStore};

/// Ledger contents.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    transactions: HashMap<Hash, FullTransaction>,
    invalid: HashMap<Hash, InvalidTransaction>,
    blocks: HashMap<Hash, Block>,
    /// Spent outpoint -> spending transaction hashes.
    spends: HashMap<Outpoint, Vec<Hash>>,
}

impl LedgerState {
    /// Number of active transactions.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Number of invalid transactions.
    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    fn index_spends(&mut self, transaction: &FullTransaction) {
        for outpoint in transaction.spent_outpoints() {
            let spenders = self.spends.entry(outpoint).or_default();
            if !spenders.contains(&transaction.header.hash) {
                spenders.push(transaction.header.hash);
            }
        }
    }

    fn unindex_spends(&mut self, transaction: &FullTransaction) {
        for outpoint in transaction.spent_outpoints() {
            if let Some(spenders) = self.spends.get_mut(&outpoint) {
                spenders.retain(|hash| *hash != transaction.header.hash);
                if spenders.is_empty() {
                    self.spends.remove(&outpoint);
                }
            }
        }
    }

    fn missing(hash: &Hash) -> StorageError {
        StorageError::NotFound(format!("transaction {}", short_hex(hash)))
    }
}

impl LedgerReader for LedgerState {
    fn transaction(&self, hash: &Hash) -> Option<Transaction> {
        self.transactions.get(hash).map(|tx| tx.header.clone())
    }

    fn full_transaction(&self, hash: &Hash) -> Option<FullTransaction> {
        self.transactions.get(hash).cloned()
    }

    fn invalid_transaction(&self, hash: &Hash) -> Option<InvalidTransaction> {
        self.invalid.get(hash).cloned()
    }

    fn output(&self, outpoint: &Outpoint) -> Option<Output> {
        self.transactions
            .get(&outpoint.hash)
            .and_then(|tx| tx.outputs.get(outpoint.index as usize))
            .cloned()
    }

    fn inputs_spending(&self, outpoint: &Outpoint) -> Vec<Input> {
        let Some(spenders) = self.spends.get(outpoint) else {
            return Vec::new();
        };
        spenders
            .iter()
            .filter_map(|hash| self.transactions.get(hash))
            .flat_map(|tx| tx.inputs.iter().filter(|input| input.outpoint() == *outpoint))
            .cloned()
            .collect()
    }

    fn spenders_of(&self, hash: &Hash) -> Vec<Hash> {
        let Some(parent) = self.transactions.get(hash) else {
            return Vec::new();
        };
        let mut spenders = Vec::new();
        for output in &parent.outputs {
            for spender in self.spends.get(&output.outpoint()).into_iter().flatten() {
                if !spenders.contains(spender) {
                    spenders.push(*spender);
                }
            }
        }
        spenders
    }

    fn pending_transactions(&self) -> Vec<FullTransaction> {
        self.transactions
            .values()
            .filter(|tx| tx.header.is_pending() && tx.header.status != TransactionStatus::Invalid)
            .cloned()
            .collect()
    }

    fn transactions_with_status(&self, status: TransactionStatus) -> Vec<FullTransaction> {
        let mut matching: Vec<FullTransaction> = self
            .transactions
            .values()
            .filter(|tx| tx.header.status == status)
            .cloned()
            .collect();
        matching.sort_by_key(|tx| (tx.header.timestamp, tx.header.order));
        matching
    }

    fn wallet_outputs(&self) -> Vec<Output> {
        self.transactions
            .values()
            .flat_map(|tx| tx.my_outputs())
            .cloned()
            .collect()
    }

    fn unspent_outputs(&self) -> Vec<UnspentOutput> {
        let mut unspent = Vec::new();
        for tx in self.transactions.values() {
            let block_height = tx
                .header
                .block_hash
                .and_then(|hash| self.blocks.get(&hash))
                .map(|block| block.height);
            for output in tx.my_outputs() {
                let Some(key_path) = output.key_path else {
                    continue;
                };
                if self.spends.contains_key(&output.outpoint()) {
                    continue;
                }
                unspent.push(UnspentOutput {
                    output: output.clone(),
                    key_path,
                    transaction: tx.header.clone(),
                    block_height,
                });
            }
        }
        unspent
    }

    fn block(&self, hash: &Hash) -> Option<Block> {
        self.blocks.get(hash).cloned()
    }

    fn last_block(&self) -> Option<Block> {
        self.blocks.values().max_by_key(|block| block.height).cloned()
    }
}

impl LedgerStore for LedgerState {
    fn insert_transaction(&mut self, transaction: &FullTransaction) -> Result<(), StorageError> {
        let hash = transaction.header.hash;
        if self.transactions.contains_key(&hash) {
            return Err(StorageError::Duplicate(format!("transaction {}", short_hex(&hash))));
        }
        self.index_spends(transaction);
        self.transactions.insert(hash, transaction.clone());
        Ok(())
    }

    fn update_transaction(&mut self, transaction: &FullTransaction) -> Result<(), StorageError> {
        let hash = transaction.header.hash;
        let previous = self
            .transactions
            .remove(&hash)
            .ok_or_else(|| Self::missing(&hash))?;
        self.unindex_spends(&previous);
        self.index_spends(transaction);
        self.transactions.insert(hash, transaction.clone());
        Ok(())
    }

    fn update_header(&mut self, header: &Transaction) -> Result<(), StorageError> {
        let stored = self
            .transactions
            .get_mut(&header.hash)
            .ok_or_else(|| Self::missing(&header.hash))?;
        stored.header = header.clone();
        Ok(())
    }

    fn delete_transaction(&mut self, hash: &Hash) -> Result<FullTransaction, StorageError> {
        let removed = self
            .transactions
            .remove(hash)
            .ok_or_else(|| Self::missing(hash))?;
        self.unindex_spends(&removed);
        Ok(removed)
    }

    fn insert_invalid(&mut self, invalid: InvalidTransaction) -> Result<(), StorageError> {
        self.invalid.insert(invalid.header.hash, invalid);
        Ok(())
    }

    fn delete_invalid(&mut self, hash: &Hash) -> Result<(), StorageError> {
        self.invalid
            .remove(hash)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("invalid {}", short_hex(hash))))
    }

    fn set_failed_to_spend(
        &mut self,
        outpoint: &Outpoint,
        failed: bool,
    ) -> Result<(), StorageError> {
        let output = self
            .transactions
            .get_mut(&outpoint.hash)
            .and_then(|tx| tx.outputs.get_mut(outpoint.index as usize))
            .ok_or_else(|| {
                StorageError::NotFound(format!(
                    "output {}:{}",
                    short_hex(&outpoint.hash),
                    outpoint.index
                ))
            })?;
        output.failed_to_spend = failed;
        Ok(())
    }

    fn upsert_block(&mut self, block: &Block) -> Result<(), StorageError> {
        self.blocks.insert(block.hash, block.clone());
        Ok(())
    }
}

/// In-memory `Ledger`.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for InMemoryLedger {
    type Store = LedgerState;

    fn read<R>(&self, f: impl FnOnce(&Self::Store) -> R) -> R {
        f(&self.state.read())
    }

    fn write<R>(
        &self,
        batch: impl FnOnce(&mut Self::Store) -> Result<R, ProcessingError>,
    ) -> Result<R, ProcessingError> {
        let mut committed = self.state.write();
        let mut draft = committed.clone();
        let result = batch(&mut draft)?;
        *committed = draft;
        Ok(result)
    }
}
