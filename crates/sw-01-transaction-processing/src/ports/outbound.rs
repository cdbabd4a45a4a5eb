//! # Outbound Ports
//!
//! Traits for external dependencies: ledger storage, key management,
//! bloom filter regeneration and ledger change listeners.

use parking_lot::Mutex;
use shared_types::{
    Block, FullTransaction, Hash, Input, InvalidTransaction, KeyPath, Outpoint, Output,
    StorageError, Transaction, TransactionStatus, UnspentOutput,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::ProcessingError;

/// Read access to the wallet ledger.
pub trait LedgerReader {
    /// Header of an active transaction.
    fn transaction(&self, hash: &Hash) -> Option<Transaction>;

    /// Active transaction with inputs and outputs.
    fn full_transaction(&self, hash: &Hash) -> Option<FullTransaction>;

    /// Entry of the invalid set.
    fn invalid_transaction(&self, hash: &Hash) -> Option<InvalidTransaction>;

    /// Output of an active transaction.
    fn output(&self, outpoint: &Outpoint) -> Option<Output>;

    /// Inputs of active transactions spending `outpoint`.
    fn inputs_spending(&self, outpoint: &Outpoint) -> Vec<Input>;

    /// Active transactions spending any output of `hash`.
    fn spenders_of(&self, hash: &Hash) -> Vec<Hash>;

    /// Active transactions not yet confirmed in a block.
    fn pending_transactions(&self) -> Vec<FullTransaction>;

    /// Active transactions in the given state.
    fn transactions_with_status(&self, status: TransactionStatus) -> Vec<FullTransaction>;

    /// Wallet-owned outputs of active transactions.
    fn wallet_outputs(&self) -> Vec<Output>;

    /// Wallet-owned outputs no active transaction spends.
    fn unspent_outputs(&self) -> Vec<UnspentOutput>;

    /// Stored block.
    fn block(&self, hash: &Hash) -> Option<Block>;

    /// Highest stored block.
    fn last_block(&self) -> Option<Block>;
}

/// Write access to the wallet ledger inside one atomic batch.
pub trait LedgerStore: LedgerReader {
    /// Store a new transaction with its inputs and outputs.
    fn insert_transaction(&mut self, transaction: &FullTransaction) -> Result<(), StorageError>;

    /// Replace a stored transaction.
    fn update_transaction(&mut self, transaction: &FullTransaction) -> Result<(), StorageError>;

    /// Replace a stored header only.
    fn update_header(&mut self, header: &Transaction) -> Result<(), StorageError>;

    /// Remove a transaction from the active ledger.
    fn delete_transaction(&mut self, hash: &Hash) -> Result<FullTransaction, StorageError>;

    /// Add an entry to the invalid set.
    fn insert_invalid(&mut self, invalid: InvalidTransaction) -> Result<(), StorageError>;

    /// Remove an entry from the invalid set.
    fn delete_invalid(&mut self, hash: &Hash) -> Result<(), StorageError>;

    /// Flag an output whose spender was invalidated.
    fn set_failed_to_spend(&mut self, outpoint: &Outpoint, failed: bool)
        -> Result<(), StorageError>;

    /// Insert or replace a block.
    fn upsert_block(&mut self, block: &Block) -> Result<(), StorageError>;
}

/// Persistent ledger with batch atomicity.
///
/// `write` applies every change made by `batch` or none of them; readers
/// never observe a partially applied batch.
pub trait Ledger: Send + Sync {
    /// Concrete store handed to closures.
    type Store: LedgerStore;

    /// Run `f` against a consistent view.
    fn read<R>(&self, f: impl FnOnce(&Self::Store) -> R) -> R;

    /// Run `batch`, committing only when it returns `Ok`.
    fn write<R>(
        &self,
        batch: impl FnOnce(&mut Self::Store) -> Result<R, ProcessingError>,
    ) -> Result<R, ProcessingError>;
}

/// HD key manager - outbound port.
pub trait PublicKeyManager: Send + Sync {
    /// Whether used keys moved the gap so new keys must be watched.
    fn gap_shifts(&self) -> bool;

    /// Record keys that received or sent funds.
    fn mark_used(&self, key_paths: &[KeyPath]);

    /// Derive keys until the gap limit is satisfied again.
    fn fill_gap(&self) -> Result<(), ProcessingError>;
}

/// Bloom filter manager - outbound port.
pub trait BloomFilterManager: Send + Sync {
    /// Rebuild the filter with these outpoint elements on top of wallet keys.
    fn regenerate(&self, watch_elements: Vec<Vec<u8>>);
}

/// Ledger change notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerUpdate {
    /// Newly stored headers.
    pub inserted: Vec<Transaction>,
    /// Changed headers.
    pub updated: Vec<Transaction>,
    /// Headers moved to the invalid set.
    pub invalidated: Vec<Transaction>,
    /// Block the batch belongs to.
    pub block: Option<Block>,
}

/// Ledger listener - outbound port.
pub trait LedgerListener: Send + Sync {
    /// Called after a batch commits with at least one change.
    fn on_update(&self, update: &LedgerUpdate);

    /// Called after commit for each transaction the batch extracted,
    /// foreign ones included.
    fn on_receive(&self, _transaction: &FullTransaction) {}
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock key manager for testing.
#[derive(Default)]
pub struct MockPublicKeyManager {
    /// Value returned by `gap_shifts`.
    pub gap_shifts: AtomicBool,
    /// Keys reported through `mark_used`.
    pub used: Mutex<Vec<KeyPath>>,
    /// Number of `fill_gap` calls.
    pub fill_gap_calls: AtomicUsize,
}

impl MockPublicKeyManager {
    /// Set the value returned by `gap_shifts`.
    pub fn set_gap_shifts(&self, shifts: bool) {
        self.gap_shifts.store(shifts, Ordering::SeqCst);
    }
}

impl PublicKeyManager for MockPublicKeyManager {
    fn gap_shifts(&self) -> bool {
        self.gap_shifts.load(Ordering::SeqCst)
    }

    fn mark_used(&self, key_paths: &[KeyPath]) {
        self.used.lock().extend_from_slice(key_paths);
    }

    fn fill_gap(&self) -> Result<(), ProcessingError> {
        self.fill_gap_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock bloom filter manager recording every regeneration.
#[derive(Default)]
pub struct MockBloomFilterManager {
    /// Element sets passed to `regenerate`.
    pub regenerations: Mutex<Vec<Vec<Vec<u8>>>>,
}

impl MockBloomFilterManager {
    /// Number of regenerations requested.
    pub fn regeneration_count(&self) -> usize {
        self.regenerations.lock().len()
    }
}

impl BloomFilterManager for MockBloomFilterManager {
    fn regenerate(&self, watch_elements: Vec<Vec<u8>>) {
        self.regenerations.lock().push(watch_elements);
    }
}

/// Listener recording every update.
#[derive(Default)]
pub struct RecordingListener {
    /// Updates received so far.
    pub updates: Mutex<Vec<LedgerUpdate>>,
    /// Hashes passed to `on_receive`.
    pub received: Mutex<Vec<Hash>>,
}

impl LedgerListener for RecordingListener {
    fn on_update(&self, update: &LedgerUpdate) {
        self.updates.lock().push(update.clone());
    }

    fn on_receive(&self, transaction: &FullTransaction) {
        self.received.lock().push(transaction.hash());
    }
}
