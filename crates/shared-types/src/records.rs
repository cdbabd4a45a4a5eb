//! # Ledger Records
//!
//! Records stored alongside the active ledger: the invalid-transaction set
//! (with a replayable snapshot) and broadcast tracking.

use serde::{Deserialize, Serialize};

use crate::entities::{FullTransaction, Hash, Transaction, TransactionStatus, TransactionType};
use crate::errors::StorageError;

/// Summary stored as JSON next to an invalid transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// Hex transaction hash.
    pub transaction_hash: String,
    /// Lifecycle state at invalidation.
    pub status: TransactionStatus,
    /// Direction.
    pub transaction_type: TransactionType,
    /// Wallet-relative amount.
    pub amount: u64,
    /// Fee, when known.
    pub fee: Option<u64>,
    /// Hex hash of the confirming block.
    pub block_hash: Option<String>,
    /// Hex hash of the superseding transaction.
    pub conflicting_tx_hash: Option<String>,
}

impl TransactionInfo {
    fn of(transaction: &FullTransaction) -> Self {
        Self {
            transaction_hash: hex::encode(transaction.header.hash),
            status: transaction.header.status,
            transaction_type: transaction.metadata.transaction_type,
            amount: transaction.metadata.amount,
            fee: transaction.metadata.fee,
            block_hash: transaction.header.block_hash.map(hex::encode),
            conflicting_tx_hash: transaction.header.conflicting_tx_hash.map(hex::encode),
        }
    }
}

/// A transaction moved out of the active ledger.
///
/// Keeps a bincode snapshot of the full transaction so it can be restored
/// when the same hash is later confirmed in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidTransaction {
    /// Header as it was when invalidated.
    pub header: Transaction,
    /// Bincode-encoded `FullTransaction`.
    pub raw_transaction: Vec<u8>,
    /// JSON-encoded `TransactionInfo`.
    pub transaction_info_json: String,
}

impl InvalidTransaction {
    /// Snapshot `transaction`.
    pub fn snapshot(transaction: &FullTransaction) -> Result<Self, StorageError> {
        let raw_transaction = bincode::serialize(transaction)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let transaction_info_json = serde_json::to_string(&TransactionInfo::of(transaction))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(Self {
            header: transaction.header.clone(),
            raw_transaction,
            transaction_info_json,
        })
    }

    /// Decode the snapshot.
    pub fn restore(&self) -> Result<FullTransaction, StorageError> {
        bincode::deserialize(&self.raw_transaction)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Decode the JSON summary.
    pub fn info(&self) -> Result<TransactionInfo, StorageError> {
        serde_json::from_str(&self.transaction_info_json)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Broadcast tracking for a locally created transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentTransaction {
    /// Transaction hash.
    pub hash: Hash,
    /// First send attempt (unix millis).
    pub first_send_time: u64,
    /// Most recent send attempt (unix millis).
    pub last_send_time: u64,
    /// Completed send rounds.
    pub retries_count: u32,
    /// The latest round completed on at least one peer.
    pub send_success: bool,
}

impl SentTransaction {
    /// Record a first send attempt at `now`.
    pub fn new(hash: Hash, now: u64) -> Self {
        Self {
            hash,
            first_send_time: now,
            last_send_time: now,
            retries_count: 0,
            send_success: false,
        }
    }
}
