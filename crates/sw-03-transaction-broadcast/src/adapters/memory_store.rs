//! In-memory sent-transaction store.

use parking_lot::RwLock;
use shared_types::{Hash, SentTransaction, StorageError};
use std::collections::HashMap;

use crate::ports::SentTransactionStore;

/// Sent-transaction records kept in a hash map.
#[derive(Default)]
pub struct InMemorySentTransactionStore {
    records: RwLock<HashMap<Hash, SentTransaction>>,
}

impl InMemorySentTransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl SentTransactionStore for InMemorySentTransactionStore {
    fn sent_transaction(&self, hash: &Hash) -> Option<SentTransaction> {
        self.records.read().get(hash).cloned()
    }

    fn save(&self, record: SentTransaction) -> Result<(), StorageError> {
        self.records.write().insert(record.hash, record);
        Ok(())
    }

    fn delete(&self, hash: &Hash) -> Result<(), StorageError> {
        self.records.write().remove(hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_replaces() {
        let store = InMemorySentTransactionStore::new();
        let mut record = SentTransaction::new([1u8; 32], 10);
        store.save(record.clone()).unwrap();
        record.retries_count = 2;
        store.save(record).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.sent_transaction(&[1u8; 32]).unwrap().retries_count, 2);
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let store = InMemorySentTransactionStore::new();
        assert!(store.delete(&[9u8; 32]).is_ok());
        assert!(store.is_empty());
    }
}
