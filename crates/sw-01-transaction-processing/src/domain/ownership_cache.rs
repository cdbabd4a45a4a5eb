//! # Ownership Cache
//!
//! Values of wallet-owned outputs keyed by transaction hash and output
//! index. Grows monotonically within a session; rebuilt from the ledger
//! at startup.

use shared_types::{Hash, Outpoint, Output};
use std::collections::HashMap;

/// Wallet-owned, positive-value outputs seen so far.
#[derive(Debug, Clone, Default)]
pub struct OwnershipCache {
    outputs: HashMap<Hash, HashMap<u32, u64>>,
}

impl OwnershipCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored wallet outputs.
    pub fn from_outputs(outputs: &[Output]) -> Self {
        let mut cache = Self::new();
        cache.add(outputs);
        cache
    }

    /// Record the wallet-owned outputs among `outputs`. Returns how many were new.
    pub fn add(&mut self, outputs: &[Output]) -> usize {
        let mut added = 0;
        for output in outputs.iter().filter(|o| o.is_mine() && o.value > 0) {
            let previous = self
                .outputs
                .entry(output.transaction_hash)
                .or_default()
                .insert(output.index, output.value);
            if previous.is_none() {
                added += 1;
            }
        }
        added
    }

    /// Value of a wallet-owned output.
    pub fn value_of(&self, outpoint: &Outpoint) -> Option<u64> {
        self.outputs
            .get(&outpoint.hash)
            .and_then(|by_index| by_index.get(&outpoint.index))
            .copied()
    }

    /// Number of cached outputs.
    pub fn len(&self) -> usize {
        self.outputs.values().map(HashMap::len).sum()
    }

    /// Cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}
