//! # Irregular Output Finder
//!
//! Some script types cannot be matched by a bloom filter built from public
//! keys alone; spends of such outputs are only relayed when the outpoint
//! itself is in the filter.

use shared_types::{Output, ScriptType};
use std::collections::HashSet;

use crate::ports::LedgerReader;

/// Script types watched by outpoint regardless of configuration.
pub const DEFAULT_IRREGULAR_SCRIPT_TYPES: [ScriptType; 4] = [
    ScriptType::P2wpkh,
    ScriptType::P2pk,
    ScriptType::P2wpkhSh,
    ScriptType::P2tr,
];

/// Detects wallet outputs that need outpoint watching.
#[derive(Debug, Clone)]
pub struct IrregularOutputFinder {
    script_types: HashSet<ScriptType>,
    watch_depth: u32,
}

impl IrregularOutputFinder {
    /// Finder over the default types plus `extra`.
    pub fn new(extra: &[ScriptType], watch_depth: u32) -> Self {
        let script_types = DEFAULT_IRREGULAR_SCRIPT_TYPES
            .iter()
            .chain(extra)
            .copied()
            .collect();
        Self {
            script_types,
            watch_depth,
        }
    }

    /// A wallet-owned output among `outputs` has an irregular type.
    pub fn has_irregular_output(&self, outputs: &[Output]) -> bool {
        outputs
            .iter()
            .any(|output| output.is_mine() && self.script_types.contains(&output.script_type))
    }

    /// Outpoint filter elements for irregular wallet outputs still worth
    /// watching: unspent, spent by a pending transaction, or spent less than
    /// `watch_depth` blocks below the best block.
    pub fn filter_elements<R: LedgerReader + ?Sized>(&self, ledger: &R) -> Vec<Vec<u8>> {
        let best_height = ledger.last_block().map(|block| block.height);

        ledger
            .wallet_outputs()
            .into_iter()
            .filter(|output| self.script_types.contains(&output.script_type))
            .filter(|output| {
                let spenders = ledger.inputs_spending(&output.outpoint());
                spenders.is_empty()
                    || spenders.iter().any(|input| {
                        let spent_at = ledger
                            .transaction(&input.transaction_hash)
                            .and_then(|tx| tx.block_hash)
                            .and_then(|hash| ledger.block(&hash))
                            .map(|block| block.height);
                        match (spent_at, best_height) {
                            (Some(spent_at), Some(best)) => {
                                best.saturating_sub(spent_at) < self.watch_depth
                            }
                            _ => true,
                        }
                    })
            })
            .map(|output| output.outpoint().to_bytes())
            .collect()
    }
}
