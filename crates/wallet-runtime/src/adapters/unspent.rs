//! # Ledger Output Provider
//!
//! Serves spendable outputs to coin selection straight from the ledger.

use shared_types::UnspentOutput;
use std::sync::Arc;
use sw_01_transaction_processing::{Ledger, LedgerReader};
use sw_02_coin_selection::{UnspentOutputProvider, UtxoFilters};

/// Unspent wallet outputs read from the ledger.
///
/// Outputs with fewer than `min_confirmations` confirmations are withheld,
/// except change of the wallet's own outgoing transactions.
pub struct LedgerUnspentOutputs<L: Ledger> {
    ledger: Arc<L>,
    min_confirmations: u32,
}

impl<L: Ledger> LedgerUnspentOutputs<L> {
    /// Provider over `ledger`.
    pub fn new(ledger: Arc<L>, min_confirmations: u32) -> Self {
        Self {
            ledger,
            min_confirmations,
        }
    }

    fn confirmed_enough(&self, unspent: &UnspentOutput, tip: Option<u32>) -> bool {
        if self.min_confirmations == 0
            || (unspent.transaction.is_outgoing && unspent.output.change_output)
        {
            return true;
        }
        let confirmations = match (unspent.block_height, tip) {
            (Some(height), Some(tip)) => tip.saturating_sub(height) + 1,
            _ => 0,
        };
        confirmations >= self.min_confirmations
    }
}

impl<L: Ledger> UnspentOutputProvider for LedgerUnspentOutputs<L> {
    fn spendable_utxo(&self, filters: &UtxoFilters) -> Vec<UnspentOutput> {
        self.ledger.read(|store| {
            let tip = store.last_block().map(|block| block.height);
            store
                .unspent_outputs()
                .into_iter()
                .filter(|unspent| self.confirmed_enough(unspent, tip))
                .filter(|unspent| {
                    let parent_outputs = store
                        .full_transaction(&unspent.transaction.hash)
                        .map_or(1, |parent| parent.outputs.len());
                    filters.accepts(unspent, parent_outputs)
                })
                .collect()
        })
    }
}
