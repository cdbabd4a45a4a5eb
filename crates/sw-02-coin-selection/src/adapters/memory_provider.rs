//! # In-Memory Output Provider

use shared_types::UnspentOutput;

use crate::domain::UtxoFilters;
use crate::ports::UnspentOutputProvider;

/// Fixed set of spendable outputs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUnspentOutputProvider {
    /// Output with the output count of its parent transaction.
    entries: Vec<(UnspentOutput, usize)>,
}

impl InMemoryUnspentOutputProvider {
    /// Provider over `outputs`, each treated as the only output of its
    /// parent.
    pub fn new(outputs: Vec<UnspentOutput>) -> Self {
        Self {
            entries: outputs.into_iter().map(|output| (output, 1)).collect(),
        }
    }

    /// Add an output whose parent transaction has `parent_outputs` outputs.
    pub fn with_parent_outputs(mut self, output: UnspentOutput, parent_outputs: usize) -> Self {
        self.entries.push((output, parent_outputs));
        self
    }
}

impl UnspentOutputProvider for InMemoryUnspentOutputProvider {
    fn spendable_utxo(&self, filters: &UtxoFilters) -> Vec<UnspentOutput> {
        self.entries
            .iter()
            .filter(|(output, parent_outputs)| filters.accepts(output, *parent_outputs))
            .map(|(output, _)| output.clone())
            .collect()
    }
}
