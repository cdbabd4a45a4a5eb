//! # Inbound Ports
//!
//! Coin selection API offered to the transaction creator.

use shared_types::UnspentOutput;

use crate::domain::{
    OutputTarget, SelectedUnspentOutputs, SelectionError, SendParameters, TransactionPlan,
    UtxoFilters,
};

/// Coin selection API - inbound port.
pub trait CoinSelectionApi: Send + Sync {
    /// Pick outputs covering `params.value` and the fee.
    fn select(&self, params: &SendParameters) -> Result<SelectedUnspentOutputs, SelectionError>;

    /// Select and lay out a complete unsigned transaction.
    fn plan(
        &self,
        params: &SendParameters,
        recipient: OutputTarget,
        change: Option<OutputTarget>,
    ) -> Result<TransactionPlan, SelectionError>;

    /// Largest value a recipient can receive spending every eligible output.
    /// Zero when nothing can be sent.
    fn max_spendable(&self, params: &SendParameters) -> u64;

    /// Smallest value that can be sent.
    fn min_spendable(&self, params: &SendParameters) -> u64;

    /// Spendable outputs passing `filters`.
    fn all(&self, filters: &UtxoFilters) -> Vec<UnspentOutput>;
}
