//! # Outbound Ports
//!
//! Size and dust estimation and the source of spendable outputs.

use shared_types::{Output, ScriptType, UnspentOutput};

use crate::domain::UtxoFilters;

/// Transaction size estimation - outbound port.
///
/// Sizes are virtual bytes: witness data counts a quarter.
pub trait SizeCalculator: Send + Sync {
    /// Virtual size of a transaction spending `previous_outputs` into
    /// outputs of `output_script_types`, plus an optional data-carrier
    /// output of `plugin_data_output_size` bytes.
    fn transaction_size(
        &self,
        previous_outputs: &[Output],
        output_script_types: &[ScriptType],
        plugin_data_output_size: usize,
    ) -> u64;

    /// Serialized size of an output of `script_type`.
    fn output_size(&self, script_type: ScriptType) -> u64;

    /// Non-witness size of an input spending `previous_output`.
    fn input_size(&self, previous_output: &Output) -> u64;

    /// Witness size of an input spending an output of `script_type`.
    fn witness_size(&self, script_type: ScriptType) -> u64;
}

/// Dust threshold - outbound port.
pub trait DustCalculator: Send + Sync {
    /// Smallest economic value for an output of `script_type`. A caller
    /// supplied `dust_threshold` wins when larger.
    fn dust(&self, script_type: ScriptType, dust_threshold: Option<u64>) -> u64;
}

/// Spendable wallet outputs - outbound port.
pub trait UnspentOutputProvider: Send + Sync {
    /// Spendable outputs passing `filters`.
    fn spendable_utxo(&self, filters: &UtxoFilters) -> Vec<UnspentOutput>;
}
