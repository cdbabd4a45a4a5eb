//! Value objects for coin selection.

use serde::{Deserialize, Serialize};
use shared_types::{KeyPath, Outpoint, ScriptType, UnspentOutput};

/// Restrictions on which unspent outputs may be spent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoFilters {
    /// Only spend outputs of these script types. `None` allows all.
    pub script_types: Option<Vec<ScriptType>>,
    /// Only spend outputs whose parent transaction has at most this many
    /// outputs.
    pub max_outputs_count_for_inputs: Option<usize>,
}

impl UtxoFilters {
    /// Whether `unspent`, from a transaction with `parent_outputs` outputs,
    /// passes the filters.
    pub fn accepts(&self, unspent: &UnspentOutput, parent_outputs: usize) -> bool {
        let type_ok = self
            .script_types
            .as_ref()
            .map_or(true, |types| types.contains(&unspent.output.script_type));
        let count_ok = self
            .max_outputs_count_for_inputs
            .map_or(true, |max| parent_outputs <= max);
        type_ok && count_ok
    }
}

/// A send request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendParameters {
    /// Amount to send in satoshis.
    pub value: Option<u64>,
    /// Fee rate in sat/byte.
    pub fee_rate: u64,
    /// Fee is added on top of `value` when true, deducted from it otherwise.
    pub sender_pay: bool,
    /// Dust floor overriding the computed one when larger.
    pub dust_threshold: Option<u64>,
    /// Payment output script type. Falls back to the configured default.
    pub output_script_type: Option<ScriptType>,
    /// Change output script type. Falls back to the configured default.
    pub change_script_type: Option<ScriptType>,
    /// Size of an extra data-carrier output, 0 for none.
    pub plugin_data_output_size: usize,
    /// Restrict selection to these outpoints.
    pub unspent_outputs: Option<Vec<Outpoint>>,
    /// Filters applied by the output provider.
    pub utxo_filters: UtxoFilters,
    /// Signal replaceability through input sequences.
    pub rbf_enabled: bool,
    /// Order inputs and outputs per BIP69.
    pub bip69: bool,
}

impl SendParameters {
    /// Sender-pays request for `value` at `fee_rate`.
    pub fn new(value: u64, fee_rate: u64) -> Self {
        Self {
            value: Some(value),
            fee_rate,
            sender_pay: true,
            dust_threshold: None,
            output_script_type: None,
            change_script_type: None,
            plugin_data_output_size: 0,
            unspent_outputs: None,
            utxo_filters: UtxoFilters::default(),
            rbf_enabled: true,
            bip69: true,
        }
    }
}

/// Outcome of a successful selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedUnspentOutputs {
    /// Outputs to spend.
    pub outputs: Vec<UnspentOutput>,
    /// Value the recipient receives.
    pub recipient_value: u64,
    /// Change returned to the wallet, `None` when it would be dust.
    pub change_value: Option<u64>,
}

impl SelectedUnspentOutputs {
    /// Sum of selected output values.
    pub fn total_value(&self) -> u64 {
        self.outputs.iter().map(UnspentOutput::value).sum()
    }

    /// Fee paid by the plan; sub-dust change is absorbed into it.
    pub fn fee(&self) -> u64 {
        self.total_value()
            .saturating_sub(self.recipient_value)
            .saturating_sub(self.change_value.unwrap_or(0))
    }
}

/// Destination of a planned output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputTarget {
    /// Script type of the locking script.
    pub script_type: ScriptType,
    /// Hash or key the locking script commits to.
    pub locking_script_payload: Vec<u8>,
    /// Wallet key for change outputs.
    pub key_path: Option<KeyPath>,
}

impl OutputTarget {
    /// Foreign destination.
    pub fn new(script_type: ScriptType, locking_script_payload: Vec<u8>) -> Self {
        Self {
            script_type,
            locking_script_payload,
            key_path: None,
        }
    }

    /// Wallet change destination.
    pub fn change(script_type: ScriptType, locking_script_payload: Vec<u8>, key_path: KeyPath) -> Self {
        Self {
            script_type,
            locking_script_payload,
            key_path: Some(key_path),
        }
    }
}
