//! # Coin Selection Configuration

use serde::{Deserialize, Serialize};
use shared_types::ScriptType;

/// Fee rate (sat/byte) used to price dust.
pub const DEFAULT_MIN_FEE_RATE: u64 = 3;

/// Coin selection configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum inputs per transaction. When more are needed the smallest
    /// selected output is dropped in favour of the next larger one.
    pub outputs_limit: Option<usize>,

    /// See [`DEFAULT_MIN_FEE_RATE`].
    pub min_fee_rate: u64,

    /// Payment script type when the request does not name one.
    pub default_output_script_type: ScriptType,

    /// Change script type when the request does not name one.
    pub default_change_script_type: ScriptType,

    /// Confirmations an output needs before it is spendable. Change of the
    /// wallet's own outgoing transactions is exempt.
    pub min_confirmations: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            outputs_limit: None,
            min_fee_rate: DEFAULT_MIN_FEE_RATE,
            default_output_script_type: ScriptType::P2pkh,
            default_change_script_type: ScriptType::P2pkh,
            min_confirmations: 0,
        }
    }
}

impl SelectionConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self::default()
    }
}
