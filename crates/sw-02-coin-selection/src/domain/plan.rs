//! # Transaction Plan
//!
//! Unsigned layout of a transaction: which outputs are spent with which
//! sequence, and what is paid where. Signing happens outside this crate.

use shared_types::{KeyPath, UnspentOutput, SEQUENCE_FINAL, SEQUENCE_RBF};

use crate::algorithms::{sort_inputs, sort_outputs};
use crate::domain::{OutputTarget, SelectedUnspentOutputs, SelectionError};

/// Output of a plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedOutput {
    /// Amount in satoshis.
    pub value: u64,
    /// Where it goes.
    pub target: OutputTarget,
}

impl PlannedOutput {
    /// Wallet key when this is change.
    pub fn key_path(&self) -> Option<KeyPath> {
        self.target.key_path
    }
}

/// Unsigned transaction layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionPlan {
    /// Spent outputs in input order.
    pub inputs: Vec<UnspentOutput>,
    /// Sequence of every input.
    pub sequence: u32,
    /// Outputs in final order.
    pub outputs: Vec<PlannedOutput>,
    /// Fee paid.
    pub fee: u64,
}

impl TransactionPlan {
    /// Lay out `selected` paying `recipient`, with change to `change`.
    pub fn build(
        selected: SelectedUnspentOutputs,
        recipient: OutputTarget,
        change: Option<OutputTarget>,
        bip69: bool,
        rbf_enabled: bool,
    ) -> Result<Self, SelectionError> {
        let fee = selected.fee();
        let mut outputs = vec![PlannedOutput {
            value: selected.recipient_value,
            target: recipient,
        }];

        if let Some(change_value) = selected.change_value {
            let target = change.ok_or_else(|| {
                SelectionError::InvalidParameters("change output requires a change target".into())
            })?;
            outputs.push(PlannedOutput {
                value: change_value,
                target,
            });
        }

        let mut inputs = selected.outputs;
        if bip69 {
            sort_inputs(&mut inputs);
            sort_outputs(&mut outputs);
        }

        Ok(Self {
            inputs,
            sequence: if rbf_enabled { SEQUENCE_RBF } else { SEQUENCE_FINAL },
            outputs,
            fee,
        })
    }

    /// Value of the change output, if any.
    pub fn change_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .find(|output| output.key_path().is_some())
            .map(|output| output.value)
    }
}
