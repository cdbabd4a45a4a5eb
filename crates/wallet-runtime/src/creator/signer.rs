//! # Signer Port
//!
//! Turns an unsigned [`TransactionPlan`] into a signed transaction. Key
//! handling and script construction live with the implementor.

use shared_types::{
    double_sha256, FullTransaction, Input, Output, Transaction, TransactionStatus,
};
use std::sync::atomic::{AtomicBool, Ordering};
use sw_02_coin_selection::TransactionPlan;
use thiserror::Error;

/// Signing failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SignError(pub String);

/// Transaction signer - outbound port.
pub trait TransactionSigner: Send + Sync {
    /// Sign every input of `plan`.
    fn sign(&self, plan: &TransactionPlan) -> Result<FullTransaction, SignError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Signer producing unsigned-but-complete transactions.
///
/// The hash commits to the spent outpoints, the sequence and every output,
/// so distinct plans yield distinct transactions.
#[derive(Default)]
pub struct MockSigner {
    fail: AtomicBool,
}

impl MockSigner {
    /// Signer that refuses every plan.
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
        }
    }
}

impl TransactionSigner for MockSigner {
    fn sign(&self, plan: &TransactionPlan) -> Result<FullTransaction, SignError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SignError("signing key unavailable".into()));
        }

        let mut preimage = Vec::new();
        for unspent in &plan.inputs {
            preimage.extend(unspent.outpoint().to_bytes());
        }
        preimage.extend(plan.sequence.to_le_bytes());
        for output in &plan.outputs {
            preimage.extend(output.value.to_le_bytes());
            preimage.extend(&output.target.locking_script_payload);
        }

        let header = Transaction {
            hash: double_sha256(&preimage),
            version: 1,
            status: TransactionStatus::New,
            segwit: plan
                .inputs
                .iter()
                .any(|unspent| unspent.output.script_type.is_witness()),
            ..Transaction::default()
        };
        let inputs = plan
            .inputs
            .iter()
            .map(|unspent| Input::new(unspent.outpoint(), plan.sequence))
            .collect();
        let outputs = plan
            .outputs
            .iter()
            .enumerate()
            .map(|(index, planned)| {
                let mut output = Output::new(planned.value, index as u32, planned.target.script_type);
                output.locking_script_payload = Some(planned.target.locking_script_payload.clone());
                match planned.key_path() {
                    Some(key_path) => output.owned_by(key_path),
                    None => output,
                }
            })
            .collect();

        Ok(FullTransaction::new(header, inputs, outputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{KeyPath, Outpoint, ScriptType, UnspentOutput, SEQUENCE_RBF};
    use sw_02_coin_selection::{OutputTarget, PlannedOutput};

    fn plan(value: u64) -> TransactionPlan {
        let mut funding = Output::new(10_000, 0, ScriptType::P2pkh).owned_by(KeyPath::receive(0, 0));
        funding.transaction_hash = [1; 32];
        TransactionPlan {
            inputs: vec![UnspentOutput {
                output: funding,
                key_path: KeyPath::receive(0, 0),
                transaction: Transaction::default(),
                block_height: Some(1),
            }],
            sequence: SEQUENCE_RBF,
            outputs: vec![
                PlannedOutput {
                    value,
                    target: OutputTarget::new(ScriptType::P2pkh, vec![0xAA; 20]),
                },
                PlannedOutput {
                    value: 9_000 - value,
                    target: OutputTarget::change(ScriptType::P2pkh, vec![0xCC; 20], KeyPath::change(0, 0)),
                },
            ],
            fee: 1_000,
        }
    }

    #[test]
    fn test_sign_mirrors_plan() {
        let signed = MockSigner::default().sign(&plan(4_000)).unwrap();

        assert_eq!(signed.inputs.len(), 1);
        assert_eq!(signed.inputs[0].outpoint(), Outpoint::new([1; 32], 0));
        assert_eq!(signed.inputs[0].sequence, SEQUENCE_RBF);
        assert_eq!(signed.outputs[0].value, 4_000);
        assert!(!signed.outputs[0].is_mine());
        assert!(signed.outputs[1].change_output);
        assert_eq!(signed.outputs[1].transaction_hash, signed.hash());
    }

    #[test]
    fn test_distinct_plans_distinct_hashes() {
        let signer = MockSigner::default();
        assert_ne!(
            signer.sign(&plan(4_000)).unwrap().hash(),
            signer.sign(&plan(5_000)).unwrap().hash()
        );
    }

    #[test]
    fn test_failing_signer() {
        assert!(MockSigner::failing().sign(&plan(4_000)).is_err());
    }
}
