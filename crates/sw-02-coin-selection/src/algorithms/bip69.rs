//! # BIP69 Ordering
//!
//! Deterministic lexicographic ordering of inputs and outputs so that the
//! layout of a transaction leaks nothing about which output is change.

use std::cmp::Ordering;

use shared_types::UnspentOutput;

use crate::domain::PlannedOutput;

/// Shorter first, then bytewise.
fn compare_payload(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Order inputs by previous transaction hash, then output index.
pub fn sort_inputs(inputs: &mut [UnspentOutput]) {
    inputs.sort_by(|a, b| {
        a.output
            .transaction_hash
            .cmp(&b.output.transaction_hash)
            .then_with(|| a.output.index.cmp(&b.output.index))
    });
}

/// Order outputs by value, then locking script payload.
pub fn sort_outputs(outputs: &mut [PlannedOutput]) {
    outputs.sort_by(|a, b| {
        a.value.cmp(&b.value).then_with(|| {
            compare_payload(
                &a.target.locking_script_payload,
                &b.target.locking_script_payload,
            )
        })
    });
}
