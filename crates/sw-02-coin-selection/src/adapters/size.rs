//! # Standard Size Calculator
//!
//! Virtual-size estimate for standard single-key scripts. Computed in
//! weight units (non-witness bytes count four, witness bytes one) and
//! rounded up to whole virtual bytes.

use shared_types::{Output, ScriptType};

use crate::ports::SizeCalculator;

/// Version, input count, output count and lock time, in weight units.
const LEGACY_TX_WEIGHT: u64 = 40;
/// Segwit marker and flag.
const SEGWIT_MARKER_WEIGHT: u64 = 2;
/// Previous outpoint, script length and sequence.
const INPUT_BASE_SIZE: u64 = 41;
/// Value and script length.
const OUTPUT_BASE_SIZE: u64 = 9;

/// DER signature with sighash byte, push opcode included.
const SIGNATURE_PUSH: u64 = 73;
/// Compressed public key with push opcode.
const PUBKEY_PUSH: u64 = 34;

const WITNESS_P2WPKH: u64 = 108;
const WITNESS_P2TR: u64 = 66;
/// Empty witness stack marker of a legacy input in a segwit transaction.
const WITNESS_EMPTY: u64 = 1;

/// Size calculator for standard scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSizeCalculator;

impl StandardSizeCalculator {
    /// Create a calculator.
    pub fn new() -> Self {
        Self
    }

    fn signature_script_size(previous_output: &Output) -> u64 {
        match previous_output.script_type {
            ScriptType::P2pk => SIGNATURE_PUSH,
            ScriptType::P2wpkh | ScriptType::P2tr | ScriptType::P2wsh => 0,
            // push of the 22-byte witness program
            ScriptType::P2wpkhSh => 23,
            ScriptType::P2sh => {
                let redeem = previous_output.redeem_script.as_ref().map_or(0, Vec::len) as u64;
                SIGNATURE_PUSH + PUBKEY_PUSH + 1 + redeem
            }
            ScriptType::P2pkh | ScriptType::NullData | ScriptType::Unknown => {
                SIGNATURE_PUSH + PUBKEY_PUSH
            }
        }
    }
}

impl SizeCalculator for StandardSizeCalculator {
    fn transaction_size(
        &self,
        previous_outputs: &[Output],
        output_script_types: &[ScriptType],
        plugin_data_output_size: usize,
    ) -> u64 {
        let segwit = previous_outputs
            .iter()
            .any(|output| output.script_type.is_witness());

        let mut weight = LEGACY_TX_WEIGHT;
        if segwit {
            weight += SEGWIT_MARKER_WEIGHT;
        }
        for previous_output in previous_outputs {
            weight += self.input_size(previous_output) * 4;
            if segwit {
                weight += self.witness_size(previous_output.script_type);
            }
        }
        for script_type in output_script_types {
            weight += self.output_size(*script_type) * 4;
        }
        weight += plugin_data_output_size as u64 * 4;

        weight.div_ceil(4)
    }

    fn output_size(&self, script_type: ScriptType) -> u64 {
        OUTPUT_BASE_SIZE + script_type.script_size() as u64
    }

    fn input_size(&self, previous_output: &Output) -> u64 {
        INPUT_BASE_SIZE + Self::signature_script_size(previous_output)
    }

    fn witness_size(&self, script_type: ScriptType) -> u64 {
        match script_type {
            ScriptType::P2wpkh | ScriptType::P2wpkhSh | ScriptType::P2wsh => WITNESS_P2WPKH,
            ScriptType::P2tr => WITNESS_P2TR,
            _ => WITNESS_EMPTY,
        }
    }
}
