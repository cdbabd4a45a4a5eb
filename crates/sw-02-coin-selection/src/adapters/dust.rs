//! # Standard Dust Calculator
//!
//! An output is dust when spending it would cost more than it carries at
//! the minimum fee rate: its own size plus the input that spends it.

use shared_types::{Output, ScriptType};
use std::sync::Arc;

use crate::ports::{DustCalculator, SizeCalculator};

/// Dust threshold priced at a fixed minimum fee rate.
pub struct StandardDustCalculator {
    size: Arc<dyn SizeCalculator>,
    min_fee_rate: u64,
}

impl StandardDustCalculator {
    /// Create a calculator pricing dust at `min_fee_rate` sat/byte.
    pub fn new(size: Arc<dyn SizeCalculator>, min_fee_rate: u64) -> Self {
        Self { size, min_fee_rate }
    }
}

impl DustCalculator for StandardDustCalculator {
    fn dust(&self, script_type: ScriptType, dust_threshold: Option<u64>) -> u64 {
        let spend_size = if script_type.is_witness() {
            self.size.input_size(&Output::new(0, 0, ScriptType::P2wpkh))
                + self.size.witness_size(ScriptType::P2wpkh) / 4
        } else {
            self.size.input_size(&Output::new(0, 0, ScriptType::P2pkh))
        };
        let dust = (self.size.output_size(script_type) + spend_size) * self.min_fee_rate;

        dust_threshold.map_or(dust, |threshold| dust.max(threshold))
    }
}
