//! # Transaction Processing Configuration

use serde::{Deserialize, Serialize};
use shared_types::ScriptType;

/// Confirmations after which a spent irregular output stops being watched.
pub const DEFAULT_SPENT_OUTPUT_WATCH_DEPTH: u32 = 100;

/// Transaction processing configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Privacy mode: do not store purely incoming mempool transactions.
    pub ignore_incoming: bool,

    /// Let an existing pending transaction with a higher input sequence
    /// win over an incoming conflicting one.
    pub sequence_heuristic: bool,

    /// Capacity of the "not mine" hash cache used by the pending lane.
    pub not_mine_cache_capacity: usize,

    /// Maximum transactions accepted in one batch.
    pub max_batch_size: usize,

    /// Fail a batch whose transactions spend each other in a loop instead
    /// of silently truncating the loop.
    pub reject_cycles: bool,

    /// Script types that need outpoint watching in addition to the defaults.
    pub irregular_script_types: Vec<ScriptType>,

    /// See [`DEFAULT_SPENT_OUTPUT_WATCH_DEPTH`].
    pub spent_output_watch_depth: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            ignore_incoming: false,
            sequence_heuristic: true,
            not_mine_cache_capacity: 10_000,
            max_batch_size: 10_000,
            reject_cycles: true,
            irregular_script_types: Vec::new(),
            spent_output_watch_depth: DEFAULT_SPENT_OUTPUT_WATCH_DEPTH,
        }
    }
}

impl ProcessingConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            not_mine_cache_capacity: 16,
            max_batch_size: 100,
            spent_output_watch_depth: 6,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessingConfig::default();
        assert!(config.sequence_heuristic);
        assert!(config.reject_cycles);
        assert!(!config.ignore_incoming);
        assert_eq!(config.spent_output_watch_depth, 100);
    }

    #[test]
    fn test_testing_config() {
        let config = ProcessingConfig::for_testing();
        assert_eq!(config.max_batch_size, 100);
        assert_eq!(config.not_mine_cache_capacity, 16);
    }
}
