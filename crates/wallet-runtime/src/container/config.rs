//! # Wallet Configuration
//!
//! Unified configuration for all subsystems, loadable from a JSON file.
//! Every section is optional; missing fields take their defaults.
//!
//! ```json
//! {
//!   "processing": { "ignore_incoming": true },
//!   "selection": { "min_confirmations": 1 },
//!   "broadcast": { "max_retries": 5 }
//! }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use sw_01_transaction_processing::ProcessingConfig;
use sw_02_coin_selection::SelectionConfig;
use sw_03_transaction_broadcast::BroadcastConfig;
use thiserror::Error;
use wallet_telemetry::TelemetryConfig;

/// Complete wallet configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Transaction processing.
    pub processing: ProcessingConfig,
    /// Coin selection.
    pub selection: SelectionConfig,
    /// Transaction broadcast.
    pub broadcast: BroadcastConfig,
    /// Logging and metrics.
    pub telemetry: TelemetryConfig,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A limit that must be positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl WalletConfig {
    /// Create a config for testing (smaller values, short timers).
    pub fn for_testing() -> Self {
        Self {
            processing: ProcessingConfig::for_testing(),
            selection: SelectionConfig::for_testing(),
            broadcast: BroadcastConfig::for_testing(),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading wallet config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing wallet config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating wallet config {}", path.display()))?;
        Ok(config)
    }

    /// Reject limits that would stall a subsystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("processing.max_batch_size", self.processing.max_batch_size as u64),
            (
                "processing.not_mine_cache_capacity",
                self.processing.not_mine_cache_capacity as u64,
            ),
            ("selection.min_fee_rate", self.selection.min_fee_rate),
            (
                "selection.outputs_limit",
                self.selection.outputs_limit.map_or(1, |limit| limit as u64),
            ),
            ("broadcast.min_connected_peers", self.broadcast.min_connected_peers as u64),
            ("broadcast.max_retries", u64::from(self.broadcast.max_retries)),
            ("broadcast.timer_interval_ms", self.broadcast.timer_interval_ms),
            ("broadcast.channel_capacity", self.broadcast.channel_capacity as u64),
        ];
        match positive.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigError::Zero(field)),
            None => Ok(()),
        }
    }
}
