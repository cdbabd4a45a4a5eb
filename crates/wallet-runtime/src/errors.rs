//! # Runtime Errors

use sw_01_transaction_processing::ProcessingError;
use sw_02_coin_selection::SelectionError;
use sw_03_transaction_broadcast::BroadcastError;
use thiserror::Error;
use wallet_telemetry::TelemetryError;

use crate::container::ConfigError;
use crate::creator::SignError;

/// Errors surfaced by the wallet runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Ledger ingestion failed.
    #[error("Processing error: {0}")]
    Processing(#[from] ProcessingError),

    /// No valid selection for the request.
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Broadcast refused or unavailable.
    #[error("Broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    /// The signer could not sign the plan.
    #[error("Signer error: {0}")]
    Signer(#[from] SignError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging or metrics could not start.
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: RuntimeError = BroadcastError::PeersNotSynced.into();
        assert!(matches!(err, RuntimeError::Broadcast(BroadcastError::PeersNotSynced)));

        let err: RuntimeError = SelectionError::NotEnough { fee: 226 }.into();
        assert!(err.to_string().starts_with("Selection error"));
    }
}
