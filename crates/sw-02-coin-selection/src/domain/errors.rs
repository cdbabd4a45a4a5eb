//! Error types for coin selection.

use thiserror::Error;

/// Coin selection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Request is malformed.
    #[error("Invalid send parameters: {0}")]
    InvalidParameters(String),

    /// Payment would be uneconomic to spend.
    #[error("Value {value} is below dust threshold {threshold}")]
    Dust {
        /// Value the recipient would receive.
        value: u64,
        /// Dust threshold for the payment script type.
        threshold: u64,
    },

    /// Spendable outputs do not cover value and fee.
    #[error("Not enough funds (fee estimate {fee})")]
    NotEnough {
        /// Fee of the last attempted plan.
        fee: u64,
    },

    /// No output has been pushed to the queue.
    #[error("No unspent outputs to spend")]
    EmptyOutputs,
}
