//! # Wallet Runtime
//!
//! Assembles the wallet core out of its subsystems.
//!
//! ## Responsibilities
//!
//! - Aggregate configuration (`WalletConfig`), loaded from JSON and validated
//! - Adapters between subsystem ports (ledger → coin selection, syncer →
//!   broadcast, listeners → metrics)
//! - Transaction creation: select → sign → process → broadcast
//! - Lifecycle of the broadcast worker
//!
//! ## Subsystems
//!
//! | ID | Crate | Role |
//! |----|-------|------|
//! | 1 | `sw-01-transaction-processing` | Ledger ingestion, conflicts, invalidation |
//! | 2 | `sw-02-coin-selection` | Output selection and transaction plans |
//! | 3 | `sw-03-transaction-broadcast` | Peer selection, retries, send worker |
//!
//! ## Module Structure
//!
//! ```text
//! wallet-runtime/
//! ├── adapters/        # Port bridges and metrics listeners
//! ├── container/       # WalletConfig, WalletContainer
//! ├── creator/         # Signer port, TransactionCreator
//! └── errors.rs        # RuntimeError
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod creator;
pub mod errors;

// Re-exports
pub use adapters::{
    LedgerListeners, LedgerUnspentOutputs, MetricsBroadcastListener, MetricsLedgerListener,
    SyncerPendingSource,
};
pub use container::{ConfigError, WalletConfig, WalletContainer, WalletPorts};
pub use creator::{MockSigner, SendRequest, SignError, TransactionCreator, TransactionSigner};
pub use errors::RuntimeError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
