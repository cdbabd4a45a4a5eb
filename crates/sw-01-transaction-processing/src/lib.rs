//! # SW-01 Transaction Processing
//!
//! Applies transactions to the wallet ledger.
//!
//! **Subsystem ID:** 1  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every transaction the wallet sees, whether confirmed in a block,
//! announced by a peer's mempool or built locally, passes through here:
//! - ordered parents-first within its batch
//! - classified as the wallet's or foreign, with direction, amount and fee
//! - checked against conflicting spends of the same outpoints
//! - stored, or moved with its descendants to the invalid set
//!
//! ## Lifecycle
//!
//! | From | To | Trigger |
//! |------|----|---------|
//! | (none) | `New` | locally created |
//! | (none), `New` | `Relayed` | seen in mempool or block |
//! | `New`, `Relayed` | `Invalid` | confirmed conflict, explicit rejection |
//! | `Invalid` | `Relayed` | confirmed in a block (resurrection) |
//!
//! ## Module Structure
//!
//! ```text
//! sw-01-transaction-processing/
//! ├── domain/          # Ownership cache, metadata, conflicts, invalidation
//! ├── algorithms/      # Topological batch ordering
//! ├── ports/           # Processor API (inbound) + ledger, keys, filter (outbound)
//! ├── adapters/        # In-memory ledger
//! ├── application/     # Block, pending and created lanes, syncer
//! └── config.rs        # ProcessingConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{InMemoryLedger, LedgerState};
pub use algorithms::in_topological_order;
pub use application::{TransactionProcessingService, TransactionSyncer};
pub use config::{ProcessingConfig, DEFAULT_SPENT_OUTPUT_WATCH_DEPTH};
pub use domain::{
    resolve_inputs, ConflictResolver, IrregularOutputFinder, MetadataExtractor, OwnershipCache,
    ProcessOutcome, ProcessReport, ProcessingError, TransactionInvalidator,
    DEFAULT_IRREGULAR_SCRIPT_TYPES,
};
pub use ports::{
    BloomFilterManager, IngestContext, Ledger, LedgerListener, LedgerReader, LedgerStore,
    LedgerUpdate, MockBloomFilterManager, MockPublicKeyManager, PublicKeyManager,
    RecordingListener, TransactionProcessorApi,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
