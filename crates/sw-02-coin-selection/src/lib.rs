//! # SW-02 Coin Selection
//!
//! Chooses which wallet outputs fund a payment.
//!
//! **Subsystem ID:** 2  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Given a value, a fee rate and the spendable outputs, find a set of
//! inputs such that `sum(inputs) >= value + fee`, where the fee depends on
//! the final input and output composition. Change below the dust threshold
//! is left to the miner instead of creating an unspendable output.
//!
//! | Rule | Effect |
//! |------|--------|
//! | Smallest first | Consolidates small outputs, limits dust growth |
//! | Failed last | Outputs whose earlier spend was invalidated are tried last |
//! | Dust pre-check | A sub-dust payment fails before any output is examined |
//! | Outputs limit | Sliding window drops the smallest input when full |
//!
//! ## Module Structure
//!
//! ```text
//! sw-02-coin-selection/
//! ├── domain/          # Send parameters, selection queue, transaction plan
//! ├── algorithms/      # BIP69 ordering
//! ├── ports/           # Selection API (inbound) + size, dust, outputs (outbound)
//! ├── adapters/        # Standard size and dust calculators, in-memory outputs
//! ├── application/     # CoinSelectionService
//! └── config.rs        # SelectionConfig
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
pub use adapters::{InMemoryUnspentOutputProvider, StandardDustCalculator, StandardSizeCalculator};
pub use algorithms::{sort_inputs, sort_outputs};
pub use application::CoinSelectionService;
pub use config::{SelectionConfig, DEFAULT_MIN_FEE_RATE};
pub use domain::{
    OutputTarget, PlannedOutput, QueueParameters, SelectedUnspentOutputs, SelectionError,
    SendParameters, TransactionPlan, UnspentOutputQueue, UtxoFilters,
};
pub use ports::{CoinSelectionApi, DustCalculator, SizeCalculator, UnspentOutputProvider};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
