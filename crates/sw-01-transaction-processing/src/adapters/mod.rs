//! # Adapters
//!
//! Concrete implementations of outbound ports.

pub mod memory_ledger;

pub use memory_ledger::{InMemoryLedger, LedgerState};
