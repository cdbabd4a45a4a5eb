//! # Shared Types Crate
//!
//! This crate contains the wallet ledger data model shared by the
//! processing, coin selection and broadcast subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Ownership by key path**: An output is wallet-owned exactly when it
//!   carries a `KeyPath`.
//! - **Derived metadata**: `TransactionMetadata` is recomputed by extraction,
//!   never edited directly.

pub mod entities;
pub mod errors;
pub mod records;

pub use entities::*;
pub use errors::*;
pub use records::*;
