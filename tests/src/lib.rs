//! # SPV Wallet Core Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs   # Ledger transactions and wallet harness
//!     ├── flows.rs      # Receive → pay → relay → confirm, conflicts
//!     ├── broadcast.rs  # Retries, API path, ledger feedback
//!     └── selection.rs  # Coin selection over a live ledger
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sw-tests
//! cargo test -p sw-tests integration::flows
//! ```

#![allow(unused_variables)]
#![allow(dead_code)]

pub mod integration;
