//! # Wallet Container
//!
//! Central container holding the subsystem instances with dependency
//! injection.
//!
//! - Subsystems are built in dependency order: processing, then selection
//!   over the processed ledger, then broadcast over the syncer
//! - Adapters implement the outbound ports of each subsystem

pub mod config;
pub mod wallet;

pub use config::{ConfigError, WalletConfig};
pub use wallet::{WalletContainer, WalletPorts};
