//! # Adapter Implementations
//!
//! Glue between subsystem ports:
//!
//! ```text
//!   sw-01 ledger ──LedgerUnspentOutputs──▶ sw-02 UnspentOutputProvider
//!   sw-01 syncer ──SyncerPendingSource───▶ sw-03 PendingTransactionSource
//!   telemetry    ◀──Metrics*Listener────── sw-01 / sw-03 listeners
//! ```

pub mod listeners;
pub mod pending;
pub mod unspent;

pub use listeners::{LedgerListeners, MetricsBroadcastListener, MetricsLedgerListener};
pub use pending::SyncerPendingSource;
pub use unspent::LedgerUnspentOutputs;
