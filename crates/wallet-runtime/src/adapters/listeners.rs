//! # Metrics Listeners
//!
//! Record ledger and broadcast activity into the telemetry registry.

use shared_types::{short_hex, FullTransaction, Hash};
use std::sync::Arc;
use sw_01_transaction_processing::{LedgerListener, LedgerUpdate};
use sw_03_transaction_broadcast::BroadcastListener;
use tracing::warn;
use wallet_telemetry::{
    metric_add, metric_inc, API_BROADCASTS, BROADCAST_PEERS, BROADCAST_RETRIES_EXHAUSTED,
    BROADCAST_ROUNDS, TRANSACTIONS_INVALIDATED, TRANSACTIONS_PROCESSED,
};

/// Counts ledger changes per lane.
#[derive(Debug, Default)]
pub struct MetricsLedgerListener;

impl LedgerListener for MetricsLedgerListener {
    fn on_update(&self, update: &LedgerUpdate) {
        let lane = if update.block.is_some() { "block" } else { "mempool" };
        for (outcome, count) in [
            ("inserted", update.inserted.len()),
            ("updated", update.updated.len()),
            ("invalidated", update.invalidated.len()),
        ] {
            if count > 0 {
                metric_add!(TRANSACTIONS_PROCESSED, &[lane, outcome], count as f64);
            }
        }
        if !update.invalidated.is_empty() {
            metric_add!(TRANSACTIONS_INVALIDATED, update.invalidated.len() as f64);
        }
    }
}

/// Fans ledger notifications out to the metrics listener and an optional
/// application listener.
pub struct LedgerListeners {
    metrics: MetricsLedgerListener,
    user: Option<Arc<dyn LedgerListener>>,
}

impl LedgerListeners {
    /// Metrics only, plus `user` when given.
    pub fn new(user: Option<Arc<dyn LedgerListener>>) -> Self {
        Self {
            metrics: MetricsLedgerListener,
            user,
        }
    }
}

impl LedgerListener for LedgerListeners {
    fn on_update(&self, update: &LedgerUpdate) {
        self.metrics.on_update(update);
        if let Some(user) = &self.user {
            user.on_update(update);
        }
    }

    fn on_receive(&self, transaction: &FullTransaction) {
        if let Some(user) = &self.user {
            user.on_receive(transaction);
        }
    }
}

/// Records broadcast rounds and API results.
#[derive(Debug, Default)]
pub struct MetricsBroadcastListener;

impl BroadcastListener for MetricsBroadcastListener {
    fn on_round(&self, _transactions: usize, peers: usize) {
        metric_inc!(BROADCAST_ROUNDS);
        BROADCAST_PEERS.observe(peers as f64);
    }

    fn on_exhausted(&self, hash: &Hash) {
        warn!("[sw-rt] {} exhausted its broadcast retries", short_hex(hash));
        metric_inc!(BROADCAST_RETRIES_EXHAUSTED);
    }

    fn on_api_result(&self, _hash: &Hash, accepted: bool) {
        let result = if accepted { "accepted" } else { "rejected" };
        metric_inc!(API_BROADCASTS, &[result]);
    }
}
