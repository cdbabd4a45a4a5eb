//! # Transaction Sender
//!
//! Send bookkeeping, without any I/O of its own. Every method returns what
//! should go out on the wire as a [`Dispatch`]; the worker performs it and
//! reports completions back. All methods take `&mut self`, so the
//! read-modify-write of a `SentTransaction` cannot interleave with another
//! for the same hash.

use shared_types::{short_hex, FullTransaction, Hash};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::algorithms::PeerSelector;
use crate::config::BroadcastConfig;
use crate::domain::{BroadcastError, RetryPolicy, RoundOutcome};
use crate::ports::{
    ApiBroadcaster, BroadcastListener, InitialDownload, Peer, PeerManager,
    PendingTransactionSource, SentTransactionStore, TimeSource,
};

/// Where transactions are sent.
#[derive(Clone)]
pub enum SendType {
    /// To selected peers, with retries.
    P2p,
    /// Through a third-party broadcast API, once.
    Api(Arc<dyn ApiBroadcaster>),
}

/// Collaborators of the sender.
#[derive(Clone)]
pub struct BroadcastPorts {
    /// Connected peers.
    pub peers: Arc<dyn PeerManager>,
    /// Sync progress per peer.
    pub download: Arc<dyn InitialDownload>,
    /// Send tracking records.
    pub store: Arc<dyn SentTransactionStore>,
    /// `New` transactions and their outcome handlers.
    pub source: Arc<dyn PendingTransactionSource>,
    /// Clock.
    pub time: Arc<dyn TimeSource>,
}

/// Work produced by the sender.
pub enum Dispatch {
    /// Nothing to send.
    Idle,
    /// Send every transaction to every peer.
    Peers {
        /// Correlation ID for logs.
        round_id: Uuid,
        /// Transactions of the round.
        transactions: Vec<FullTransaction>,
        /// Selected peers.
        peers: Vec<Arc<dyn Peer>>,
    },
    /// Push every transaction through the API, one after another.
    Api {
        /// Broadcast API.
        broadcaster: Arc<dyn ApiBroadcaster>,
        /// Transactions to push.
        transactions: Vec<FullTransaction>,
    },
}

impl Dispatch {
    /// True if there is nothing to do.
    pub fn is_idle(&self) -> bool {
        matches!(self, Dispatch::Idle)
    }
}

/// Send and retry state machine.
pub struct TransactionSender {
    ports: BroadcastPorts,
    selector: PeerSelector,
    policy: RetryPolicy,
    send_type: SendType,
    listener: Option<Arc<dyn BroadcastListener>>,
    exhausted: HashSet<Hash>,
    timer_running: bool,
}

impl TransactionSender {
    /// Create a peer-to-peer sender.
    pub fn new(config: &BroadcastConfig, ports: BroadcastPorts) -> Self {
        Self {
            ports,
            selector: PeerSelector::new(config.min_connected_peers),
            policy: RetryPolicy::new(config.max_retries, config.retry_period_ms),
            send_type: SendType::P2p,
            listener: None,
            exhausted: HashSet::new(),
            timer_running: false,
        }
    }

    /// Switch the send path.
    pub fn with_send_type(mut self, send_type: SendType) -> Self {
        self.send_type = send_type;
        self
    }

    /// Attach a broadcast listener.
    pub fn with_listener(mut self, listener: Arc<dyn BroadcastListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Collaborators.
    pub fn ports(&self) -> &BroadcastPorts {
        &self.ports
    }

    /// Peer selection rule in use.
    pub fn selector(&self) -> PeerSelector {
        self.selector
    }

    /// Whether the resend timer should fire.
    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    /// Whether `hash` used up its retry budget this session.
    pub fn is_exhausted(&self, hash: &Hash) -> bool {
        self.exhausted.contains(hash)
    }

    /// Peers a round would go to right now.
    pub fn peers_to_send_to(&self) -> Vec<Arc<dyn Peer>> {
        self.selector
            .select_from(&*self.ports.peers, &*self.ports.download)
    }

    /// Fail with `PeersNotSynced` when no peer would receive a send.
    pub fn verify_can_send(&self) -> Result<(), BroadcastError> {
        if self.peers_to_send_to().is_empty() {
            return Err(BroadcastError::PeersNotSynced);
        }
        Ok(())
    }

    /// Send `transactions` now, regardless of their retry schedule.
    pub fn send(&mut self, transactions: Vec<FullTransaction>) -> Dispatch {
        let transactions: Vec<FullTransaction> = transactions
            .into_iter()
            .filter(|transaction| {
                let exhausted = self.exhausted.contains(&transaction.hash());
                if exhausted {
                    debug!(
                        "[sw-03] {} exhausted its retries, skipping",
                        short_hex(&transaction.hash())
                    );
                }
                !exhausted
            })
            .collect();
        if transactions.is_empty() {
            return Dispatch::Idle;
        }

        match &self.send_type {
            SendType::P2p => self.p2p_send(transactions),
            SendType::Api(broadcaster) => Dispatch::Api {
                broadcaster: broadcaster.clone(),
                transactions,
            },
        }
    }

    /// Resend `New` transactions whose retry period elapsed. Stops the
    /// timer once nothing is left to relay.
    pub fn send_pending(&mut self) -> Dispatch {
        let pending = self.ports.source.new_transactions();
        if pending.is_empty() {
            if self.timer_running {
                debug!("[sw-03] nothing left to relay, stopping resend timer");
            }
            self.timer_running = false;
            return Dispatch::Idle;
        }

        let now = self.ports.time.now();
        let due: Vec<FullTransaction> = pending
            .into_iter()
            .filter(|transaction| {
                let record = self.ports.store.sent_transaction(&transaction.hash());
                self.policy.is_due(record.as_ref(), now)
            })
            .collect();
        self.send(due)
    }

    /// Drop tracking for transactions the network relayed back.
    pub fn transactions_relayed(&mut self, hashes: &[Hash]) {
        for hash in hashes {
            if let Err(err) = self.ports.store.delete(hash) {
                warn!("[sw-03] failed to drop record of {}: {}", short_hex(hash), err);
            }
        }
    }

    /// A peer finished with `hash` (or timed out).
    pub fn send_completed(&mut self, hash: &Hash) {
        let Some(record) = self.ports.store.sent_transaction(hash) else {
            return;
        };
        let result = match self.policy.complete(record) {
            RoundOutcome::AlreadyCounted => Ok(()),
            RoundOutcome::Counted(record) => {
                debug!(
                    "[sw-03] {} round {} completed",
                    short_hex(hash),
                    record.retries_count
                );
                self.ports.store.save(record)
            }
            RoundOutcome::Exhausted(record) => {
                warn!(
                    "[sw-03] {} not relayed after {} rounds, giving up",
                    short_hex(hash),
                    record.retries_count
                );
                self.exhausted.insert(*hash);
                if let Some(listener) = &self.listener {
                    listener.on_exhausted(hash);
                }
                self.ports.store.delete(hash)
            }
        };
        if let Err(err) = result {
            warn!("[sw-03] failed to update record of {}: {}", short_hex(hash), err);
        }
    }

    /// The broadcast API answered for `transaction`.
    pub fn api_result(&mut self, transaction: FullTransaction, result: Result<(), BroadcastError>) {
        let hash = transaction.hash();
        if let Some(listener) = &self.listener {
            listener.on_api_result(&hash, result.is_ok());
        }
        match result {
            Ok(()) => {
                debug!("[sw-03] API accepted {}", short_hex(&hash));
                self.ports.source.handle_relayed(vec![transaction]);
            }
            Err(err) => {
                warn!("[sw-03] API rejected {}: {}", short_hex(&hash), err);
                self.ports.source.handle_invalid(&hash);
            }
        }
    }

    fn p2p_send(&mut self, transactions: Vec<FullTransaction>) -> Dispatch {
        let peers = self.peers_to_send_to();
        if peers.is_empty() {
            debug!(
                "[sw-03] no peers to send {} transactions to",
                transactions.len()
            );
            return Dispatch::Idle;
        }

        self.timer_running = true;
        let now = self.ports.time.now();
        for transaction in &transactions {
            let hash = transaction.hash();
            let record = self
                .policy
                .start(self.ports.store.sent_transaction(&hash), hash, now);
            if let Err(err) = self.ports.store.save(record) {
                warn!("[sw-03] failed to record send of {}: {}", short_hex(&hash), err);
            }
        }

        let round_id = Uuid::new_v4();
        info!(
            "[sw-03] round {}: {} transactions to {} peers",
            round_id,
            transactions.len(),
            peers.len()
        );
        if let Some(listener) = &self.listener {
            listener.on_round(transactions.len(), peers.len());
        }
        Dispatch::Peers {
            round_id,
            transactions,
            peers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySentTransactionStore;
    use crate::application::testing::transaction;
    use crate::ports::{
        MockApiBroadcaster, MockPeerNetwork, MockPendingSource, MockTimeSource,
        RecordingBroadcastListener,
    };

    struct Fixture {
        sender: TransactionSender,
        store: Arc<InMemorySentTransactionStore>,
        source: Arc<MockPendingSource>,
        time: Arc<MockTimeSource>,
        listener: Arc<RecordingBroadcastListener>,
    }

    fn fixture(peers: usize, synced: usize) -> Fixture {
        fixture_with(peers, synced, SendType::P2p)
    }

    fn fixture_with(peers: usize, synced: usize, send_type: SendType) -> Fixture {
        let (network, _) = MockPeerNetwork::with_peers(peers, synced);
        let store = Arc::new(InMemorySentTransactionStore::new());
        let source = Arc::new(MockPendingSource::default());
        let time = Arc::new(MockTimeSource::new(1_000_000));
        let listener = Arc::new(RecordingBroadcastListener::default());
        let ports = BroadcastPorts {
            peers: network.clone(),
            download: network,
            store: store.clone(),
            source: source.clone(),
            time: time.clone(),
        };
        let config = BroadcastConfig {
            max_retries: 2,
            retry_period_ms: 60_000,
            ..BroadcastConfig::for_testing()
        };
        Fixture {
            sender: TransactionSender::new(&config, ports)
                .with_send_type(send_type)
                .with_listener(listener.clone()),
            store,
            source,
            time,
            listener,
        }
    }

    #[test]
    fn test_verify_can_send() {
        assert_eq!(
            fixture(1, 1).sender.verify_can_send(),
            Err(BroadcastError::PeersNotSynced)
        );
        assert!(fixture(3, 1).sender.verify_can_send().is_ok());
    }

    #[test]
    fn test_send_records_round_and_starts_timer() {
        let mut f = fixture(3, 1);
        let dispatch = f.sender.send(vec![transaction(1)]);

        let Dispatch::Peers { peers, transactions, .. } = dispatch else {
            panic!("expected a peer round");
        };
        assert_eq!(peers.len(), 1);
        assert_eq!(transactions.len(), 1);
        assert!(f.sender.timer_running());
        let record = f.store.sent_transaction(&[1u8; 32]).unwrap();
        assert_eq!(record.last_send_time, 1_000_000);
        assert!(!record.send_success);
        assert_eq!(*f.listener.rounds.lock(), vec![(1, 1)]);
    }

    #[test]
    fn test_send_without_peers_is_idle() {
        let mut f = fixture(1, 0);
        assert!(f.sender.send(vec![transaction(1)]).is_idle());
        assert!(!f.sender.timer_running());
        assert!(f.store.is_empty());
    }

    #[test]
    fn test_completion_counted_once_per_round() {
        let mut f = fixture(5, 1);
        f.sender.send(vec![transaction(1)]);
        f.sender.send_completed(&[1u8; 32]);
        f.sender.send_completed(&[1u8; 32]);

        let record = f.store.sent_transaction(&[1u8; 32]).unwrap();
        assert_eq!(record.retries_count, 1);
        assert!(record.send_success);
    }

    #[test]
    fn test_exhausted_transaction_dropped() {
        let mut f = fixture(3, 1);
        f.source.push(transaction(1));

        for _ in 0..2 {
            f.sender.send(vec![transaction(1)]);
            f.sender.send_completed(&[1u8; 32]);
        }

        assert!(f.store.sent_transaction(&[1u8; 32]).is_none());
        assert!(f.sender.is_exhausted(&[1u8; 32]));
        assert_eq!(*f.listener.exhausted.lock(), vec![[1u8; 32]]);
        // still New in the ledger, but never sent again
        assert_eq!(f.source.new_transactions().len(), 1);
        assert!(f.sender.send_pending().is_idle());
    }

    #[test]
    fn test_pending_resent_after_retry_period() {
        let mut f = fixture(3, 1);
        f.source.push(transaction(1));
        f.sender.send(vec![transaction(1)]);
        f.sender.send_completed(&[1u8; 32]);

        f.time.advance(30_000);
        assert!(f.sender.send_pending().is_idle());

        f.time.advance(30_001);
        assert!(!f.sender.send_pending().is_idle());
        let record = f.store.sent_transaction(&[1u8; 32]).unwrap();
        assert_eq!(record.last_send_time, 1_060_001);
        assert_eq!(record.first_send_time, 1_000_000);
        assert!(!record.send_success);
    }

    #[test]
    fn test_timer_stops_when_nothing_new() {
        let mut f = fixture(3, 1);
        f.sender.send(vec![transaction(1)]);
        assert!(f.sender.timer_running());

        assert!(f.sender.send_pending().is_idle());
        assert!(!f.sender.timer_running());
    }

    #[test]
    fn test_relayed_drops_record() {
        let mut f = fixture(3, 1);
        f.sender.send(vec![transaction(1), transaction(2)]);
        f.sender.transactions_relayed(&[[1u8; 32]]);

        assert!(f.store.sent_transaction(&[1u8; 32]).is_none());
        assert!(f.store.sent_transaction(&[2u8; 32]).is_some());
    }

    #[test]
    fn test_api_path_reports_each_result() {
        let api = Arc::new(MockApiBroadcaster::default());
        let mut f = fixture_with(0, 0, SendType::Api(api));
        f.source.push(transaction(1));
        f.source.push(transaction(2));

        let dispatch = f.sender.send(vec![transaction(1), transaction(2)]);
        assert!(matches!(dispatch, Dispatch::Api { ref transactions, .. } if transactions.len() == 2));
        assert!(!f.sender.timer_running());

        f.sender.api_result(transaction(1), Ok(()));
        f.sender
            .api_result(transaction(2), Err(BroadcastError::ApiRejected("dust".into())));

        assert_eq!(*f.source.relayed.lock(), vec![[1u8; 32]]);
        assert_eq!(*f.source.invalid.lock(), vec![[2u8; 32]]);
        assert_eq!(
            *f.listener.api_results.lock(),
            vec![([1u8; 32], true), ([2u8; 32], false)]
        );
        assert!(f.store.is_empty());
    }
}
