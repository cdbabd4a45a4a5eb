//! Outbound ports (SPI) for the transaction broadcast subsystem.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{FullTransaction, Hash, SentTransaction, StorageError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::BroadcastError;

/// A connected peer.
#[async_trait]
pub trait Peer: Send + Sync {
    /// Stable identifier (usually the socket address).
    fn id(&self) -> &str;

    /// Not busy with another task.
    fn is_ready(&self) -> bool;

    /// Announce `transaction` and serve it until the peer is done with it.
    async fn send_transaction(&self, transaction: &FullTransaction) -> Result<(), BroadcastError>;
}

/// Connected peers.
pub trait PeerManager: Send + Sync {
    /// All connected peers, ready or not.
    fn total_peers_count(&self) -> usize;

    /// Peers that can take a task now.
    fn ready_peers(&self) -> Vec<Arc<dyn Peer>>;
}

/// Initial block download progress.
pub trait InitialDownload: Send + Sync {
    /// Peers we finished syncing from.
    fn synced_peers(&self) -> Vec<Arc<dyn Peer>>;
}

/// Storage of broadcast tracking records.
pub trait SentTransactionStore: Send + Sync {
    /// Record for `hash`, if any.
    fn sent_transaction(&self, hash: &Hash) -> Option<SentTransaction>;

    /// Insert or replace a record.
    fn save(&self, record: SentTransaction) -> Result<(), StorageError>;

    /// Delete the record for `hash`; missing records are ignored.
    fn delete(&self, hash: &Hash) -> Result<(), StorageError>;
}

/// The wallet's locally created transactions awaiting relay.
pub trait PendingTransactionSource: Send + Sync {
    /// Transactions still in the `New` state.
    fn new_transactions(&self) -> Vec<FullTransaction>;

    /// The broadcast API accepted these transactions.
    fn handle_relayed(&self, transactions: Vec<FullTransaction>);

    /// The broadcast API rejected this transaction.
    fn handle_invalid(&self, hash: &Hash);
}

/// Third-party broadcast API used instead of peers.
#[async_trait]
pub trait ApiBroadcaster: Send + Sync {
    /// Push `transaction`; `Ok` means it was accepted.
    async fn broadcast(&self, transaction: &FullTransaction) -> Result<(), BroadcastError>;
}

/// Observer of broadcast activity.
pub trait BroadcastListener: Send + Sync {
    /// A peer round started.
    fn on_round(&self, _transactions: usize, _peers: usize) {}

    /// A transaction used up its retry budget.
    fn on_exhausted(&self, _hash: &Hash) {}

    /// The broadcast API answered for a transaction.
    fn on_api_result(&self, _hash: &Hash, _accepted: bool) {}
}

/// Time source abstraction (for testing).
pub trait TimeSource: Send + Sync {
    /// Current time in unix milliseconds.
    fn now(&self) -> u64;
}

/// System time source.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock time source for testing.
pub struct MockTimeSource {
    time: AtomicU64,
}

impl MockTimeSource {
    /// Create a mock time source starting at `initial` millis.
    pub fn new(initial: u64) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Advance time.
    pub fn advance(&self, millis: u64) {
        self.time.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set time.
    pub fn set(&self, time: u64) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }
}

/// How a [`MockPeer`] answers a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerBehavior {
    /// Complete immediately.
    Accept,
    /// Fail immediately.
    Reject,
    /// Never complete.
    Stall,
}

/// Mock peer recording the transactions sent to it.
pub struct MockPeer {
    id: String,
    ready: AtomicBool,
    behavior: Mutex<PeerBehavior>,
    /// Hashes passed to `send_transaction`.
    pub sent: Mutex<Vec<Hash>>,
}

impl MockPeer {
    /// A ready peer accepting every send.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ready: AtomicBool::new(true),
            behavior: Mutex::new(PeerBehavior::Accept),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Change the answer to future sends.
    pub fn set_behavior(&self, behavior: PeerBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Mark the peer busy or ready.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Number of sends received.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Peer for MockPeer {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn send_transaction(&self, transaction: &FullTransaction) -> Result<(), BroadcastError> {
        self.sent.lock().push(transaction.hash());
        let behavior = *self.behavior.lock();
        match behavior {
            PeerBehavior::Accept => Ok(()),
            PeerBehavior::Reject => Err(BroadcastError::PeerFailed {
                peer: self.id.clone(),
                reason: "rejected".to_string(),
            }),
            PeerBehavior::Stall => std::future::pending().await,
        }
    }
}

/// Mock peer group acting as both peer manager and initial download.
#[derive(Default)]
pub struct MockPeerNetwork {
    connected: Mutex<Vec<Arc<MockPeer>>>,
    synced: Mutex<HashSet<String>>,
}

impl MockPeerNetwork {
    /// Connect `peer`.
    pub fn connect(&self, peer: Arc<MockPeer>) {
        self.connected.lock().push(peer);
    }

    /// Mark the peer with `id` as synced.
    pub fn mark_synced(&self, id: &str) {
        self.synced.lock().insert(id.to_string());
    }

    /// Connect `count` ready peers named `peer-0`..; the first `synced` are
    /// marked synced.
    pub fn with_peers(count: usize, synced: usize) -> (Arc<Self>, Vec<Arc<MockPeer>>) {
        let network = Arc::new(Self::default());
        let peers: Vec<Arc<MockPeer>> = (0..count)
            .map(|n| Arc::new(MockPeer::new(&format!("peer-{}", n))))
            .collect();
        for (n, peer) in peers.iter().enumerate() {
            network.connect(peer.clone());
            if n < synced {
                network.mark_synced(peer.id());
            }
        }
        (network, peers)
    }
}

impl PeerManager for MockPeerNetwork {
    fn total_peers_count(&self) -> usize {
        self.connected.lock().len()
    }

    fn ready_peers(&self) -> Vec<Arc<dyn Peer>> {
        self.connected
            .lock()
            .iter()
            .filter(|peer| peer.is_ready())
            .map(|peer| peer.clone() as Arc<dyn Peer>)
            .collect()
    }
}

impl InitialDownload for MockPeerNetwork {
    fn synced_peers(&self) -> Vec<Arc<dyn Peer>> {
        let synced = self.synced.lock();
        self.connected
            .lock()
            .iter()
            .filter(|peer| synced.contains(peer.id()))
            .map(|peer| peer.clone() as Arc<dyn Peer>)
            .collect()
    }
}

/// Mock pending source; relayed and invalid transactions leave the `New`
/// set.
#[derive(Default)]
pub struct MockPendingSource {
    /// Transactions reported as `New`.
    pub transactions: Mutex<Vec<FullTransaction>>,
    /// Hashes passed to `handle_relayed`.
    pub relayed: Mutex<Vec<Hash>>,
    /// Hashes passed to `handle_invalid`.
    pub invalid: Mutex<Vec<Hash>>,
}

impl MockPendingSource {
    /// Add a `New` transaction.
    pub fn push(&self, transaction: FullTransaction) {
        self.transactions.lock().push(transaction);
    }
}

impl PendingTransactionSource for MockPendingSource {
    fn new_transactions(&self) -> Vec<FullTransaction> {
        self.transactions.lock().clone()
    }

    fn handle_relayed(&self, transactions: Vec<FullTransaction>) {
        let hashes: Vec<Hash> = transactions.iter().map(FullTransaction::hash).collect();
        self.transactions
            .lock()
            .retain(|pending| !hashes.contains(&pending.hash()));
        self.relayed.lock().extend(hashes);
    }

    fn handle_invalid(&self, hash: &Hash) {
        self.transactions.lock().retain(|pending| pending.hash() != *hash);
        self.invalid.lock().push(*hash);
    }
}

/// Mock broadcast API rejecting a configured set of hashes.
#[derive(Default)]
pub struct MockApiBroadcaster {
    /// Hashes to reject.
    pub rejected: Mutex<HashSet<Hash>>,
    /// Hashes seen, in order.
    pub broadcast: Mutex<Vec<Hash>>,
}

impl MockApiBroadcaster {
    /// Reject `hash` from now on.
    pub fn reject(&self, hash: Hash) {
        self.rejected.lock().insert(hash);
    }
}

#[async_trait]
impl ApiBroadcaster for MockApiBroadcaster {
    async fn broadcast(&self, transaction: &FullTransaction) -> Result<(), BroadcastError> {
        let hash = transaction.hash();
        self.broadcast.lock().push(hash);
        if self.rejected.lock().contains(&hash) {
            return Err(BroadcastError::ApiRejected("missing inputs".to_string()));
        }
        Ok(())
    }
}

/// Listener recording broadcast activity.
#[derive(Default)]
pub struct RecordingBroadcastListener {
    /// `(transactions, peers)` per round.
    pub rounds: Mutex<Vec<(usize, usize)>>,
    /// Exhausted hashes.
    pub exhausted: Mutex<Vec<Hash>>,
    /// `(hash, accepted)` per API answer.
    pub api_results: Mutex<Vec<(Hash, bool)>>,
}

impl BroadcastListener for RecordingBroadcastListener {
    fn on_round(&self, transactions: usize, peers: usize) {
        self.rounds.lock().push((transactions, peers));
    }

    fn on_exhausted(&self, hash: &Hash) {
        self.exhausted.lock().push(*hash);
    }

    fn on_api_result(&self, hash: &Hash, accepted: bool) {
        self.api_results.lock().push((*hash, accepted));
    }
}
