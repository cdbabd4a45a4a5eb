//! # Broadcast Worker
//!
//! Serial send queue. The worker task owns the [`TransactionSender`] and is
//! the only place its state changes: commands from handles, completions
//! from peer tasks and timer ticks are all handled one at a time in a
//! single `select!` loop. Peer I/O runs in spawned tasks and never blocks
//! the loop.

use async_trait::async_trait;
use shared_types::{short_hex, FullTransaction, Hash};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::algorithms::PeerSelector;
use crate::application::sender::{Dispatch, TransactionSender};
use crate::config::BroadcastConfig;
use crate::domain::BroadcastError;
use crate::ports::{InitialDownload, Peer, PeerManager, TransactionSenderApi};

enum Command {
    Send(Vec<FullTransaction>),
    Relayed(Vec<Hash>),
    AllPeersSynced,
    Shutdown,
}

enum PeerOutcome {
    Delivered,
    TimedOut,
    Failed(BroadcastError),
}

enum Completion {
    Peer {
        round_id: Uuid,
        hash: Hash,
        peer: String,
        outcome: PeerOutcome,
    },
    Api {
        transaction: FullTransaction,
        result: Result<(), BroadcastError>,
    },
}

/// Start the send worker on the current tokio runtime.
pub fn spawn_broadcast_worker(
    config: &BroadcastConfig,
    sender: TransactionSender,
) -> (BroadcastHandle, JoinHandle<()>) {
    let (commands_tx, commands) = mpsc::channel(config.channel_capacity.max(1));
    let (completions_tx, completions) = mpsc::unbounded_channel();

    let handle = BroadcastHandle {
        commands: commands_tx,
        selector: sender.selector(),
        peers: sender.ports().peers.clone(),
        download: sender.ports().download.clone(),
    };
    let worker = BroadcastWorker {
        sender,
        commands,
        completions,
        completions_tx,
        send_timeout: config.send_timeout(),
        timer_interval: config.timer_interval(),
    };
    (handle, tokio::spawn(worker.run()))
}

struct BroadcastWorker {
    sender: TransactionSender,
    commands: mpsc::Receiver<Command>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    send_timeout: Duration,
    timer_interval: Duration,
}

impl BroadcastWorker {
    async fn run(mut self) {
        info!("[sw-03] broadcast worker started");
        let mut ticker = tokio::time::interval(self.timer_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(completion) = self.completions.recv() => {
                    self.handle_completion(completion);
                }
                _ = ticker.tick() => {
                    if self.sender.timer_running() {
                        let dispatch = self.sender.send_pending();
                        self.dispatch(dispatch);
                    }
                }
            }
        }
        info!("[sw-03] broadcast worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        let dispatch = match command {
            Command::Send(transactions) => self.sender.send(transactions),
            Command::AllPeersSynced => self.sender.send_pending(),
            Command::Relayed(hashes) => {
                self.sender.transactions_relayed(&hashes);
                Dispatch::Idle
            }
            Command::Shutdown => Dispatch::Idle,
        };
        self.dispatch(dispatch);
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Peer {
                round_id,
                hash,
                peer,
                outcome,
            } => match outcome {
                PeerOutcome::Delivered => self.sender.send_completed(&hash),
                PeerOutcome::TimedOut => {
                    debug!(
                        "[sw-03] round {}: {} timed out on {}",
                        round_id,
                        short_hex(&hash),
                        peer
                    );
                    self.sender.send_completed(&hash);
                }
                PeerOutcome::Failed(err) => {
                    warn!(
                        "[sw-03] round {}: {} failed on {}: {}",
                        round_id,
                        short_hex(&hash),
                        peer,
                        err
                    );
                }
            },
            Completion::Api {
                transaction,
                result,
            } => self.sender.api_result(transaction, result),
        }
    }

    fn dispatch(&self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Idle => {}
            Dispatch::Peers {
                round_id,
                transactions,
                peers,
            } => {
                for transaction in transactions {
                    let transaction = Arc::new(transaction);
                    for peer in &peers {
                        self.spawn_peer_send(round_id, peer.clone(), transaction.clone());
                    }
                }
            }
            Dispatch::Api {
                broadcaster,
                transactions,
            } => {
                let done = self.completions_tx.clone();
                tokio::spawn(async move {
                    for transaction in transactions {
                        let result = broadcaster.broadcast(&transaction).await;
                        if done.send(Completion::Api { transaction, result }).is_err() {
                            break;
                        }
                    }
                });
            }
        }
    }

    fn spawn_peer_send(
        &self,
        round_id: Uuid,
        peer: Arc<dyn Peer>,
        transaction: Arc<FullTransaction>,
    ) {
        let done = self.completions_tx.clone();
        let send_timeout = self.send_timeout;
        tokio::spawn(async move {
            let outcome =
                match tokio::time::timeout(send_timeout, peer.send_transaction(&transaction)).await
                {
                    Ok(Ok(())) => PeerOutcome::Delivered,
                    Ok(Err(err)) => PeerOutcome::Failed(err),
                    Err(_) => PeerOutcome::TimedOut,
                };
            // worker gone means shutdown; nothing left to report to
            let _ = done.send(Completion::Peer {
                round_id,
                hash: transaction.hash(),
                peer: peer.id().to_string(),
                outcome,
            });
        });
    }
}

/// Cloneable handle to the send worker.
#[derive(Clone)]
pub struct BroadcastHandle {
    commands: mpsc::Sender<Command>,
    selector: PeerSelector,
    peers: Arc<dyn PeerManager>,
    download: Arc<dyn InitialDownload>,
}

impl BroadcastHandle {
    /// Queue several transactions in one round.
    pub async fn send_all(&self, transactions: Vec<FullTransaction>) -> Result<(), BroadcastError> {
        self.submit(Command::Send(transactions)).await
    }

    /// Stop the worker. In-flight peer tasks finish on their own.
    pub async fn shutdown(&self) -> Result<(), BroadcastError> {
        self.submit(Command::Shutdown).await
    }

    async fn submit(&self, command: Command) -> Result<(), BroadcastError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| BroadcastError::WorkerStopped)
    }
}

#[async_trait]
impl TransactionSenderApi for BroadcastHandle {
    fn verify_can_send(&self) -> Result<(), BroadcastError> {
        if self
            .selector
            .select_from(&*self.peers, &*self.download)
            .is_empty()
        {
            return Err(BroadcastError::PeersNotSynced);
        }
        Ok(())
    }

    async fn send(&self, transaction: FullTransaction) -> Result<(), BroadcastError> {
        self.submit(Command::Send(vec![transaction])).await
    }

    async fn transactions_relayed(&self, hashes: Vec<Hash>) -> Result<(), BroadcastError> {
        self.submit(Command::Relayed(hashes)).await
    }

    async fn all_peers_synced(&self) -> Result<(), BroadcastError> {
        self.submit(Command::AllPeersSynced).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySentTransactionStore;
    use crate::application::sender::{BroadcastPorts, SendType};
    use crate::application::testing::transaction;
    use crate::ports::{
        MockApiBroadcaster, MockPeer, MockPeerNetwork, MockPendingSource, PeerBehavior,
        PendingTransactionSource, RecordingBroadcastListener, SentTransactionStore,
        SystemTimeSource,
    };

    struct Harness {
        handle: BroadcastHandle,
        join: JoinHandle<()>,
        peers: Vec<Arc<MockPeer>>,
        store: Arc<InMemorySentTransactionStore>,
        source: Arc<MockPendingSource>,
        listener: Arc<RecordingBroadcastListener>,
    }

    fn start(config: BroadcastConfig, peers: usize, synced: usize, send_type: SendType) -> Harness {
        let (network, mock_peers) = MockPeerNetwork::with_peers(peers, synced);
        let store = Arc::new(InMemorySentTransactionStore::new());
        let source = Arc::new(MockPendingSource::default());
        let listener = Arc::new(RecordingBroadcastListener::default());
        let ports = BroadcastPorts {
            peers: network.clone(),
            download: network,
            store: store.clone(),
            source: source.clone(),
            time: Arc::new(SystemTimeSource),
        };
        let sender = TransactionSender::new(&config, ports)
            .with_send_type(send_type)
            .with_listener(listener.clone());
        let (handle, join) = spawn_broadcast_worker(&config, sender);
        Harness {
            handle,
            join,
            peers: mock_peers,
            store,
            source,
            listener,
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within 1s");
    }

    #[tokio::test]
    async fn test_send_reaches_selected_peers() {
        let h = start(BroadcastConfig::for_testing(), 5, 2, SendType::P2p);
        h.handle.send(transaction(1)).await.unwrap();

        let (selected, store) = (h.peers[2..4].to_vec(), h.store.clone());
        wait_until(move || {
            selected.iter().all(|peer| peer.sent_count() == 1)
                && store
                    .sent_transaction(&[1u8; 32])
                    .map_or(false, |record| record.send_success)
        })
        .await;

        let sent: Vec<usize> = h.peers.iter().map(|peer| peer.sent_count()).collect();
        assert_eq!(sent, vec![0, 0, 1, 1, 0]);
        assert_eq!(h.store.sent_transaction(&[1u8; 32]).unwrap().retries_count, 1);
    }

    #[tokio::test]
    async fn test_stalled_peer_counts_after_timeout() {
        let h = start(BroadcastConfig::for_testing(), 3, 1, SendType::P2p);
        for peer in &h.peers {
            peer.set_behavior(PeerBehavior::Stall);
        }
        h.handle.send(transaction(1)).await.unwrap();

        let store = h.store.clone();
        wait_until(move || {
            store
                .sent_transaction(&[1u8; 32])
                .map_or(false, |record| record.retries_count == 1)
        })
        .await;
    }

    #[tokio::test]
    async fn test_failed_peer_not_counted() {
        let h = start(BroadcastConfig::for_testing(), 3, 1, SendType::P2p);
        h.peers[1].set_behavior(PeerBehavior::Reject);
        h.handle.send(transaction(1)).await.unwrap();

        let peer = h.peers[1].clone();
        wait_until(move || peer.sent_count() == 1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let record = h.store.sent_transaction(&[1u8; 32]).unwrap();
        assert_eq!(record.retries_count, 0);
    }

    #[tokio::test]
    async fn test_timer_retries_until_exhausted() {
        let config = BroadcastConfig {
            max_retries: 2,
            retry_period_ms: 20,
            ..BroadcastConfig::for_testing()
        };
        let h = start(config, 3, 1, SendType::P2p);
        h.source.push(transaction(1));
        h.handle.send(transaction(1)).await.unwrap();

        let listener = h.listener.clone();
        wait_until(move || !listener.exhausted.lock().is_empty()).await;
        assert!(h.store.sent_transaction(&[1u8; 32]).is_none());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(h.peers[1].sent_count(), 2);
    }

    #[tokio::test]
    async fn test_relayed_stops_retries() {
        let h = start(BroadcastConfig::for_testing(), 3, 1, SendType::P2p);
        h.handle.send(transaction(1)).await.unwrap();
        let peer = h.peers[1].clone();
        wait_until(move || peer.sent_count() == 1).await;

        h.handle.transactions_relayed(vec![[1u8; 32]]).await.unwrap();
        let store = h.store.clone();
        wait_until(move || store.is_empty()).await;
    }

    #[tokio::test]
    async fn test_all_peers_synced_flushes_pending() {
        let h = start(BroadcastConfig::for_testing(), 3, 1, SendType::P2p);
        h.source.push(transaction(4));
        h.handle.all_peers_synced().await.unwrap();

        let peer = h.peers[1].clone();
        wait_until(move || peer.sent_count() == 1).await;
        assert_eq!(h.listener.rounds.lock()[0], (1, 1));
    }

    #[tokio::test]
    async fn test_api_path() {
        let api = Arc::new(MockApiBroadcaster::default());
        api.reject([2u8; 32]);
        let h = start(BroadcastConfig::for_testing(), 0, 0, SendType::Api(api.clone()));
        h.source.push(transaction(1));
        h.source.push(transaction(2));

        h.handle
            .send_all(vec![transaction(1), transaction(2)])
            .await
            .unwrap();

        let source = h.source.clone();
        wait_until(move || source.new_transactions().is_empty()).await;
        assert_eq!(*h.source.relayed.lock(), vec![[1u8; 32]]);
        assert_eq!(*h.source.invalid.lock(), vec![[2u8; 32]]);
        assert_eq!(*api.broadcast.lock(), vec![[1u8; 32], [2u8; 32]]);
    }

    #[tokio::test]
    async fn test_verify_can_send_through_handle() {
        let h = start(BroadcastConfig::for_testing(), 1, 1, SendType::P2p);
        assert_eq!(h.handle.verify_can_send(), Err(BroadcastError::PeersNotSynced));
    }

    #[tokio::test]
    async fn test_handle_after_shutdown() {
        let h = start(BroadcastConfig::for_testing(), 3, 1, SendType::P2p);
        h.handle.shutdown().await.unwrap();
        h.join.await.unwrap();

        assert_eq!(
            h.handle.send(transaction(1)).await,
            Err(BroadcastError::WorkerStopped)
        );
    }
}
