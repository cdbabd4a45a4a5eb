//! # Wallet Container
//!
//! Owns every subsystem instance and wires their ports together:
//!
//! ```text
//!                 ┌──────────────────────┐
//!   blocks ──────▶│ sw-01 processing     │──▶ LedgerListeners (metrics + app)
//!   mempool ─────▶│                      │
//!                 └──┬───────────────▲───┘
//!         unspent    │               │ relayed / invalid
//!                 ┌──▼─────────┐  ┌──┴──────────────────┐
//!                 │ sw-02      │  │ sw-03 broadcast     │──▶ peers / API
//!                 │ selection  │  │ worker              │
//!                 └──┬─────────┘  └──▲──────────────────┘
//!                    │   plan        │ send
//!                 ┌──▼───────────────┴───┐
//!                 │ TransactionCreator   │◀── signer
//!                 └──────────────────────┘
//! ```

use parking_lot::Mutex;
use shared_types::{Block, FullTransaction, Hash};
use std::sync::Arc;
use sw_01_transaction_processing::{
    BloomFilterManager, Ledger, LedgerListener, ProcessOutcome, PublicKeyManager,
    TransactionProcessingService, TransactionProcessorApi, TransactionSyncer,
};
use sw_02_coin_selection::{CoinSelectionApi, CoinSelectionService};
use sw_03_transaction_broadcast::{
    spawn_broadcast_worker, BroadcastHandle, BroadcastPorts, InitialDownload, PeerManager,
    SendType, SentTransactionStore, SystemTimeSource, TransactionSender, TransactionSenderApi,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use wallet_telemetry::{
    log_block_event, metric_inc, subsystem_span, time_histogram, BATCH_DURATION,
    FILTER_REFRESH_SIGNALS,
};

use crate::adapters::{
    LedgerListeners, LedgerUnspentOutputs, MetricsBroadcastListener, SyncerPendingSource,
};
use crate::container::WalletConfig;
use crate::creator::{SendRequest, TransactionCreator, TransactionSigner};
use crate::errors::RuntimeError;

/// External collaborators supplied by the embedding application.
pub struct WalletPorts<L: Ledger> {
    /// Persistent ledger.
    pub ledger: Arc<L>,
    /// HD key manager.
    pub keys: Arc<dyn PublicKeyManager>,
    /// Bloom filter manager.
    pub bloom: Arc<dyn BloomFilterManager>,
    /// Connected peers.
    pub peers: Arc<dyn PeerManager>,
    /// Initial block download progress.
    pub download: Arc<dyn InitialDownload>,
    /// Broadcast tracking records.
    pub sent_store: Arc<dyn SentTransactionStore>,
    /// Transaction signer.
    pub signer: Arc<dyn TransactionSigner>,
    /// Peers or a broadcast API.
    pub send_type: SendType,
    /// Application listener for ledger changes.
    pub listener: Option<Arc<dyn LedgerListener>>,
}

/// Running wallet core.
pub struct WalletContainer<L: Ledger + 'static> {
    config: WalletConfig,
    processing: Arc<TransactionProcessingService<L>>,
    syncer: TransactionSyncer<L>,
    selection: Arc<CoinSelectionService>,
    broadcast: BroadcastHandle,
    worker: Mutex<Option<JoinHandle<()>>>,
    creator: TransactionCreator<L>,
}

impl<L: Ledger + 'static> WalletContainer<L> {
    /// Validate `config`, build every subsystem and start the broadcast
    /// worker on the current tokio runtime.
    pub fn start(config: WalletConfig, ports: WalletPorts<L>) -> Result<Self, RuntimeError> {
        config.validate()?;

        let listener = Arc::new(LedgerListeners::new(ports.listener));
        let processing = Arc::new(
            TransactionProcessingService::new(
                config.processing.clone(),
                Arc::clone(&ports.ledger),
                ports.keys,
                ports.bloom,
            )
            .with_listener(listener),
        );
        let syncer = TransactionSyncer::new(Arc::clone(&processing));

        let selection = Arc::new(CoinSelectionService::new(
            config.selection.clone(),
            Arc::new(LedgerUnspentOutputs::new(
                ports.ledger,
                config.selection.min_confirmations,
            )),
        ));

        let sender = TransactionSender::new(
            &config.broadcast,
            BroadcastPorts {
                peers: ports.peers,
                download: ports.download,
                store: ports.sent_store,
                source: Arc::new(SyncerPendingSource::new(syncer.clone())),
                time: Arc::new(SystemTimeSource),
            },
        )
        .with_send_type(ports.send_type)
        .with_listener(Arc::new(MetricsBroadcastListener));
        let (broadcast, worker) = spawn_broadcast_worker(&config.broadcast, sender);

        let creator = TransactionCreator::new(
            selection.clone(),
            ports.signer,
            Arc::clone(&processing),
            Arc::new(broadcast.clone()),
        );

        info!(
            "[sw-rt] wallet core started (min peers {}, max retries {})",
            config.broadcast.min_connected_peers, config.broadcast.max_retries
        );
        Ok(Self {
            config,
            processing,
            syncer,
            selection,
            broadcast,
            worker: Mutex::new(Some(worker)),
            creator,
        })
    }

    /// Apply a block's matched transactions.
    pub fn process_block(
        &self,
        transactions: Vec<FullTransaction>,
        block: Block,
    ) -> Result<ProcessOutcome, RuntimeError> {
        let _span = subsystem_span!("process_block", subsystem = "sw-01", height = block.height)
            .entered();
        let _timer = time_histogram!(BATCH_DURATION, &["block"]);

        let (height, hash) = (block.height, hex::encode(block.hash));
        let outcome = self.processing.process_block(transactions, block)?;
        self.refresh_if_needed(&outcome)?;
        log_block_event!(
            debug,
            "sw-01",
            "block applied",
            height,
            hash,
            changed = outcome.report().inserted.len() + outcome.report().updated.len()
        );
        Ok(outcome)
    }

    /// Apply mempool transactions and stop rebroadcasting any of ours the
    /// network relayed back.
    pub async fn process_pending(
        &self,
        transactions: Vec<FullTransaction>,
    ) -> Result<ProcessOutcome, RuntimeError> {
        let outcome = {
            let _timer = time_histogram!(BATCH_DURATION, &["mempool"]);
            self.processing.process_pending(transactions)?
        };
        self.refresh_if_needed(&outcome)?;

        let report = outcome.report();
        let seen: Vec<Hash> = report
            .inserted
            .iter()
            .chain(&report.updated)
            .copied()
            .collect();
        if !seen.is_empty() {
            self.broadcast.transactions_relayed(seen).await?;
        }
        Ok(outcome)
    }

    /// Select, sign, store and broadcast a payment.
    pub async fn create_transaction(
        &self,
        request: &SendRequest,
    ) -> Result<FullTransaction, RuntimeError> {
        self.creator.create(request).await
    }

    /// Select and sign a payment without storing or sending it.
    pub fn create_raw_transaction(
        &self,
        request: &SendRequest,
    ) -> Result<FullTransaction, RuntimeError> {
        self.creator.create_raw(request)
    }

    /// Whether the protocol layer should fetch an announced transaction.
    pub fn should_request_transaction(&self, hash: &Hash) -> bool {
        self.syncer.should_request_transaction(hash)
    }

    /// Initial download finished on every peer.
    pub async fn all_peers_synced(&self) -> Result<(), RuntimeError> {
        Ok(self.broadcast.all_peers_synced().await?)
    }

    /// Stop the broadcast worker and wait for it.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.broadcast.shutdown().await?;
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(err) = worker.await {
                warn!("[sw-rt] broadcast worker ended abnormally: {}", err);
            }
        }
        info!("[sw-rt] wallet core stopped");
        Ok(())
    }

    /// Active configuration.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Processing service.
    pub fn processing(&self) -> &Arc<TransactionProcessingService<L>> {
        &self.processing
    }

    /// Coin selection.
    pub fn selection(&self) -> Arc<dyn CoinSelectionApi> {
        self.selection.clone()
    }

    /// Broadcast worker handle.
    pub fn broadcast(&self) -> &BroadcastHandle {
        &self.broadcast
    }

    fn refresh_if_needed(&self, outcome: &ProcessOutcome) -> Result<(), RuntimeError> {
        if outcome.needs_filter_refresh() {
            metric_inc!(FILTER_REFRESH_SIGNALS);
            self.processing.refresh_filter()?;
        }
        Ok(())
    }
}
