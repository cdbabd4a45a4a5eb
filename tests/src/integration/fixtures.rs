//! Shared fixtures: ledger transactions and a wallet wired to mock peers.

use shared_types::{
    Block, FullTransaction, Hash, Input, KeyPath, Outpoint, Output, ScriptType, Transaction,
    SEQUENCE_FINAL,
};
use std::sync::Arc;
use std::time::Duration;
use sw_01_transaction_processing::{
    InMemoryLedger, MockBloomFilterManager, MockPublicKeyManager, ProcessingConfig,
    RecordingListener, TransactionProcessingService,
};
use sw_02_coin_selection::OutputTarget;
use sw_03_transaction_broadcast::{
    InMemorySentTransactionStore, MockPeer, MockPeerNetwork, SendType,
};
use wallet_runtime::{MockSigner, SendRequest, WalletConfig, WalletContainer, WalletPorts};

pub(crate) fn hash(n: u8) -> Hash {
    [n; 32]
}

pub(crate) fn block(n: u8, height: u32) -> Block {
    Block::new([0xB0 + n; 32], height, 1_700_000_000 + u64::from(height))
}

/// Transaction `n` paying `values` to wallet receive keys.
pub(crate) fn funding(n: u8, values: &[u64]) -> FullTransaction {
    let outputs = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Output::new(*value, 0, ScriptType::P2pkh)
                .owned_by(KeyPath::receive(0, u32::from(n) * 16 + index as u32))
        })
        .collect();
    FullTransaction::new(
        Transaction {
            hash: hash(n),
            version: 1,
            ..Transaction::default()
        },
        vec![Input::new(Outpoint::new([0xEE; 32], u32::from(n)), SEQUENCE_FINAL)],
        outputs,
    )
}

/// Transaction `n` spending `spends` into one foreign output.
pub(crate) fn spend(n: u8, spends: &[(Hash, u32)], value: u64, sequence: u32) -> FullTransaction {
    FullTransaction::new(
        Transaction {
            hash: hash(n),
            version: 1,
            ..Transaction::default()
        },
        spends
            .iter()
            .map(|(parent, index)| Input::new(Outpoint::new(*parent, *index), sequence))
            .collect(),
        vec![Output::new(value, 0, ScriptType::P2pkh)],
    )
}

pub(crate) fn processing() -> Arc<TransactionProcessingService<InMemoryLedger>> {
    Arc::new(TransactionProcessingService::new(
        ProcessingConfig::for_testing(),
        Arc::new(InMemoryLedger::new()),
        Arc::new(MockPublicKeyManager::default()),
        Arc::new(MockBloomFilterManager::default()),
    ))
}

pub(crate) fn payment(value: u64, fee_rate: u64) -> SendRequest {
    SendRequest::new(
        value,
        fee_rate,
        OutputTarget::new(ScriptType::P2pkh, vec![0xAA; 20]),
        OutputTarget::change(ScriptType::P2pkh, vec![0xCC; 20], KeyPath::change(0, 0)),
    )
}

/// Wallet core with three connected, synced mock peers.
pub(crate) struct Wallet {
    pub(crate) core: WalletContainer<InMemoryLedger>,
    pub(crate) peers: Vec<Arc<MockPeer>>,
    pub(crate) sent: Arc<InMemorySentTransactionStore>,
    pub(crate) bloom: Arc<MockBloomFilterManager>,
    pub(crate) listener: Arc<RecordingListener>,
}

impl Wallet {
    /// Peer the selector picks with three synced peers.
    pub(crate) fn selected_peer(&self) -> Arc<MockPeer> {
        self.peers[1].clone()
    }
}

pub(crate) fn wallet_with(config: WalletConfig, send_type: SendType) -> Wallet {
    let (network, peers) = MockPeerNetwork::with_peers(3, 3);
    let sent = Arc::new(InMemorySentTransactionStore::new());
    let bloom = Arc::new(MockBloomFilterManager::default());
    let listener = Arc::new(RecordingListener::default());
    let ports = WalletPorts {
        ledger: Arc::new(InMemoryLedger::new()),
        keys: Arc::new(MockPublicKeyManager::default()),
        bloom: bloom.clone(),
        peers: network.clone(),
        download: network,
        sent_store: sent.clone(),
        signer: Arc::new(MockSigner::default()),
        send_type,
        listener: Some(listener.clone()),
    };
    let core = WalletContainer::start(config, ports).expect("wallet failed to start");
    Wallet {
        core,
        peers,
        sent,
        bloom,
        listener,
    }
}

pub(crate) fn wallet() -> Wallet {
    wallet_with(WalletConfig::for_testing(), SendType::P2p)
}

pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within 2s");
}
