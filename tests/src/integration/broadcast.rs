//! # Broadcast Feedback Flows
//!
//! The send worker (sw-03) reports back into the ledger (sw-01) through the
//! runtime's syncer adapter:
//!
//! - P2P: retries until relayed or exhausted; exhaustion leaves the ledger as is
//! - API: acceptance marks the payment relayed, rejection invalidates it
//! - "all peers synced" flushes `New` transactions created while offline

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shared_types::TransactionStatus;
    use sw_01_transaction_processing::{Ledger, LedgerReader, TransactionProcessorApi};
    use sw_02_coin_selection::{CoinSelectionApi, CoinSelectionService, SelectionConfig};
    use sw_03_transaction_broadcast::{MockApiBroadcaster, SendType, SentTransactionStore};
    use wallet_runtime::{LedgerUnspentOutputs, MockSigner, TransactionSigner, WalletConfig};
    use wallet_telemetry::BROADCAST_RETRIES_EXHAUSTED;

    use crate::integration::fixtures::{
        block, funding, payment, processing, wait_until, wallet, wallet_with,
    };

    #[tokio::test]
    async fn test_retries_exhausted_leave_ledger_untouched() {
        let mut config = WalletConfig::for_testing();
        config.broadcast.max_retries = 2;
        config.broadcast.retry_period_ms = 20;
        let w = wallet_with(config, SendType::P2p);
        w.core
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();
        let exhausted = BROADCAST_RETRIES_EXHAUSTED.get();

        let created = w.core.create_transaction(&payment(10_000, 2)).await.unwrap();

        let (peer, sent) = (w.selected_peer(), w.sent.clone());
        wait_until(move || peer.sent_count() == 2 && sent.is_empty()).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(w.selected_peer().sent_count(), 2);
        assert!(BROADCAST_RETRIES_EXHAUSTED.get() > exhausted);

        let header = w
            .core
            .processing()
            .ledger()
            .read(|s| s.transaction(&created.hash()))
            .unwrap();
        assert_eq!(header.status, TransactionStatus::New);

        w.core.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_api_acceptance_marks_relayed() {
        let api = Arc::new(MockApiBroadcaster::default());
        let w = wallet_with(WalletConfig::for_testing(), SendType::Api(api.clone()));
        w.core
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();

        let created = w.core.create_transaction(&payment(10_000, 2)).await.unwrap();

        let (ledger, id) = (w.core.processing().ledger().clone(), created.hash());
        wait_until(move || {
            ledger
                .read(|s| s.transaction(&id))
                .is_some_and(|tx| tx.status == TransactionStatus::Relayed)
        })
        .await;
        assert_eq!(*api.broadcast.lock(), vec![id]);
        assert!(w.peers.iter().all(|peer| peer.sent_count() == 0));

        w.core.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_api_rejection_invalidates() {
        let api = Arc::new(MockApiBroadcaster::default());
        let w = wallet_with(WalletConfig::for_testing(), SendType::Api(api.clone()));
        w.core
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();
        // signing is deterministic: the raw transaction has the final hash
        let raw = w.core.create_raw_transaction(&payment(10_000, 2)).unwrap();
        api.reject(raw.hash());

        let created = w.core.create_transaction(&payment(10_000, 2)).await.unwrap();
        assert_eq!(created.hash(), raw.hash());

        let (ledger, id) = (w.core.processing().ledger().clone(), created.hash());
        wait_until(move || ledger.read(|s| s.invalid_transaction(&id)).is_some()).await;
        assert!(w
            .core
            .processing()
            .ledger()
            .read(|s| s.transaction(&id))
            .is_none());

        w.core.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_all_peers_synced_flushes_offline_payments() {
        let w = wallet();
        w.core
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();
        // created while offline: stored but never handed to the worker
        let raw = w.core.create_raw_transaction(&payment(10_000, 2)).unwrap();
        w.core.processing().process_created(raw.clone()).unwrap();
        assert_eq!(w.selected_peer().sent_count(), 0);

        w.core.all_peers_synced().await.unwrap();

        let (peer, sent, id) = (w.selected_peer(), w.sent.clone(), raw.hash());
        wait_until(move || peer.sent_count() == 1 && sent.sent_transaction(&id).is_some()).await;

        w.core.shutdown().await.unwrap();
    }

    #[test]
    fn test_signer_is_deterministic() {
        let processing = processing();
        processing
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();
        let selection = CoinSelectionService::new(
            SelectionConfig::for_testing(),
            Arc::new(LedgerUnspentOutputs::new(processing.ledger().clone(), 0)),
        );
        let request = payment(10_000, 2);
        let plan = selection
            .plan(&request.params, request.recipient, request.change)
            .unwrap();

        let signer = MockSigner::default();
        assert_eq!(signer.sign(&plan).unwrap(), signer.sign(&plan).unwrap());
    }
}
