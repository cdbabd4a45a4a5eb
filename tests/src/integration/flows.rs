//! # Wallet Lifecycle Flows
//!
//! Drives the assembled wallet core the way the protocol layer would:
//!
//! 1. **Receive**: funding arrives in the mempool or a block (sw-01)
//! 2. **Pay**: coins are selected and signed (sw-02) and stored as `New`
//! 3. **Broadcast**: the worker announces the payment to peers (sw-03)
//! 4. **Relay / confirm**: the network echoes the payment back and mines it
//! 5. **Conflict**: a confirmed double spend invalidates the payment chain

#[cfg(test)]
mod tests {
    use shared_types::{Outpoint, TransactionStatus, SEQUENCE_FINAL};
    use sw_01_transaction_processing::{Ledger, LedgerReader, TransactionProcessorApi};
    use sw_03_transaction_broadcast::SentTransactionStore;
    use wallet_runtime::WalletConfig;

    use crate::integration::fixtures::{
        block, funding, hash, payment, spend, wait_until, wallet, wallet_with,
    };

    // =============================================================================
    // RECEIVE → PAY → RELAY → CONFIRM
    // =============================================================================

    #[tokio::test]
    async fn test_payment_lifecycle() {
        let w = wallet();
        w.core
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();

        let created = w.core.create_transaction(&payment(10_000, 2)).await.unwrap();
        let (peer, sent, id) = (w.selected_peer(), w.sent.clone(), created.hash());
        wait_until(move || peer.sent_count() >= 1 && sent.sent_transaction(&id).is_some()).await;

        // network echoes the payment: no more retries
        w.core.process_pending(vec![created.clone()]).await.unwrap();
        let sent = w.sent.clone();
        wait_until(move || sent.sent_transaction(&id).is_none()).await;
        let ledger = w.core.processing().ledger();
        assert_eq!(
            ledger.read(|s| s.transaction(&id)).unwrap().status,
            TransactionStatus::Relayed
        );

        // mined
        let outcome = w.core.process_block(vec![created.clone()], block(2, 101)).unwrap();
        assert_eq!(outcome.report().updated, vec![id]);
        let header = ledger.read(|s| s.transaction(&id)).unwrap();
        assert_eq!(header.block_hash, Some(block(2, 101).hash));

        let unspent = ledger.read(|s| s.unspent_outputs());
        assert_eq!(unspent.len(), 1);
        assert!(unspent[0].output.change_output);
        assert_eq!(unspent[0].transaction.hash, id);

        w.core.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_mempool_funding_refreshes_filter_and_confirms() {
        let w = wallet();

        w.core.process_pending(vec![funding(1, &[50_000])]).await.unwrap();
        assert!(!w.core.should_request_transaction(&hash(1)));
        assert!(w.bloom.regeneration_count() >= 1);

        let outcome = w
            .core
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();
        assert_eq!(outcome.report().updated, vec![hash(1)]);
        assert!(outcome.report().inserted.is_empty());
        assert_eq!(w.listener.updates.lock().len(), 2);

        w.core.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_privacy_mode_skips_incoming_mempool() {
        let mut config = WalletConfig::for_testing();
        config.processing.ignore_incoming = true;
        let w = wallet_with(config, sw_03_transaction_broadcast::SendType::P2p);

        let outcome = w.core.process_pending(vec![funding(1, &[50_000])]).await.unwrap();

        assert!(outcome.report().is_empty());
        assert!(w.core.should_request_transaction(&hash(1)));
        w.core.shutdown().await.unwrap();
    }

    // =============================================================================
    // CONFLICTS
    // =============================================================================

    #[tokio::test]
    async fn test_confirmed_double_spend_invalidates_payment_chain() {
        let w = wallet();
        w.core
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();
        let first = w.core.create_transaction(&payment(10_000, 2)).await.unwrap();
        // only the unconfirmed change of `first` is left to spend
        let second = w.core.create_transaction(&payment(5_000, 2)).await.unwrap();
        assert!(second
            .inputs
            .iter()
            .all(|input| input.previous_output_hash == first.hash()));

        let thief = spend(9, &[(hash(1), 0)], 49_000, SEQUENCE_FINAL);
        let outcome = w.core.process_block(vec![thief], block(2, 101)).unwrap();

        let invalidated = &outcome.report().invalidated;
        assert!(invalidated.contains(&first.hash()));
        assert!(invalidated.contains(&second.hash()));
        let ledger = w.core.processing().ledger();
        for id in [first.hash(), second.hash()] {
            let invalid = ledger.read(|s| s.invalid_transaction(&id)).unwrap();
            assert_eq!(invalid.header.status, TransactionStatus::Invalid);
            assert_eq!(invalid.header.conflicting_tx_hash, Some(hash(9)));
            assert!(ledger.read(|s| s.transaction(&id)).is_none());
        }

        w.core.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidated_payment_resurrected_by_block() {
        let w = wallet();
        w.core
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();
        let created = w.core.create_transaction(&payment(10_000, 2)).await.unwrap();
        let id = created.hash();

        w.core.processing().invalidate(&id).unwrap();
        let ledger = w.core.processing().ledger();
        assert!(ledger
            .read(|s| s.output(&Outpoint::new(hash(1), 0)))
            .unwrap()
            .failed_to_spend);

        w.core.process_block(vec![created], block(2, 101)).unwrap();

        let header = ledger.read(|s| s.transaction(&id)).unwrap();
        assert_eq!(header.status, TransactionStatus::Relayed);
        assert_eq!(header.conflicting_tx_hash, None);
        assert!(ledger.read(|s| s.invalid_transaction(&id)).is_none());
        assert!(!ledger
            .read(|s| s.output(&Outpoint::new(hash(1), 0)))
            .unwrap()
            .failed_to_spend);

        w.core.shutdown().await.unwrap();
    }
}
