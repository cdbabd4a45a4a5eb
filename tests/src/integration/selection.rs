//! # Coin Selection over a Live Ledger
//!
//! Coin selection (sw-02) reads spendable outputs from the processing
//! ledger (sw-01) through `LedgerUnspentOutputs`, so ledger events shape
//! what gets selected: spends, invalidations, confirmations.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use shared_types::{
        FullTransaction, KeyPath, Output, ScriptType, UnspentOutput, SEQUENCE_RBF,
    };
    use sw_01_transaction_processing::{
        InMemoryLedger, TransactionProcessingService, TransactionProcessorApi,
    };
    use sw_02_coin_selection::{
        CoinSelectionApi, CoinSelectionService, SelectionConfig, SelectionError, SendParameters,
        UtxoFilters,
    };
    use wallet_runtime::LedgerUnspentOutputs;

    use crate::integration::fixtures::{block, funding, hash, processing, spend};

    fn selector(
        processing: &Arc<TransactionProcessingService<InMemoryLedger>>,
        config: SelectionConfig,
    ) -> CoinSelectionService {
        let provider =
            LedgerUnspentOutputs::new(processing.ledger().clone(), config.min_confirmations);
        CoinSelectionService::new(config, Arc::new(provider))
    }

    fn values(outputs: &[UnspentOutput]) -> Vec<u64> {
        outputs.iter().map(UnspentOutput::value).collect()
    }

    // =============================================================================
    // ORDERING
    // =============================================================================

    #[test]
    fn test_small_outputs_chosen_before_large() {
        let processing = processing();
        processing
            .process_block(vec![funding(1, &[20_000, 1_000, 5_000])], block(1, 100))
            .unwrap();
        let svc = selector(&processing, SelectionConfig::for_testing());

        let selected = svc.select(&SendParameters::new(4_000, 1)).unwrap();
        assert_eq!(values(&selected.outputs), vec![1_000, 5_000]);

        let selected = svc.select(&SendParameters::new(6_000, 1)).unwrap();
        assert_eq!(values(&selected.outputs), vec![1_000, 5_000, 20_000]);
    }

    #[test]
    fn test_failed_to_spend_output_tried_last() {
        let processing = processing();
        processing
            .process_block(
                vec![funding(1, &[1_000]), funding(2, &[5_000])],
                block(1, 100),
            )
            .unwrap();
        processing
            .process_created(spend(3, &[(hash(1), 0)], 800, SEQUENCE_RBF))
            .unwrap();
        processing.invalidate(&hash(3)).unwrap();
        let svc = selector(&processing, SelectionConfig::for_testing());

        let selected = svc.select(&SendParameters::new(600, 1)).unwrap();

        assert_eq!(values(&selected.outputs), vec![5_000]);
        assert_eq!(svc.all(&UtxoFilters::default()).len(), 2);
    }

    #[test]
    fn test_pending_spend_hides_outputs() {
        let processing = processing();
        processing
            .process_block(vec![funding(1, &[1_000, 5_000])], block(1, 100))
            .unwrap();
        processing
            .process_created(spend(3, &[(hash(1), 1)], 4_800, SEQUENCE_RBF))
            .unwrap();
        let svc = selector(&processing, SelectionConfig::for_testing());

        assert_eq!(values(&svc.all(&UtxoFilters::default())), vec![1_000]);
        assert!(matches!(
            svc.select(&SendParameters::new(4_000, 1)),
            Err(SelectionError::NotEnough { .. })
        ));
    }

    // =============================================================================
    // CONFIRMATIONS
    // =============================================================================

    #[test]
    fn test_min_confirmations_exempts_own_change() {
        let processing = processing();
        processing
            .process_block(vec![funding(1, &[50_000])], block(1, 100))
            .unwrap();
        processing
            .process_block(vec![funding(2, &[7_000])], block(2, 101))
            .unwrap();
        let template = spend(3, &[(hash(1), 0)], 10_000, SEQUENCE_RBF);
        let own = FullTransaction::new(
            template.header,
            template.inputs,
            vec![
                Output::new(10_000, 0, ScriptType::P2pkh),
                Output::new(39_000, 1, ScriptType::P2pkh).owned_by(KeyPath::change(0, 0)),
            ],
        );
        processing.process_created(own).unwrap();

        let config = SelectionConfig {
            min_confirmations: 2,
            ..SelectionConfig::for_testing()
        };
        let svc = selector(&processing, config);

        // funding 2 has one confirmation; the unconfirmed change is ours
        assert_eq!(values(&svc.all(&UtxoFilters::default())), vec![39_000]);
    }

    // =============================================================================
    // MAX SPENDABLE
    // =============================================================================

    #[test]
    fn test_max_spendable_is_balance_minus_send_all_fee() {
        let processing = processing();
        processing
            .process_block(vec![funding(1, &[1_000, 5_000, 20_000])], block(1, 100))
            .unwrap();
        let svc = selector(&processing, SelectionConfig::for_testing());

        // 3-in 1-out P2PKH at 1 sat/byte: 10 + 3 * 148 + 34
        assert_eq!(svc.max_spendable(&SendParameters::new(1, 1)), 26_000 - 488);
    }

    #[test]
    fn test_max_spendable_empty_wallet() {
        let processing = processing();
        let svc = selector(&processing, SelectionConfig::for_testing());
        assert_eq!(svc.max_spendable(&SendParameters::new(1, 1)), 0);
    }

    proptest! {
        #[test]
        fn prop_max_spendable_never_exceeds_balance(
            values in prop::collection::vec(1_000u64..100_000, 1..6),
            fee_rate in 1u64..20,
        ) {
            let processing = processing();
            processing
                .process_block(vec![funding(1, &values)], block(1, 100))
                .unwrap();
            let svc = selector(&processing, SelectionConfig::for_testing());

            let balance: u64 = values.iter().sum();
            let fee = (44 + 148 * values.len() as u64) * fee_rate;
            let max = svc.max_spendable(&SendParameters::new(1, fee_rate));

            prop_assert!(max <= balance);
            if balance > fee + 546 {
                prop_assert_eq!(max, balance - fee);
            }
        }
    }
}
