//! # Coin Selection Service
//!
//! Smallest-first accumulation: candidates are ordered by
//! `(failed_to_spend, value)` and pushed one at a time until the queue
//! prices into a valid payment. Outputs whose earlier spend was invalidated
//! are tried last.

use shared_types::{ScriptType, UnspentOutput};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::{StandardDustCalculator, StandardSizeCalculator};
use crate::config::SelectionConfig;
use crate::domain::{
    OutputTarget, QueueParameters, SelectedUnspentOutputs, SelectionError, SendParameters,
    TransactionPlan, UnspentOutputQueue, UtxoFilters,
};
use crate::ports::{CoinSelectionApi, DustCalculator, SizeCalculator, UnspentOutputProvider};

/// Coin Selection Service - picks wallet outputs for a payment.
pub struct CoinSelectionService {
    config: SelectionConfig,
    provider: Arc<dyn UnspentOutputProvider>,
    size: Arc<dyn SizeCalculator>,
    dust: Arc<dyn DustCalculator>,
}

impl CoinSelectionService {
    /// Create a service with the standard size and dust calculators.
    pub fn new(config: SelectionConfig, provider: Arc<dyn UnspentOutputProvider>) -> Self {
        let size: Arc<dyn SizeCalculator> = Arc::new(StandardSizeCalculator::new());
        let dust = Arc::new(StandardDustCalculator::new(
            Arc::clone(&size),
            config.min_fee_rate,
        ));
        Self::with_calculators(config, provider, size, dust)
    }

    /// Create a service with custom calculators.
    pub fn with_calculators(
        config: SelectionConfig,
        provider: Arc<dyn UnspentOutputProvider>,
        size: Arc<dyn SizeCalculator>,
        dust: Arc<dyn DustCalculator>,
    ) -> Self {
        Self {
            config,
            provider,
            size,
            dust,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    fn output_script_type(&self, params: &SendParameters) -> ScriptType {
        params
            .output_script_type
            .unwrap_or(self.config.default_output_script_type)
    }

    /// Eligible outputs, smallest first with failed ones last.
    fn candidates(&self, params: &SendParameters) -> Vec<UnspentOutput> {
        let mut candidates = self.provider.spendable_utxo(&params.utxo_filters);
        if let Some(subset) = &params.unspent_outputs {
            candidates.retain(|unspent| subset.contains(&unspent.outpoint()));
        }
        candidates.sort_by_key(|unspent| (unspent.output.failed_to_spend, unspent.value()));
        candidates
    }

    fn queue(&self, params: &SendParameters, value: u64) -> UnspentOutputQueue<'_> {
        UnspentOutputQueue::new(
            QueueParameters {
                value,
                sender_pay: params.sender_pay,
                fee_rate: params.fee_rate,
                dust_threshold: params.dust_threshold,
                outputs_limit: self.config.outputs_limit,
                output_script_type: self.output_script_type(params),
                change_script_type: params
                    .change_script_type
                    .unwrap_or(self.config.default_change_script_type),
                plugin_data_output_size: params.plugin_data_output_size,
            },
            self.size.as_ref(),
            self.dust.as_ref(),
        )
    }
}

impl CoinSelectionApi for CoinSelectionService {
    fn select(&self, params: &SendParameters) -> Result<SelectedUnspentOutputs, SelectionError> {
        let value = match params.value {
            Some(value) if value > 0 => value,
            _ => {
                return Err(SelectionError::InvalidParameters(
                    "value must be positive".into(),
                ))
            }
        };

        let threshold = self.min_spendable(params);
        if value < threshold {
            return Err(SelectionError::Dust { value, threshold });
        }

        let candidates = self.candidates(params);
        let mut queue = self.queue(params, value);
        let mut last_error = None;

        for candidate in candidates {
            queue.push(candidate);
            match queue.calculate() {
                Ok(selected) => {
                    debug!(
                        "[sw-02] selected {} outputs for {} (fee {}, change {:?})",
                        selected.outputs.len(),
                        value,
                        selected.fee(),
                        selected.change_value
                    );
                    return Ok(selected);
                }
                Err(err) => last_error = Some(err),
            }
        }

        let err = last_error.unwrap_or(SelectionError::NotEnough { fee: 0 });
        warn!("[sw-02] selection for {} failed: {}", value, err);
        Err(err)
    }

    fn plan(
        &self,
        params: &SendParameters,
        recipient: OutputTarget,
        change: Option<OutputTarget>,
    ) -> Result<TransactionPlan, SelectionError> {
        let selected = self.select(params)?;
        TransactionPlan::build(selected, recipient, change, params.bip69, params.rbf_enabled)
    }

    fn max_spendable(&self, params: &SendParameters) -> u64 {
        let candidates = self.candidates(params);
        let mut queue = self.queue(params, 0);
        for candidate in candidates {
            queue.push(candidate);
        }
        queue
            .calculate_for(queue.total_value(), false)
            .map(|selected| selected.recipient_value)
            .unwrap_or(0)
    }

    fn min_spendable(&self, params: &SendParameters) -> u64 {
        self.dust
            .dust(self.output_script_type(params), params.dust_threshold)
    }

    fn all(&self, filters: &UtxoFilters) -> Vec<UnspentOutput> {
        self.provider.spendable_utxo(filters)
    }
}
