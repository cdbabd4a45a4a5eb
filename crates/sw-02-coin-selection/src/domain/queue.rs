//! # Unspent Output Queue
//!
//! Accumulates candidate outputs and tries to turn them into a payment.
//!
//! `calculate` is pure: it prices the current set and either returns the
//! split between recipient, change and fee, or the reason the set is not
//! yet enough. The selector keeps pushing until it succeeds.

use shared_types::{Output, ScriptType, UnspentOutput};

use crate::domain::{SelectedUnspentOutputs, SelectionError};
use crate::ports::{DustCalculator, SizeCalculator};

/// Fixed inputs of a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueParameters {
    /// Amount requested.
    pub value: u64,
    /// Fee added on top (true) or deducted from `value` (false).
    pub sender_pay: bool,
    /// Fee rate in sat/byte.
    pub fee_rate: u64,
    /// Caller dust floor.
    pub dust_threshold: Option<u64>,
    /// Sliding-window cap on the number of selected outputs.
    pub outputs_limit: Option<usize>,
    /// Payment script type.
    pub output_script_type: ScriptType,
    /// Change script type.
    pub change_script_type: ScriptType,
    /// Extra data-carrier output size.
    pub plugin_data_output_size: usize,
}

/// Candidate outputs for one selection.
pub struct UnspentOutputQueue<'a> {
    params: QueueParameters,
    size: &'a dyn SizeCalculator,
    dust: &'a dyn DustCalculator,
    selected: Vec<UnspentOutput>,
}

impl<'a> UnspentOutputQueue<'a> {
    /// Empty queue.
    pub fn new(
        params: QueueParameters,
        size: &'a dyn SizeCalculator,
        dust: &'a dyn DustCalculator,
    ) -> Self {
        Self {
            params,
            size,
            dust,
            selected: Vec::new(),
        }
    }

    /// Add a candidate, dropping the smallest one if the limit is exceeded.
    pub fn push(&mut self, output: UnspentOutput) {
        self.selected.push(output);
        let Some(limit) = self.params.outputs_limit else {
            return;
        };
        if self.selected.len() > limit {
            if let Some(smallest) = self
                .selected
                .iter()
                .enumerate()
                .min_by_key(|(_, candidate)| candidate.value())
                .map(|(position, _)| position)
            {
                self.selected.remove(smallest);
            }
        }
    }

    /// Currently selected outputs.
    pub fn selected(&self) -> &[UnspentOutput] {
        &self.selected
    }

    /// Sum of selected values.
    pub fn total_value(&self) -> u64 {
        self.selected.iter().map(UnspentOutput::value).sum()
    }

    /// Price the current selection for the configured request.
    pub fn calculate(&self) -> Result<SelectedUnspentOutputs, SelectionError> {
        self.calculate_for(self.params.value, self.params.sender_pay)
    }

    /// Price the current selection for `value` with the given fee side.
    pub fn calculate_for(
        &self,
        value: u64,
        sender_pay: bool,
    ) -> Result<SelectedUnspentOutputs, SelectionError> {
        if self.selected.is_empty() {
            return Err(SelectionError::EmptyOutputs);
        }
        let params = &self.params;
        let previous_outputs: Vec<Output> =
            self.selected.iter().map(|unspent| unspent.output.clone()).collect();

        let fee = self.size.transaction_size(
            &previous_outputs,
            &[params.output_script_type],
            params.plugin_data_output_size,
        ) * params.fee_rate;

        let total = self.total_value();
        let sent_value = if sender_pay { value.saturating_add(fee) } else { value };
        if total < sent_value {
            return Err(SelectionError::NotEnough { fee });
        }

        let recipient_value = if sender_pay { value } else { value.saturating_sub(fee) };
        let payment_dust = self
            .dust
            .dust(params.output_script_type, params.dust_threshold);
        if recipient_value < payment_dust {
            return Err(SelectionError::Dust {
                value: recipient_value,
                threshold: payment_dust,
            });
        }

        let remainder = total - recipient_value - fee;
        let change_fee = self.size.output_size(params.change_script_type) * params.fee_rate;
        let change_dust = self
            .dust
            .dust(params.change_script_type, params.dust_threshold);

        let change_value = if remainder <= change_dust + change_fee {
            None
        } else {
            Some(remainder - change_fee)
        };

        Ok(SelectedUnspentOutputs {
            outputs: self.selected.clone(),
            recipient_value,
            change_value,
        })
    }
}
