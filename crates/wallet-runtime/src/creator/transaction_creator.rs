//! # Transaction Creator
//!
//! Builds, stores and broadcasts a wallet payment:
//!
//! ```text
//! verify_can_send → plan (sw-02) → sign → process_created (sw-01)
//!                 → [refresh filter] → send (sw-03)
//! ```
//!
//! Peers are checked first so that nothing is written to the ledger for a
//! payment that could not be broadcast.

use shared_types::FullTransaction;
use std::sync::Arc;
use sw_01_transaction_processing::{Ledger, TransactionProcessingService, TransactionProcessorApi};
use sw_02_coin_selection::{CoinSelectionApi, OutputTarget, SelectionError, SendParameters};
use sw_03_transaction_broadcast::TransactionSenderApi;
use wallet_telemetry::{
    log_tx_event, metric_inc, FILTER_REFRESH_SIGNALS, SELECTION_FAILURES, TRANSACTIONS_CREATED,
};

use crate::creator::TransactionSigner;
use crate::errors::RuntimeError;

/// A payment to create.
#[derive(Debug, Clone)]
pub struct SendRequest {
    /// Amount, fee rate and selection options.
    pub params: SendParameters,
    /// Payment destination.
    pub recipient: OutputTarget,
    /// Change destination; required whenever the plan has change.
    pub change: Option<OutputTarget>,
}

impl SendRequest {
    /// Pay `value` at `fee_rate` to `recipient`, returning change to `change`.
    pub fn new(value: u64, fee_rate: u64, recipient: OutputTarget, change: OutputTarget) -> Self {
        Self {
            params: SendParameters::new(value, fee_rate),
            recipient,
            change: Some(change),
        }
    }
}

fn failure_reason(err: &SelectionError) -> &'static str {
    match err {
        SelectionError::InvalidParameters(_) => "invalid_parameters",
        SelectionError::Dust { .. } => "dust",
        SelectionError::NotEnough { .. } => "not_enough",
        SelectionError::EmptyOutputs => "empty_outputs",
    }
}

/// Creates wallet transactions.
pub struct TransactionCreator<L: Ledger> {
    selection: Arc<dyn CoinSelectionApi>,
    signer: Arc<dyn TransactionSigner>,
    processing: Arc<TransactionProcessingService<L>>,
    broadcast: Arc<dyn TransactionSenderApi>,
}

impl<L: Ledger> TransactionCreator<L> {
    /// Create a creator over the given subsystems.
    pub fn new(
        selection: Arc<dyn CoinSelectionApi>,
        signer: Arc<dyn TransactionSigner>,
        processing: Arc<TransactionProcessingService<L>>,
        broadcast: Arc<dyn TransactionSenderApi>,
    ) -> Self {
        Self {
            selection,
            signer,
            processing,
            broadcast,
        }
    }

    /// Build, store and queue `request` for broadcast.
    pub async fn create(&self, request: &SendRequest) -> Result<FullTransaction, RuntimeError> {
        self.broadcast.verify_can_send()?;

        let transaction = self.create_raw(request)?;
        let outcome = self.processing.process_created(transaction.clone())?;
        if outcome.needs_filter_refresh() {
            metric_inc!(FILTER_REFRESH_SIGNALS);
            self.processing.refresh_filter()?;
        }
        self.broadcast.send(transaction.clone()).await?;

        metric_inc!(TRANSACTIONS_CREATED);
        log_tx_event!(
            info,
            "sw-rt",
            "transaction created",
            hex::encode(transaction.hash()),
            inputs = transaction.inputs.len(),
            outputs = transaction.outputs.len()
        );
        Ok(transaction)
    }

    /// Select and sign without storing or sending.
    pub fn create_raw(&self, request: &SendRequest) -> Result<FullTransaction, RuntimeError> {
        let plan = self
            .selection
            .plan(&request.params, request.recipient.clone(), request.change.clone())
            .map_err(|err| {
                metric_inc!(SELECTION_FAILURES, &[failure_reason(&err)]);
                err
            })?;
        Ok(self.signer.sign(&plan)?)
    }
}
