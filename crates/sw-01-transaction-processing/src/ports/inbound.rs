//! # Inbound Ports
//!
//! API offered to the protocol layer and to the wallet runtime.

use shared_types::{Block, FullTransaction, Hash};

use crate::domain::{ProcessOutcome, ProcessReport, ProcessingError};

/// Where a batch of transactions came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestContext {
    /// Confirmed in this block.
    InBlock(Block),
    /// Announced by a peer's mempool.
    Pending,
    /// Built and signed by this wallet.
    LocallyCreated,
}

/// Transaction ingestion API - inbound port.
pub trait TransactionProcessorApi: Send + Sync {
    /// Apply transactions confirmed in `block`.
    fn process_block(
        &self,
        transactions: Vec<FullTransaction>,
        block: Block,
    ) -> Result<ProcessOutcome, ProcessingError>;

    /// Apply transactions announced from the mempool.
    fn process_pending(
        &self,
        transactions: Vec<FullTransaction>,
    ) -> Result<ProcessOutcome, ProcessingError>;

    /// Apply a transaction this wallet created.
    fn process_created(
        &self,
        transaction: FullTransaction,
    ) -> Result<ProcessOutcome, ProcessingError>;

    /// Move a transaction and its descendants to the invalid set.
    fn invalidate(&self, hash: &Hash) -> Result<ProcessReport, ProcessingError>;

    /// Dispatch on `context`.
    fn process(
        &self,
        transactions: Vec<FullTransaction>,
        context: IngestContext,
    ) -> Result<ProcessOutcome, ProcessingError> {
        match context {
            IngestContext::InBlock(block) => self.process_block(transactions, block),
            IngestContext::Pending => self.process_pending(transactions),
            IngestContext::LocallyCreated => {
                let mut report = ProcessReport::default();
                let mut needs_refresh = false;
                for transaction in transactions {
                    let outcome = self.process_created(transaction)?;
                    needs_refresh |= outcome.needs_filter_refresh();
                    report.inserted.extend(outcome.into_report().inserted);
                }
                Ok(if needs_refresh {
                    ProcessOutcome::AppliedNeedsFilterRefresh(report)
                } else {
                    ProcessOutcome::Applied(report)
                })
            }
        }
    }
}
