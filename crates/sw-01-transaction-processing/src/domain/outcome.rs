//! # Processing Outcome
//!
//! Result of applying a batch to the ledger.

use shared_types::Hash;

/// Hashes touched by a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Newly stored transactions.
    pub inserted: Vec<Hash>,
    /// Existing transactions whose header changed, including resurrections.
    pub updated: Vec<Hash>,
    /// Transactions moved to the invalid set.
    pub invalidated: Vec<Hash>,
}

impl ProcessReport {
    /// Nothing changed.
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.invalidated.is_empty()
    }

    pub(crate) fn mark_updated(&mut self, hash: Hash) {
        if !self.updated.contains(&hash) {
            self.updated.push(hash);
        }
    }
}

/// A successfully applied batch.
///
/// `AppliedNeedsFilterRefresh` asks the caller to regenerate the bloom
/// filter; the batch itself is committed either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Committed; the current filter still covers the wallet.
    Applied(ProcessReport),
    /// Committed; the filter must be regenerated.
    AppliedNeedsFilterRefresh(ProcessReport),
}

impl ProcessOutcome {
    pub(crate) fn new(report: ProcessReport, needs_filter_refresh: bool) -> Self {
        if needs_filter_refresh {
            ProcessOutcome::AppliedNeedsFilterRefresh(report)
        } else {
            ProcessOutcome::Applied(report)
        }
    }

    /// Whether the bloom filter must be regenerated.
    pub fn needs_filter_refresh(&self) -> bool {
        matches!(self, ProcessOutcome::AppliedNeedsFilterRefresh(_))
    }

    /// Hashes touched by the batch.
    pub fn report(&self) -> &ProcessReport {
        match self {
            ProcessOutcome::Applied(report) | ProcessOutcome::AppliedNeedsFilterRefresh(report) => {
                report
            }
        }
    }

    /// Consume into the report.
    pub fn into_report(self) -> ProcessReport {
        match self {
            ProcessOutcome::Applied(report) | ProcessOutcome::AppliedNeedsFilterRefresh(report) => {
                report
            }
        }
    }
}
