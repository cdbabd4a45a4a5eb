//! # Retry Policy
//!
//! A send round starts when a transaction is handed to peers and completes
//! when the first peer finishes with it (or times out). Only the first
//! completion of a round is counted.

use shared_types::{Hash, SentTransaction};

/// Result of completing a send round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Another peer already completed this round.
    AlreadyCounted,
    /// Round counted; the transaction stays eligible for resending.
    Counted(SentTransaction),
    /// Round counted and the retry budget is spent.
    Exhausted(SentTransaction),
}

/// Retry budget and resend period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_period_ms: u64,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, retry_period_ms: u64) -> Self {
        Self {
            max_retries,
            retry_period_ms,
        }
    }

    /// Whether a transaction with this record should be sent at `now`.
    pub fn is_due(&self, record: Option<&SentTransaction>, now: u64) -> bool {
        match record {
            None => true,
            Some(record) => record.last_send_time < now.saturating_sub(self.retry_period_ms),
        }
    }

    /// Record a new send round for `hash`.
    pub fn start(&self, record: Option<SentTransaction>, hash: Hash, now: u64) -> SentTransaction {
        match record {
            Some(mut record) => {
                record.last_send_time = now;
                record.send_success = false;
                record
            }
            None => SentTransaction::new(hash, now),
        }
    }

    /// Count the completion of the current round.
    pub fn complete(&self, mut record: SentTransaction) -> RoundOutcome {
        if record.send_success {
            return RoundOutcome::AlreadyCounted;
        }
        record.retries_count += 1;
        record.send_success = true;
        if record.retries_count >= self.max_retries {
            RoundOutcome::Exhausted(record)
        } else {
            RoundOutcome::Counted(record)
        }
    }
}
