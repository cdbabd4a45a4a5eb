//! # Metadata Extractor
//!
//! Decides whether a transaction concerns the wallet and derives its
//! direction, amount and fee.
//!
//! Inputs are matched against the [`OwnershipCache`]; extraction must
//! therefore run in dependency order so that outputs created earlier in a
//! batch are known when later transactions spend them.

use parking_lot::RwLock;
use shared_types::{short_hex, FullTransaction, TransactionMetadata, TransactionType};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::warn;

use crate::domain::OwnershipCache;
use crate::ports::LedgerReader;

/// Derives `is_mine`, `is_outgoing` and `TransactionMetadata`.
pub struct MetadataExtractor {
    cache: Arc<RwLock<OwnershipCache>>,
}

impl MetadataExtractor {
    /// Create an extractor over a shared cache.
    pub fn new(cache: Arc<RwLock<OwnershipCache>>) -> Self {
        Self { cache }
    }

    /// The cache this extractor reads and extends.
    pub fn cache(&self) -> &Arc<RwLock<OwnershipCache>> {
        &self.cache
    }

    /// Extract metadata into `transaction`.
    ///
    /// Leaves the transaction untouched when neither an input nor an output
    /// belongs to the wallet, or when its values overflow `u64`.
    pub fn extract<R: LedgerReader + ?Sized>(&self, transaction: &mut FullTransaction, ledger: &R) {
        let Some(totals) = self.totals(transaction) else {
            warn!(
                "[sw-01] {} skipped: value totals overflow",
                short_hex(&transaction.header.hash)
            );
            return;
        };
        let Totals {
            my_inputs,
            all_inputs_mine,
            outputs,
            my_outputs,
            my_change,
        } = totals;

        if my_inputs == 0 && my_outputs == 0 {
            return;
        }

        transaction.header.is_mine = true;
        transaction.header.is_outgoing = my_inputs > 0;

        let mut net = i128::from(my_outputs) - i128::from(my_inputs);
        let fee = if all_inputs_mine {
            let fee = i128::from(my_inputs) - i128::from(outputs);
            net += fee;
            u64::try_from(fee).ok()
        } else {
            resolve_fee(transaction, outputs, ledger)
        };

        let (transaction_type, amount) = match net.cmp(&0) {
            Ordering::Greater => (TransactionType::Incoming, net),
            Ordering::Less => (TransactionType::Outgoing, -net),
            Ordering::Equal => (
                TransactionType::SentToSelf,
                i128::from(my_outputs - my_change),
            ),
        };

        transaction.metadata = TransactionMetadata {
            transaction_hash: transaction.header.hash,
            transaction_type,
            amount: u64::try_from(amount).unwrap_or(u64::MAX),
            fee,
        };

        if my_outputs > 0 {
            self.cache.write().add(&transaction.outputs);
        }
    }

    /// Value sums over inputs and outputs; `None` on overflow.
    fn totals(&self, transaction: &FullTransaction) -> Option<Totals> {
        let mut totals = Totals {
            all_inputs_mine: !transaction.inputs.is_empty(),
            ..Totals::default()
        };
        {
            let cache = self.cache.read();
            for input in &transaction.inputs {
                match cache.value_of(&input.outpoint()) {
                    Some(value) => totals.my_inputs = totals.my_inputs.checked_add(value)?,
                    None => totals.all_inputs_mine = false,
                }
            }
        }

        for output in transaction.outputs.iter().filter(|o| o.value > 0) {
            totals.outputs = totals.outputs.checked_add(output.value)?;
            if output.is_mine() {
                totals.my_outputs = totals.my_outputs.checked_add(output.value)?;
                if output.change_output {
                    totals.my_change = totals.my_change.checked_add(output.value)?;
                }
            }
        }
        Some(totals)
    }
}

#[derive(Default)]
struct Totals {
    my_inputs: u64,
    all_inputs_mine: bool,
    outputs: u64,
    my_outputs: u64,
    my_change: u64,
}

/// Fee from stored previous outputs; `None` if any input is unknown.
fn resolve_fee<R: LedgerReader + ?Sized>(
    transaction: &FullTransaction,
    outputs_total: u64,
    ledger: &R,
) -> Option<u64> {
    let mut inputs_total: u64 = 0;
    for input in &transaction.inputs {
        inputs_total = inputs_total.checked_add(ledger.output(&input.outpoint())?.value)?;
    }
    inputs_total.checked_sub(outputs_total)
}
