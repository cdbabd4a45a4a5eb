//! Copies previous-output data onto inputs.

use shared_types::FullTransaction;

use crate::ports::LedgerReader;

/// Fill `address`, `locking_script_payload` and `key_path` of each unresolved
/// input from the output it spends. Returns the number of inputs resolved.
pub fn resolve_inputs<R: LedgerReader + ?Sized>(
    transaction: &mut FullTransaction,
    ledger: &R,
) -> usize {
    let mut resolved = 0;
    for input in transaction.inputs.iter_mut().filter(|i| !i.is_resolved()) {
        let Some(previous) = ledger.output(&input.outpoint()) else {
            continue;
        };
        input.address = previous.address;
        input.locking_script_payload = previous.locking_script_payload;
        input.key_path = previous.key_path;
        if input.is_resolved() {
            resolved += 1;
        }
    }
    resolved
}
