//! # Topological Ordering
//!
//! Orders a batch so that a transaction spending the output of another
//! in-batch transaction always comes after it.
//!
//! Depth-first with explicit visit marks. Re-entering a transaction that
//! is still being visited means the batch contains a spend cycle, which
//! valid chain data never does: it is either rejected or, when
//! `reject_cycles` is off, the back edge is ignored.

use shared_types::{short_hex, FullTransaction, Hash};
use std::collections::HashMap;

use crate::domain::ProcessingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Emitted,
}

/// Reorder `transactions` parents-first. Unrelated transactions keep their
/// relative order.
pub fn in_topological_order(
    transactions: Vec<FullTransaction>,
    reject_cycles: bool,
) -> Result<Vec<FullTransaction>, ProcessingError> {
    let count = transactions.len();
    if count == 0 {
        return Ok(transactions);
    }

    let mut position: HashMap<Hash, usize> = HashMap::with_capacity(count);
    for (index, transaction) in transactions.iter().enumerate() {
        position.entry(transaction.hash()).or_insert(index);
    }

    let mut marks = vec![Mark::Unvisited; count];
    let mut emitted: Vec<usize> = Vec::with_capacity(count);

    for root in 0..count {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::Visiting;
        // (transaction, next input to inspect)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, next_input) = *frame;
            let Some(input) = transactions[node].inputs.get(next_input) else {
                marks[node] = Mark::Emitted;
                emitted.push(node);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            let Some(&parent) = position.get(&input.previous_output_hash) else {
                continue;
            };
            match marks[parent] {
                Mark::Unvisited => {
                    marks[parent] = Mark::Visiting;
                    stack.push((parent, 0));
                }
                Mark::Visiting if reject_cycles => {
                    return Err(ProcessingError::CycleDetected(short_hex(
                        &transactions[node].hash(),
                    )));
                }
                Mark::Visiting | Mark::Emitted => {}
            }
        }
    }

    let mut slots: Vec<Option<FullTransaction>> = transactions.into_iter().map(Some).collect();
    Ok(emitted
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect())
}
