//! # Domain Layer
//!
//! Send requests, the selection queue and transaction plans.

pub mod errors;
pub mod plan;
pub mod queue;
pub mod value_objects;

pub use errors::SelectionError;
pub use plan::{PlannedOutput, TransactionPlan};
pub use queue::{QueueParameters, UnspentOutputQueue};
pub use value_objects::{OutputTarget, SelectedUnspentOutputs, SendParameters, UtxoFilters};
