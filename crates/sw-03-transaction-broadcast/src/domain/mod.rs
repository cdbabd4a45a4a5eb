//! Domain layer for transaction broadcast.

pub mod errors;
pub mod retry;

pub use errors::BroadcastError;
pub use retry::{RetryPolicy, RoundOutcome};
