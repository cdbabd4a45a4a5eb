//! # Transaction Creation
//!
//! Select → sign → process → broadcast.

pub mod signer;
pub mod transaction_creator;

pub use signer::{MockSigner, SignError, TransactionSigner};
pub use transaction_creator::{SendRequest, TransactionCreator};
