//! # Application Layer
//!
//! - `service`: shared state and batch plumbing
//! - `block`: confirmed transactions
//! - `pending`: mempool and locally created transactions
//! - `syncer`: broadcast feedback

mod block;
mod pending;
pub mod service;
pub mod syncer;

pub use service::TransactionProcessingService;
pub use syncer::TransactionSyncer;
