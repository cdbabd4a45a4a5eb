//! Adapters for transaction broadcast.

pub mod memory_store;

pub use memory_store::InMemorySentTransactionStore;
