//! # Adapters
//!
//! Default calculators and an in-memory output provider.

pub mod dust;
pub mod memory_provider;
pub mod size;

pub use dust::StandardDustCalculator;
pub use memory_provider::InMemoryUnspentOutputProvider;
pub use size::StandardSizeCalculator;
