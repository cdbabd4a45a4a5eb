//! # Domain Layer
//!
//! Ownership, metadata extraction, conflict detection and invalidation.

pub mod conflicts;
pub mod errors;
pub mod input_resolver;
pub mod invalidator;
pub mod irregular;
pub mod metadata;
pub mod outcome;
pub mod ownership_cache;

#[cfg(test)]
pub(crate) mod fixtures;

pub use conflicts::ConflictResolver;
pub use errors::ProcessingError;
pub use input_resolver::resolve_inputs;
pub use invalidator::TransactionInvalidator;
pub use irregular::{IrregularOutputFinder, DEFAULT_IRREGULAR_SCRIPT_TYPES};
pub use metadata::MetadataExtractor;
pub use outcome::{ProcessOutcome, ProcessReport};
pub use ownership_cache::OwnershipCache;
