//! # Algorithms

pub mod bip69;

pub use bip69::{sort_inputs, sort_outputs};
