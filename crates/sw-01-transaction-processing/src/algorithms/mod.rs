//! # Algorithms

pub mod topological;

pub use topological::in_topological_order;
