//! Algorithms for transaction broadcast.

pub mod peer_selection;

pub use peer_selection::PeerSelector;
