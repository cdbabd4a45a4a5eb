//! # Ports (Hexagonal Architecture)
//!
//! - `inbound`: API traits this subsystem provides
//! - `outbound`: Dependency traits this subsystem requires

pub mod inbound;
pub mod outbound;

pub use inbound::CoinSelectionApi;
pub use outbound::{DustCalculator, SizeCalculator, UnspentOutputProvider};
