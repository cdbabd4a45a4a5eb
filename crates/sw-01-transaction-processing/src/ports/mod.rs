//! # Ports (Hexagonal Architecture)
//!
//! - `inbound`: API traits this subsystem provides
//! - `outbound`: Dependency traits this subsystem requires

pub mod inbound;
pub mod outbound;

pub use inbound::{IngestContext, TransactionProcessorApi};
pub use outbound::{
    BloomFilterManager, Ledger, LedgerListener, LedgerReader, LedgerStore, LedgerUpdate,
    MockBloomFilterManager, MockPublicKeyManager, PublicKeyManager, RecordingListener,
};
