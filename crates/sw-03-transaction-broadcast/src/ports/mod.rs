//! # Ports (Hexagonal Architecture)
//!
//! - `inbound`: API traits this subsystem provides
//! - `outbound`: Dependency traits this subsystem requires

pub mod inbound;
pub mod outbound;

pub use inbound::TransactionSenderApi;
pub use outbound::{
    ApiBroadcaster, BroadcastListener, InitialDownload, MockApiBroadcaster, MockPeer,
    MockPeerNetwork, MockPendingSource, MockTimeSource, Peer, PeerBehavior, PeerManager,
    PendingTransactionSource, RecordingBroadcastListener, SentTransactionStore, SystemTimeSource,
    TimeSource,
};
