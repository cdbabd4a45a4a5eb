//! Application layer for transaction broadcast.

pub mod sender;
pub mod worker;

pub use sender::{BroadcastPorts, Dispatch, SendType, TransactionSender};
pub use worker::{spawn_broadcast_worker, BroadcastHandle};
