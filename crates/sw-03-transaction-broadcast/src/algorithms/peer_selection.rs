//! # Peer Selection
//!
//! One synced peer is kept free so block sync can continue on it. Half of
//! the remaining ready peers get the transaction, not-yet-synced peers
//! first since they are the ones that still need to learn about it.

use std::sync::Arc;

use crate::ports::{InitialDownload, Peer, PeerManager};

/// Chooses the peers a send round goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerSelector {
    min_connected_peers: usize,
}

impl PeerSelector {
    /// Require at least `min_connected_peers` connected peers.
    pub fn new(min_connected_peers: usize) -> Self {
        Self {
            min_connected_peers,
        }
    }

    /// Select from the current state of the peer manager.
    pub fn select_from(
        &self,
        peers: &dyn PeerManager,
        download: &dyn InitialDownload,
    ) -> Vec<Arc<dyn Peer>> {
        self.select(
            peers.total_peers_count(),
            &peers.ready_peers(),
            &download.synced_peers(),
        )
    }

    /// Peers to send to; empty when sending is not possible.
    pub fn select(
        &self,
        total_peers: usize,
        ready: &[Arc<dyn Peer>],
        synced: &[Arc<dyn Peer>],
    ) -> Vec<Arc<dyn Peer>> {
        let Some(free) = synced
            .iter()
            .find(|peer| peer.is_ready())
            .or_else(|| synced.first())
        else {
            return Vec::new();
        };
        if total_peers < self.min_connected_peers {
            return Vec::new();
        }

        let is_synced = |peer: &Arc<dyn Peer>| synced.iter().any(|s| s.id() == peer.id());
        let mut candidates: Vec<Arc<dyn Peer>> = ready
            .iter()
            .filter(|peer| peer.id() != free.id())
            .cloned()
            .collect();
        // stable: keeps manager order within each group
        candidates.sort_by_key(|peer| is_synced(peer));

        if candidates.len() == 1 {
            return candidates;
        }
        candidates.truncate(candidates.len() / 2);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockPeerNetwork;

    fn ids(peers: &[Arc<dyn Peer>]) -> Vec<String> {
        peers.iter().map(|peer| peer.id().to_string()).collect()
    }

    #[test]
    fn test_no_synced_peer() {
        let (network, _) = MockPeerNetwork::with_peers(4, 0);
        assert!(PeerSelector::new(2).select_from(&*network, &*network).is_empty());
    }

    #[test]
    fn test_too_few_connected() {
        let (network, _) = MockPeerNetwork::with_peers(1, 1);
        assert!(PeerSelector::new(2).select_from(&*network, &*network).is_empty());
    }

    #[test]
    fn test_single_candidate_used() {
        let (network, _) = MockPeerNetwork::with_peers(2, 1);
        let selected = PeerSelector::new(2).select_from(&*network, &*network);
        assert_eq!(ids(&selected), vec!["peer-1"]);
    }

    #[test]
    fn test_half_of_rest_unsynced_first() {
        let (network, _) = MockPeerNetwork::with_peers(5, 2);
        let selected = PeerSelector::new(2).select_from(&*network, &*network);
        // peer-0 kept free; peer-1 synced so sorted last
        assert_eq!(ids(&selected), vec!["peer-2", "peer-3"]);
    }

    #[test]
    fn test_busy_synced_peer_not_kept_free() {
        let (network, peers) = MockPeerNetwork::with_peers(4, 2);
        peers[0].set_ready(false);
        let selected = PeerSelector::new(2).select_from(&*network, &*network);
        // peer-1 is the ready synced peer, so it is the one set aside
        assert_eq!(ids(&selected), vec!["peer-2"]);
    }

    #[test]
    fn test_busy_synced_fallback() {
        let (network, peers) = MockPeerNetwork::with_peers(3, 1);
        peers[0].set_ready(false);
        let selected = PeerSelector::new(2).select_from(&*network, &*network);
        assert_eq!(ids(&selected), vec!["peer-1"]);
    }
}
