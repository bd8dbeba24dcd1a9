//! Multi-peer scenario driver

use std::time::Duration;

use tether_core::PeerId;
use tether_runtime::{Peer, PeerConfig};
use tether_session::Relay;

use crate::{HubRelay, RelayHub};

/// Several peers wired to one hub, pumped in a fixed order
///
/// One pump round: every peer drains its inbox and handles the events, then
/// every peer ticks. Events emitted during a round are seen next round,
/// which models one hop of relay latency.
pub struct TestCluster {
    pub hub: RelayHub,
    pub peers: Vec<Peer<HubRelay>>,
}

impl TestCluster {
    pub fn new(configs: Vec<PeerConfig>) -> Self {
        let hub = RelayHub::new();
        let peers = configs
            .into_iter()
            .map(|config| Peer::new(config, hub.join()))
            .collect();
        TestCluster { hub, peers }
    }

    /// Add a late joiner; buffered RPCs are already waiting in its inbox
    pub fn add_peer(&mut self, config: PeerConfig) -> usize {
        self.peers.push(Peer::new(config, self.hub.join()));
        self.peers.len() - 1
    }

    pub fn peer_id(&self, index: usize) -> PeerId {
        self.peers[index].relay().self_id()
    }

    /// Remove a peer from the session entirely
    pub fn remove_peer(&mut self, index: usize) -> Peer<HubRelay> {
        let peer = self.peers.remove(index);
        self.hub.leave(peer.relay().self_id());
        peer
    }

    /// Run `rounds` pump rounds with the given tick delta
    pub fn pump(&mut self, rounds: usize, dt: Duration) {
        for _ in 0..rounds {
            for peer in &mut self.peers {
                let id = peer.relay().self_id();
                for event in self.hub.drain(id) {
                    peer.handle_event(event);
                }
            }
            for peer in &mut self.peers {
                peer.tick(dt);
            }
        }
    }

    /// Deliver pending events without ticking
    pub fn pump_events(&mut self) {
        for peer in &mut self.peers {
            let id = peer.relay().self_id();
            for event in self.hub.drain(id) {
                peer.handle_event(event);
            }
        }
    }
}
