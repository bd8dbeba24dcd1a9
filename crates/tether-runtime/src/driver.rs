//! Async event pump
//!
//! The reactor itself is synchronous; this pump feeds it inbound events from
//! an mpsc channel and fires the replication tick on a fixed interval. The
//! pump ends - returning the peer for inspection or teardown - when the
//! event channel closes.

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use tether_core::PeerEvent;
use tether_session::Relay;

use crate::Peer;

/// Drive a peer until its event channel closes
pub async fn run_peer<R: Relay>(
    mut peer: Peer<R>,
    mut events: mpsc::Receiver<PeerEvent>,
) -> Peer<R> {
    let tick_interval = peer.config().tick_interval;
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => peer.tick(tick_interval),
            event = events.recv() => match event {
                Some(event) => peer.handle_event(event),
                None => break,
            },
        }
    }

    peer
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{EntityKey, NetworkTransform, PeerId, TetherResult, ViewId};
    use tether_session::{Rpc, RpcTarget};

    use crate::PeerConfig;

    struct NullRelay;

    impl Relay for NullRelay {
        fn self_id(&self) -> PeerId {
            PeerId::new(2)
        }

        fn authority(&self) -> PeerId {
            PeerId::new(1)
        }

        fn create_entity(
            &mut self,
            _template: &str,
            _spawn: &NetworkTransform,
        ) -> TetherResult<ViewId> {
            Ok(ViewId::new(1))
        }

        fn send_rpc(&mut self, _target: RpcTarget, _rpc: &Rpc) -> TetherResult<()> {
            Ok(())
        }

        fn publish_state(
            &mut self,
            _view_id: ViewId,
            _transform: &NetworkTransform,
        ) -> TetherResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_pump_processes_events_then_stops() {
        let peer = Peer::new(PeerConfig::default(), NullRelay);
        let (tx, rx) = mpsc::channel(16);

        tx.send(PeerEvent::Registration {
            key: EntityKey::from("m1"),
            view_id: ViewId::new(7),
            owner: PeerId::new(1),
            template: "shared_dog".to_owned(),
            spawn: NetworkTransform::IDENTITY,
        })
        .await
        .unwrap();
        drop(tx);

        let peer = run_peer(peer, rx).await;
        assert_eq!(peer.entity(&EntityKey::from("m1")), Some(ViewId::new(7)));
    }
}
