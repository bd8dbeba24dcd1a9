//! Relay interface consumed by the core components

use tether_core::{NetworkTransform, PeerId, TetherResult, ViewId};
use tether_wire::{Rpc, RpcTarget};

/// The transport seam
///
/// Guarantees required of an implementation:
/// - `create_entity` allocates a `ViewId` that is unique session-wide even
///   when several peers race the call, because creation is routed through
///   the relay sequentially.
/// - RPCs to a given peer arrive in send order; buffered RPCs are replayed
///   in that same order to peers joining after the send.
/// - `publish_state` is last-write-wins per view; delivery order per peer
///   follows publish order.
pub trait Relay {
    /// This peer's relay-assigned identity
    fn self_id(&self) -> PeerId;

    /// The current authority peer (the relay's election rule, typically the
    /// longest-lived member)
    fn authority(&self) -> PeerId;

    /// Whether the local peer is currently the authority
    fn is_authority(&self) -> bool {
        self.authority() == self.self_id()
    }

    /// Create a networked entity, returning its globally unique view id
    fn create_entity(
        &mut self,
        template: &str,
        spawn: &NetworkTransform,
    ) -> TetherResult<ViewId>;

    /// Send an RPC to the given target set
    fn send_rpc(&mut self, target: RpcTarget, rpc: &Rpc) -> TetherResult<()>;

    /// Publish this tick's state for an entity on its replication channel
    fn publish_state(
        &mut self,
        view_id: ViewId,
        transform: &NetworkTransform,
    ) -> TetherResult<()>;
}
