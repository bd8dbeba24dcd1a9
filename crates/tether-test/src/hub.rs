//! In-memory relay hub

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tether_core::{
    DirectoryDelta, NetworkTransform, PeerEvent, PeerId, TetherError, TetherResult, ViewId,
};
use tether_session::{Relay, Rpc, RpcTarget, SessionOptions};
use tether_wire::{decode_directory_batch, decode_state, encode_directory_batch, encode_state};

#[derive(Default)]
struct HubState {
    next_peer: u64,
    next_view: u32,
    /// Members in join order; the head is the authority
    members: Vec<PeerId>,
    /// Buffered RPC events in send order, replayed to late joiners
    buffered: Vec<PeerEvent>,
    inboxes: HashMap<PeerId, VecDeque<PeerEvent>>,
    /// Creator recorded per view
    views: HashMap<ViewId, PeerId>,
    /// Last published transform per view
    last_state: HashMap<ViewId, NetworkTransform>,
    creates: u64,
}

impl HubState {
    fn authority(&self) -> PeerId {
        self.members.first().copied().unwrap_or(PeerId::ZERO)
    }

    fn deliver(&mut self, target: RpcTarget, sender: PeerId, event: PeerEvent) {
        if target.is_buffered() {
            self.buffered.push(event.clone());
        }
        for member in self.members.clone() {
            if target == RpcTarget::Others && member == sender {
                continue;
            }
            if let Some(inbox) = self.inboxes.get_mut(&member) {
                inbox.push_back(event.clone());
            }
        }
    }
}

fn rpc_to_event(rpc: &Rpc) -> PeerEvent {
    match rpc {
        Rpc::Register {
            key,
            view_id,
            owner,
            template,
            spawn,
        } => PeerEvent::Registration {
            key: key.clone(),
            view_id: *view_id,
            owner: *owner,
            template: template.clone(),
            spawn: *spawn,
        },
        Rpc::SyncState {
            view_id,
            name,
            value,
        } => PeerEvent::EntityState {
            view_id: *view_id,
            name: name.clone(),
            value: value.clone(),
        },
    }
}

/// The shared relay; hand out one [`HubRelay`] per joining peer
#[derive(Clone, Default)]
pub struct RelayHub {
    state: Rc<RefCell<HubState>>,
}

impl RelayHub {
    pub fn new() -> Self {
        RelayHub::default()
    }

    /// Join the session: allocates a peer id, replays every buffered RPC in
    /// send order into the new peer's inbox
    pub fn join(&self) -> HubRelay {
        let mut state = self.state.borrow_mut();
        state.next_peer += 1;
        let id = PeerId::new(state.next_peer);
        state.members.push(id);

        let replay: VecDeque<PeerEvent> = state.buffered.iter().cloned().collect();
        state.inboxes.insert(id, replay);

        HubRelay {
            state: Rc::clone(&self.state),
            id,
        }
    }

    /// Leave the session; if the authority left, the longest-lived remaining
    /// member is elected and everyone is told
    pub fn leave(&self, id: PeerId) {
        let mut state = self.state.borrow_mut();
        let was_authority = state.authority() == id;
        state.members.retain(|m| *m != id);
        state.inboxes.remove(&id);

        if was_authority && !state.members.is_empty() {
            let authority = state.authority();
            for member in state.members.clone() {
                if let Some(inbox) = state.inboxes.get_mut(&member) {
                    inbox.push_back(PeerEvent::AuthorityChanged { authority });
                }
            }
        }
    }

    /// Pop everything queued for one peer, in delivery order
    pub fn drain(&self, id: PeerId) -> Vec<PeerEvent> {
        let mut state = self.state.borrow_mut();
        match state.inboxes.get_mut(&id) {
            Some(inbox) => inbox.drain(..).collect(),
            None => Vec::new(),
        }
    }

    /// Push one directory delta batch to every member
    ///
    /// The batch is round-tripped through the wire codec, as the real
    /// transport would serialize it.
    pub fn push_directory(&self, deltas: Vec<DirectoryDelta>) {
        let wire = encode_directory_batch(&deltas).expect("encodable batch");
        let deltas = decode_directory_batch(&wire).expect("decodable batch");

        let mut state = self.state.borrow_mut();
        for member in state.members.clone() {
            if let Some(inbox) = state.inboxes.get_mut(&member) {
                inbox.push_back(PeerEvent::DirectoryBatch {
                    deltas: deltas.clone(),
                });
            }
        }
    }

    /// Announce a session in the lobby directory, the way a relay surfaces
    /// a freshly created room
    pub fn announce_session(&self, name: &str, options: &SessionOptions, player_count: u8) {
        self.push_directory(vec![DirectoryDelta {
            name: name.to_owned(),
            max_players: options.max_players,
            is_open: options.is_open,
            is_visible: options.is_visible,
            player_count,
            removed: false,
        }]);
    }

    pub fn authority(&self) -> PeerId {
        self.state.borrow().authority()
    }

    /// Total create calls the relay has served
    pub fn create_count(&self) -> u64 {
        self.state.borrow().creates
    }

    /// Last published transform for a view, if any
    pub fn last_state(&self, view_id: ViewId) -> Option<NetworkTransform> {
        self.state.borrow().last_state.get(&view_id).copied()
    }

    pub fn view_creator(&self, view_id: ViewId) -> Option<PeerId> {
        self.state.borrow().views.get(&view_id).copied()
    }
}

/// One peer's handle onto the hub
pub struct HubRelay {
    state: Rc<RefCell<HubState>>,
    id: PeerId,
}

impl Relay for HubRelay {
    fn self_id(&self) -> PeerId {
        self.id
    }

    fn authority(&self) -> PeerId {
        self.state.borrow().authority()
    }

    fn create_entity(
        &mut self,
        _template: &str,
        _spawn: &NetworkTransform,
    ) -> TetherResult<ViewId> {
        let mut state = self.state.borrow_mut();
        if !state.members.contains(&self.id) {
            return Err(TetherError::NotInSession);
        }
        state.next_view += 1;
        state.creates += 1;
        let view_id = ViewId::new(state.next_view);
        state.views.insert(view_id, self.id);
        Ok(view_id)
    }

    fn send_rpc(&mut self, target: RpcTarget, rpc: &Rpc) -> TetherResult<()> {
        // Round-trip through the wire codec so malformed payloads fail here,
        // exactly where a real relay would drop them
        let event = rpc_to_event(&Rpc::decode(&rpc.encode()?)?);
        let mut state = self.state.borrow_mut();
        if !state.members.contains(&self.id) {
            return Err(TetherError::NotInSession);
        }
        state.deliver(target, self.id, event);
        Ok(())
    }

    fn publish_state(
        &mut self,
        view_id: ViewId,
        transform: &NetworkTransform,
    ) -> TetherResult<()> {
        // Replication payloads cross the same serialization boundary as RPCs
        let transform = decode_state(&encode_state(transform))?;

        let mut state = self.state.borrow_mut();
        if !state.members.contains(&self.id) {
            return Err(TetherError::NotInSession);
        }
        if !state.views.contains_key(&view_id) {
            return Err(TetherError::ViewNotFound(view_id));
        }
        state.last_state.insert(view_id, transform);
        let event = PeerEvent::StateReceived {
            view_id,
            transform,
        };
        state.deliver(RpcTarget::Others, self.id, event);
        Ok(())
    }
}
