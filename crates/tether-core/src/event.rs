//! Peer event definitions
//!
//! Every component reacts to discrete inbound events delivered in a defined
//! per-peer order: tracking updates, timer ticks, inbound RPCs, replication
//! packets, directory deltas. `PeerEvent` is that inbound enumeration;
//! `StatusEvent` is what the core reports back to UI collaborators instead
//! of throwing terminal errors.

use crate::{EntityKey, NetworkTransform, PeerId, Transform, ViewId};

/// Tracking quality of a trigger, as reported by the tracking collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingQuality {
    /// Actively tracked - pose is fresh
    Tracking,
    /// Pose is stale or low-confidence but not gone
    Limited,
    /// No longer observed locally
    Lost,
}

/// One partial update for a session-directory entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryDelta {
    pub name: String,
    pub max_players: u8,
    pub is_open: bool,
    pub is_visible: bool,
    pub player_count: u8,
    /// The transport reports this entry as gone from the listing
    pub removed: bool,
}

/// Inbound events consumed by a peer's reactor
#[derive(Clone, Debug)]
pub enum PeerEvent {
    /// A trigger (e.g. a marker) was observed locally for the first time
    TriggerDetected { key: EntityKey, pose: Transform },
    /// A known trigger produced a fresh pose
    TriggerUpdated {
        key: EntityKey,
        pose: Transform,
        quality: TrackingQuality,
    },
    /// A trigger is no longer observed locally
    TriggerLost { key: EntityKey },
    /// Buffered registration broadcast binding a key to its entity
    Registration {
        key: EntityKey,
        view_id: ViewId,
        owner: PeerId,
        template: String,
        spawn: NetworkTransform,
    },
    /// Named-state broadcast for an entity
    EntityState {
        view_id: ViewId,
        name: String,
        value: String,
    },
    /// Replication packet for an entity we observe
    StateReceived {
        view_id: ViewId,
        transform: NetworkTransform,
    },
    /// The relay elected a new authority peer
    AuthorityChanged { authority: PeerId },
    /// One batch of partial directory updates
    DirectoryBatch { deltas: Vec<DirectoryDelta> },
    /// The relay connection is gone
    Disconnected { reason: String },
}

/// Status reported to UI/input collaborators
#[derive(Clone, Debug, PartialEq)]
pub enum StatusEvent {
    /// The shared-frame anchor was (re)set
    AnchorSet,
    /// An entity registration was applied locally
    EntityRegistered { key: EntityKey, view_id: ViewId },
    /// A registration referenced an entity we could not resolve
    RegistrationDropped { key: EntityKey, view_id: ViewId },
    /// A named-state broadcast was applied to an entity
    EntityStateChanged {
        key: EntityKey,
        name: String,
        value: String,
    },
    /// The visible session listing changed
    DirectoryUpdated { sessions: usize },
    /// The relay connection failed; the peer is in the degraded state
    TransportFailed { reason: String },
}
