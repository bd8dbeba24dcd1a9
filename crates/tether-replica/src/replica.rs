//! Entity replica state machine

use std::collections::HashMap;
use std::time::Duration;

use tether_core::{EntityKey, NetworkTransform, PeerId, Quat, Vec3, ViewId};
use tether_frame::CoordinateFrame;

/// Tuning for observer smoothing and owner-side scale limits
#[derive(Clone, Debug)]
pub struct ReplicaConfig {
    /// Exponential smoothing rate for position (per second)
    pub position_lerp_speed: f32,
    /// Exponential smoothing rate for rotation (per second)
    pub rotation_lerp_speed: f32,
    /// Lower bound for any scale component
    pub min_scale: f32,
    /// Upper bound for any scale component
    pub max_scale: f32,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        ReplicaConfig {
            position_lerp_speed: 10.0,
            rotation_lerp_speed: 10.0,
            min_scale: 0.5,
            max_scale: 3.0,
        }
    }
}

/// One shared entity as seen by the local peer
///
/// Role is fixed at construction: the owner reads its local transform and
/// publishes; observers receive and interpolate. Mutators are silent no-ops
/// on observers so input collaborators can call them unconditionally.
#[derive(Debug)]
pub struct EntityReplica {
    key: EntityKey,
    view_id: ViewId,
    owner: PeerId,
    owned: bool,
    /// Transform in the local frame - what rendering reads
    local: NetworkTransform,
    /// Last published (owner) or received (observer) network transform
    network: NetworkTransform,
    /// Driven by trigger tracking quality; loss never despawns
    visible: bool,
    /// Named-state key/value pairs applied via broadcast
    states: HashMap<String, String>,
    config: ReplicaConfig,
}

impl EntityReplica {
    /// Create a replica
    ///
    /// `local` is the spawn transform already converted into this peer's
    /// frame; `network` is the frame-independent spawn transform from the
    /// registration broadcast.
    pub fn new(
        key: EntityKey,
        view_id: ViewId,
        owner: PeerId,
        self_id: PeerId,
        local: NetworkTransform,
        network: NetworkTransform,
        config: ReplicaConfig,
    ) -> Self {
        EntityReplica {
            key,
            view_id,
            owner,
            owned: owner == self_id,
            local,
            network,
            visible: true,
            states: HashMap::new(),
            config,
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    pub fn owner(&self) -> PeerId {
        self.owner
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// The transform rendering should use, in the local frame
    pub fn local_transform(&self) -> &NetworkTransform {
        &self.local
    }

    /// The last published/received transform, in the network frame
    pub fn network_transform(&self) -> &NetworkTransform {
        &self.network
    }

    /// Named-state value applied via broadcast, if any
    pub fn state(&self, name: &str) -> Option<&str> {
        self.states.get(name).map(String::as_str)
    }

    pub fn apply_state(&mut self, name: String, value: String) {
        tracing::debug!(key = %self.key, %name, %value, "named state applied");
        self.states.insert(name, value);
    }

    /// Owner path: convert the current local transform to the network frame
    /// and hand it to the replication channel
    ///
    /// Returns `None` on observers.
    pub fn publish(&mut self, frame: &CoordinateFrame) -> Option<NetworkTransform> {
        if !self.owned {
            return None;
        }
        self.network = frame.transform_to_network(&self.local);
        Some(self.network)
    }

    /// Observer path: last-write-wins overwrite of the stored network
    /// transform
    ///
    /// A later publish always replaces the stored value; there are no
    /// sequence numbers. Owners ignore inbound state.
    pub fn receive(&mut self, transform: NetworkTransform) {
        if self.owned {
            return;
        }
        self.network = transform;
    }

    /// Advance interpolation by one tick
    ///
    /// Runs every tick whether or not a new publish arrived. Position and
    /// rotation ease exponentially toward the anchor-relative target with
    /// independent speeds; scale is applied directly.
    pub fn step(&mut self, frame: &CoordinateFrame, dt: Duration) {
        if self.owned {
            return;
        }

        let target = frame.transform_to_local(&self.network);
        let dt = dt.as_secs_f32();
        let t_pos = 1.0 - (-self.config.position_lerp_speed * dt).exp();
        let t_rot = 1.0 - (-self.config.rotation_lerp_speed * dt).exp();

        self.local.position = self.local.position.lerp(&target.position, t_pos);
        self.local.rotation = self.local.rotation.slerp(&target.rotation, t_rot);
        self.local.scale = target.scale;
    }

    /// Translate by a local-frame delta; no-op unless owned
    pub fn translate(&mut self, delta: Vec3) {
        if !self.owned {
            return;
        }
        self.local.position += delta;
    }

    /// Rotate by world-space euler angles in degrees (yaw, pitch, roll);
    /// no-op unless owned
    pub fn rotate(&mut self, euler_deg: Vec3) {
        if !self.owned {
            return;
        }
        let delta = Quat::from_euler(
            euler_deg.y.to_radians(),
            euler_deg.x.to_radians(),
            euler_deg.z.to_radians(),
        );
        self.local.rotation = (delta * self.local.rotation).normalize();
    }

    /// Multiply scale by a factor, clamped to the configured range; no-op
    /// unless owned
    pub fn rescale(&mut self, factor: f32) {
        if !self.owned {
            return;
        }
        self.local.scale =
            (self.local.scale * factor).clamp(self.config.min_scale, self.config.max_scale);
    }
}
