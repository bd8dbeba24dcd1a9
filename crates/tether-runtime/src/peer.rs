//! Peer reactor

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tether_core::{
    EntityKey, NetworkTransform, PeerEvent, PeerId, Quat, StatusEvent, TetherError, TetherResult,
    TrackingQuality, Transform, Vec3, ViewId,
};
use tether_directory::{DirectoryEntry, DirectoryReconciler};
use tether_frame::CoordinateFrame;
use tether_replica::{EntityReplica, ReplicaConfig};
use tether_session::{Platform, Relay, Rpc, RpcTarget};
use tether_spawn::{SpawnDecision, SpawnRegistry};

/// Explicit spawn performed at session start (VR peers)
#[derive(Clone, Debug)]
pub struct AutoSpawn {
    /// Application-assigned entity key
    pub key: EntityKey,
    /// Template to instantiate
    pub template: String,
    /// Spawn offset in the network frame
    pub offset: Vec3,
}

impl Default for AutoSpawn {
    fn default() -> Self {
        AutoSpawn {
            key: EntityKey::from("shared-object"),
            template: "shared_dog".to_owned(),
            offset: Vec3::new(0.0, 0.0, 2.0),
        }
    }
}

/// Peer configuration
#[derive(Clone, Debug)]
pub struct PeerConfig {
    /// Device kind - selects the anchoring policy
    pub platform: Platform,
    /// Replication tick interval
    pub tick_interval: Duration,
    /// Templates this application can instantiate; registrations naming
    /// anything else are dropped
    pub templates: Vec<String>,
    /// Template used for marker-triggered spawns
    pub trigger_template: String,
    /// Explicit spawn at session start, VR authority only
    pub auto_spawn: Option<AutoSpawn>,
    /// Replica smoothing and scale limits
    pub replica: ReplicaConfig,
    /// Cap on queued status events
    pub max_status_events: usize,
}

impl Default for PeerConfig {
    fn default() -> Self {
        PeerConfig {
            platform: Platform::Ar,
            tick_interval: Duration::from_millis(50),
            templates: vec!["shared_dog".to_owned()],
            trigger_template: "shared_dog".to_owned(),
            auto_spawn: None,
            replica: ReplicaConfig::default(),
            max_status_events: 256,
        }
    }
}

impl PeerConfig {
    /// Configuration for a VR peer with the default auto spawn
    pub fn vr() -> Self {
        PeerConfig {
            platform: Platform::Vr,
            auto_spawn: Some(AutoSpawn::default()),
            ..PeerConfig::default()
        }
    }
}

/// Counters for observability
#[derive(Clone, Debug, Default)]
pub struct PeerStats {
    pub ticks: u64,
    pub publishes: u64,
    pub spawn_requests: u64,
    pub registrations_applied: u64,
    pub registrations_dropped: u64,
    pub state_updates: u64,
    pub unknown_view_drops: u64,
    pub directory_batches: u64,
    pub disconnects: u64,
}

/// One participant's view of the shared scene
pub struct Peer<R: Relay> {
    config: PeerConfig,
    relay: R,
    frame: CoordinateFrame,
    registry: SpawnRegistry,
    replicas: HashMap<ViewId, EntityReplica>,
    directory: DirectoryReconciler,
    status: VecDeque<StatusEvent>,
    stats: PeerStats,
}

impl<R: Relay> Peer<R> {
    pub fn new(config: PeerConfig, relay: R) -> Self {
        let frame = match config.platform {
            // VR anchors on a fixed world origin, created once
            Platform::Vr => CoordinateFrame::world_origin(),
            // AR stays unanchored until the first marker detection
            Platform::Ar => CoordinateFrame::new(),
        };

        Peer {
            config,
            relay,
            frame,
            registry: SpawnRegistry::new(),
            replicas: HashMap::new(),
            directory: DirectoryReconciler::new(),
            status: VecDeque::new(),
            stats: PeerStats::default(),
        }
    }

    /// Called once the session is joined
    ///
    /// A VR authority peer spawns its configured shared object here; AR
    /// peers spawn nothing until a marker fires.
    pub fn start_session(&mut self) -> TetherResult<()> {
        let Some(auto) = self.config.auto_spawn.clone() else {
            return Ok(());
        };
        if !self.config.platform.is_vr() {
            return Ok(());
        }

        let spawn = NetworkTransform::new(auto.offset, Quat::IDENTITY, Vec3::ONE);
        let decision = self
            .registry
            .request(&auto.key, &auto.template, spawn, &mut self.relay)?;
        self.stats.spawn_requests += 1;
        tracing::debug!(key = %auto.key, ?decision, "session start spawn");
        Ok(())
    }

    /// Feed one inbound event through the reactor
    pub fn handle_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::TriggerDetected { key, pose } => self.on_trigger(key, pose),
            PeerEvent::TriggerUpdated { key, pose, quality } => {
                self.on_trigger_updated(key, pose, quality)
            }
            PeerEvent::TriggerLost { key } => {
                self.registry.on_trigger_lost(&key);
            }
            PeerEvent::Registration {
                key,
                view_id,
                owner,
                template,
                spawn,
            } => self.on_registration(key, view_id, owner, template, spawn),
            PeerEvent::EntityState {
                view_id,
                name,
                value,
            } => self.on_entity_state(view_id, name, value),
            PeerEvent::StateReceived { view_id, transform } => {
                self.on_state_received(view_id, transform)
            }
            PeerEvent::AuthorityChanged { authority } => {
                // Never retroactive: registered keys keep their bindings and
                // owners; only future unregistered triggers are eligible
                tracing::info!(%authority, "authority changed");
            }
            PeerEvent::DirectoryBatch { deltas } => {
                self.directory.apply_batch(&deltas);
                self.stats.directory_batches += 1;
                self.push_status(StatusEvent::DirectoryUpdated {
                    sessions: self.directory.len(),
                });
            }
            PeerEvent::Disconnected { reason } => self.on_disconnected(reason),
        }
    }

    /// Advance one replication tick: owners publish, observers interpolate
    pub fn tick(&mut self, dt: Duration) {
        self.stats.ticks += 1;
        for replica in self.replicas.values_mut() {
            if replica.is_owned() {
                if let Some(network) = replica.publish(&self.frame) {
                    match self.relay.publish_state(replica.view_id(), &network) {
                        Ok(()) => self.stats.publishes += 1,
                        Err(e) => {
                            tracing::warn!(view = %replica.view_id(), error = %e, "publish failed")
                        }
                    }
                }
            } else {
                replica.step(&self.frame, dt);
            }
        }
    }

    fn on_trigger(&mut self, key: EntityKey, pose: Transform) {
        // The freshest marker pose becomes the anchor on AR peers
        if self.config.platform.is_ar() {
            self.frame.set_anchor(pose);
            self.push_status(StatusEvent::AnchorSet);
        }

        let spawn_local = NetworkTransform::new(pose.position, pose.rotation, Vec3::ONE);
        let spawn = self.frame.transform_to_network(&spawn_local);
        let template = self.config.trigger_template.clone();
        match self.registry.request(&key, &template, spawn, &mut self.relay) {
            Ok(decision) => {
                self.stats.spawn_requests += 1;
                if matches!(decision, SpawnDecision::Created(_)) {
                    tracing::info!(%key, "trigger spawned shared entity");
                }
            }
            Err(e) => {
                self.push_status(StatusEvent::TransportFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn on_trigger_updated(&mut self, key: EntityKey, pose: Transform, quality: TrackingQuality) {
        if self.config.platform.is_ar() {
            // Re-anchor on every update, even limited ones - conversions
            // should follow the freshest pose we have
            self.frame.set_anchor(pose);
        }

        if !self.registry.contains(&key) {
            // Covers peers that never saw the detection event
            self.on_trigger(key, pose);
            return;
        }

        if let Some(view_id) = self.registry.get(&key) {
            if let Some(replica) = self.replicas.get_mut(&view_id) {
                replica.set_visible(quality == TrackingQuality::Tracking);
            }
        }
    }

    fn on_registration(
        &mut self,
        key: EntityKey,
        view_id: ViewId,
        owner: PeerId,
        template: String,
        spawn: NetworkTransform,
    ) {
        if !self.config.templates.iter().any(|t| *t == template) {
            // Unresolvable registration: drop it and leave the key unbound
            // until a resolvable one arrives
            tracing::warn!(%key, %view_id, %template, "registration dropped, unknown template");
            self.stats.registrations_dropped += 1;
            self.push_status(StatusEvent::RegistrationDropped { key, view_id });
            return;
        }

        self.registry.apply_registration(key.clone(), view_id);
        self.stats.registrations_applied += 1;

        if !self.replicas.contains_key(&view_id) {
            let local = self.frame.transform_to_local(&spawn);
            let replica = EntityReplica::new(
                key.clone(),
                view_id,
                owner,
                self.relay.self_id(),
                local,
                spawn,
                self.config.replica.clone(),
            );
            self.replicas.insert(view_id, replica);
        }

        tracing::info!(%key, %view_id, %owner, "registration applied");
        self.push_status(StatusEvent::EntityRegistered { key, view_id });
    }

    fn on_entity_state(&mut self, view_id: ViewId, name: String, value: String) {
        let Some(replica) = self.replicas.get_mut(&view_id) else {
            self.stats.unknown_view_drops += 1;
            return;
        };
        let key = replica.key().clone();
        replica.apply_state(name.clone(), value.clone());
        self.push_status(StatusEvent::EntityStateChanged { key, name, value });
    }

    fn on_state_received(&mut self, view_id: ViewId, transform: NetworkTransform) {
        match self.replicas.get_mut(&view_id) {
            Some(replica) => {
                replica.receive(transform);
                self.stats.state_updates += 1;
            }
            None => {
                // Replication for a view we have not registered yet
                self.stats.unknown_view_drops += 1;
            }
        }
    }

    fn on_disconnected(&mut self, reason: String) {
        // Degraded state: no anchor, wait for the next event; no retry
        tracing::warn!(%reason, "disconnected from relay");
        self.stats.disconnects += 1;
        self.frame.clear_anchor();
        self.push_status(StatusEvent::TransportFailed { reason });
    }

    // ---- anchor control -------------------------------------------------

    pub fn set_anchor(&mut self, anchor: Transform) {
        self.frame.set_anchor(anchor);
        self.push_status(StatusEvent::AnchorSet);
    }

    pub fn anchor(&self) -> Option<&Transform> {
        self.frame.anchor()
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    // ---- entity queries -------------------------------------------------

    /// The view bound to a key, if registered
    pub fn entity(&self, key: &EntityKey) -> Option<ViewId> {
        self.registry.get(key)
    }

    /// An entity's current network-frame transform
    pub fn entity_transform(&self, key: &EntityKey) -> Option<NetworkTransform> {
        let view_id = self.registry.get(key)?;
        self.replicas
            .get(&view_id)
            .map(|r| *r.network_transform())
    }

    pub fn replica(&self, view_id: ViewId) -> Option<&EntityReplica> {
        self.replicas.get(&view_id)
    }

    pub fn replica_by_key(&self, key: &EntityKey) -> Option<&EntityReplica> {
        self.replicas.get(&self.registry.get(key)?)
    }

    /// Current session listing
    pub fn sessions(&self) -> Vec<DirectoryEntry> {
        self.directory.listing()
    }

    // ---- interaction mutators ------------------------------------------

    /// Translate an entity; effective only on the owner
    pub fn move_entity(&mut self, key: &EntityKey, delta: Vec3) {
        if let Some(replica) = self.replica_by_key_mut(key) {
            replica.translate(delta);
        }
    }

    /// Rotate an entity by euler degrees; effective only on the owner
    pub fn rotate_entity(&mut self, key: &EntityKey, euler_deg: Vec3) {
        if let Some(replica) = self.replica_by_key_mut(key) {
            replica.rotate(euler_deg);
        }
    }

    /// Scale an entity by a factor; effective only on the owner
    pub fn scale_entity(&mut self, key: &EntityKey, factor: f32) {
        if let Some(replica) = self.replica_by_key_mut(key) {
            replica.rescale(factor);
        }
    }

    /// Broadcast a named-state change for an entity to every peer
    pub fn broadcast_state(
        &mut self,
        key: &EntityKey,
        name: &str,
        value: &str,
    ) -> TetherResult<()> {
        let view_id = self
            .registry
            .get(key)
            .ok_or_else(|| TetherError::EntityNotRegistered(key.clone()))?;
        self.relay.send_rpc(
            RpcTarget::All,
            &Rpc::SyncState {
                view_id,
                name: name.to_owned(),
                value: value.to_owned(),
            },
        )
    }

    // ---- status and stats ----------------------------------------------

    /// Drain queued status events for UI collaborators
    pub fn drain_status(&mut self) -> Vec<StatusEvent> {
        self.status.drain(..).collect()
    }

    pub fn stats(&self) -> &PeerStats {
        &self.stats
    }

    pub fn config(&self) -> &PeerConfig {
        &self.config
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn relay_mut(&mut self) -> &mut R {
        &mut self.relay
    }

    fn replica_by_key_mut(&mut self, key: &EntityKey) -> Option<&mut EntityReplica> {
        self.replicas.get_mut(&self.registry.get(key)?)
    }

    fn push_status(&mut self, event: StatusEvent) {
        if self.status.len() >= self.config.max_status_events {
            self.status.pop_front();
        }
        self.status.push_back(event);
    }
}
