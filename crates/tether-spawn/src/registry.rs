//! Key-to-entity binding and the spawn arbitration protocol

use std::collections::{HashMap, HashSet};

use tether_core::{EntityKey, NetworkTransform, TetherResult, ViewId};
use tether_session::{Relay, Rpc, RpcTarget};

/// Outcome of a local trigger or explicit spawn request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnDecision {
    /// The key is already bound to a live entity
    AlreadyBound(ViewId),
    /// We created it and broadcast the registration; the binding lands when
    /// our own buffered RPC comes back around
    Created(ViewId),
    /// Our create is in flight; the registration has not arrived yet
    InFlight,
    /// Not the authority - the registration broadcast will arrive from
    /// whoever is
    AwaitingAuthority,
}

/// Deduplicated, authoritative creation of shared entities keyed by trigger
/// identity
#[derive(Debug, Default)]
pub struct SpawnRegistry {
    /// Applied registrations - the single source of truth
    bindings: HashMap<EntityKey, ViewId>,
    /// Keys we created but whose registration has not come back yet
    pending: HashSet<EntityKey>,
}

impl SpawnRegistry {
    pub fn new() -> Self {
        SpawnRegistry::default()
    }

    /// The view bound to a key, if registered
    pub fn get(&self, key: &EntityKey) -> Option<ViewId> {
        self.bindings.get(key).copied()
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &ViewId)> {
        self.bindings.iter()
    }

    /// Handle a local trigger (or an explicit named spawn) for `key`
    ///
    /// Idempotent re-entry: a bound or in-flight key never creates again.
    /// Non-authority peers do nothing and wait for the registration
    /// broadcast. The authority routes creation through the relay - which
    /// serializes racing create calls and allocates the globally unique
    /// view id - then broadcasts a buffered registration so every peer,
    /// present or future, applies the same binding.
    pub fn request(
        &mut self,
        key: &EntityKey,
        template: &str,
        spawn: NetworkTransform,
        relay: &mut impl Relay,
    ) -> TetherResult<SpawnDecision> {
        if let Some(view_id) = self.get(key) {
            return Ok(SpawnDecision::AlreadyBound(view_id));
        }
        if self.pending.contains(key) {
            return Ok(SpawnDecision::InFlight);
        }
        if !relay.is_authority() {
            tracing::debug!(%key, "trigger on non-authority peer, awaiting registration");
            return Ok(SpawnDecision::AwaitingAuthority);
        }

        let view_id = relay.create_entity(template, &spawn)?;
        relay.send_rpc(
            RpcTarget::AllBuffered,
            &Rpc::Register {
                key: key.clone(),
                view_id,
                owner: relay.self_id(),
                template: template.to_owned(),
                spawn,
            },
        )?;
        self.pending.insert(key.clone());

        tracing::info!(%key, %view_id, %template, "entity created, registration broadcast");
        Ok(SpawnDecision::Created(view_id))
    }

    /// Apply a registration broadcast, binding `key` to `view_id`
    ///
    /// Called for every peer including the creator; this - not the create
    /// call - is what makes the entity known. A re-delivered registration
    /// for an already-bound key overwrites silently (last write wins, and
    /// the relay's ordering makes re-delivery idempotent in practice).
    pub fn apply_registration(&mut self, key: EntityKey, view_id: ViewId) {
        self.pending.remove(&key);
        self.bindings.insert(key, view_id);
    }

    /// Losing local tracking of a trigger never deletes the binding - other
    /// peers may still be viewing the entity
    pub fn on_trigger_lost(&self, key: &EntityKey) {
        tracing::debug!(%key, bound = self.contains(key), "trigger lost, binding retained");
    }
}
