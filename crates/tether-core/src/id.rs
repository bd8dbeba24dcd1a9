//! Identity types for TETHER
//!
//! Peer and view identifiers are numeric and relay-assigned; entity keys
//! carry the trigger identity (a tracked-marker id or an application-assigned
//! name) and so stay textual.

use std::fmt;

/// Peer identity - assigned by the relay when joining a session
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl PeerId {
    pub const ZERO: PeerId = PeerId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        PeerId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        PeerId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Peer({:016x})", self.0)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// View identity - transport-global routing id for one shared entity
///
/// Allocated by the relay at entity creation; guaranteed unique across the
/// session even when several peers race their create calls.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ViewId(pub u32);

impl ViewId {
    pub const ZERO: ViewId = ViewId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        ViewId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        ViewId(u32::from_le_bytes(bytes))
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "View({})", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity key - stable identity of a shared entity
///
/// For marker-spawned entities this is the tracked-marker identity; for
/// explicitly spawned entities an application-assigned name.
#[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct EntityKey(pub String);

impl EntityKey {
    #[inline]
    pub fn new(key: impl Into<String>) -> Self {
        EntityKey(key.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityKey {
    fn from(s: &str) -> Self {
        EntityKey(s.to_owned())
    }
}

impl From<String> for EntityKey {
    fn from(s: String) -> Self {
        EntityKey(s)
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
