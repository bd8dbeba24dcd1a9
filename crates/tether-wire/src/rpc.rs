//! RPC vocabulary and encoding
//!
//! Two RPCs cross the relay: the buffered registration broadcast that binds
//! an entity key to its view, and the named-state broadcast for lightweight
//! entity state (a string key/value pair).

use bytes::{Buf, BufMut};
use tether_core::{
    EntityKey, NetworkTransform, PeerId, TetherError, TetherResult, ViewId,
};

use crate::{get_network_transform, get_string, put_network_transform, put_string};

/// Delivery target for an RPC
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RpcTarget {
    /// Every peer currently in the session, sender included
    All = 0x01,
    /// Every peer except the sender
    Others = 0x02,
    /// Every current peer, and replayed in order to late joiners
    AllBuffered = 0x03,
}

impl RpcTarget {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(RpcTarget::All),
            0x02 => Some(RpcTarget::Others),
            0x03 => Some(RpcTarget::AllBuffered),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Buffered targets are replayed to peers that join after the send
    pub fn is_buffered(self) -> bool {
        matches!(self, RpcTarget::AllBuffered)
    }
}

/// An RPC payload
#[derive(Clone, Debug, PartialEq)]
pub enum Rpc {
    /// Bind `key` to the entity behind `view_id`, cluster-wide
    Register {
        key: EntityKey,
        view_id: ViewId,
        owner: PeerId,
        template: String,
        spawn: NetworkTransform,
    },
    /// Named-state change for an entity (e.g. a color name)
    SyncState {
        view_id: ViewId,
        name: String,
        value: String,
    },
}

const TAG_REGISTER: u8 = 0x01;
const TAG_SYNC_STATE: u8 = 0x02;

impl Rpc {
    /// Encode for relay delivery
    pub fn encode(&self) -> TetherResult<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Rpc::Register {
                key,
                view_id,
                owner,
                template,
                spawn,
            } => {
                buf.put_u8(TAG_REGISTER);
                put_string(&mut buf, key.as_str())?;
                buf.put_u32_le(view_id.0);
                buf.put_u64_le(owner.0);
                put_string(&mut buf, template)?;
                put_network_transform(&mut buf, spawn);
            }
            Rpc::SyncState {
                view_id,
                name,
                value,
            } => {
                buf.put_u8(TAG_SYNC_STATE);
                buf.put_u32_le(view_id.0);
                put_string(&mut buf, name)?;
                put_string(&mut buf, value)?;
            }
        }
        Ok(buf)
    }

    /// Decode a relay-delivered RPC
    pub fn decode(mut buf: &[u8]) -> TetherResult<Self> {
        if buf.is_empty() {
            return Err(TetherError::BufferTooShort {
                expected: 1,
                actual: 0,
            });
        }
        let tag = buf.get_u8();
        match tag {
            TAG_REGISTER => {
                let key = EntityKey::new(get_string(&mut buf)?);
                if buf.remaining() < 12 {
                    return Err(TetherError::BufferTooShort {
                        expected: 12,
                        actual: buf.remaining(),
                    });
                }
                let view_id = ViewId::new(buf.get_u32_le());
                let owner = PeerId::new(buf.get_u64_le());
                let template = get_string(&mut buf)?;
                let spawn = get_network_transform(&mut buf)?;
                Ok(Rpc::Register {
                    key,
                    view_id,
                    owner,
                    template,
                    spawn,
                })
            }
            TAG_SYNC_STATE => {
                if buf.remaining() < 4 {
                    return Err(TetherError::BufferTooShort {
                        expected: 4,
                        actual: buf.remaining(),
                    });
                }
                let view_id = ViewId::new(buf.get_u32_le());
                let name = get_string(&mut buf)?;
                let value = get_string(&mut buf)?;
                Ok(Rpc::SyncState {
                    view_id,
                    name,
                    value,
                })
            }
            other => Err(TetherError::UnknownRpcTag(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{Quat, Vec3};

    #[test]
    fn test_rpc_target_roundtrip() {
        for target in [RpcTarget::All, RpcTarget::Others, RpcTarget::AllBuffered] {
            assert_eq!(RpcTarget::from_byte(target.to_byte()), Some(target));
        }
        assert_eq!(RpcTarget::from_byte(0x7F), None);
    }

    #[test]
    fn test_register_roundtrip() {
        let rpc = Rpc::Register {
            key: EntityKey::from("marker-0042"),
            view_id: ViewId::new(7),
            owner: PeerId::new(1),
            template: "shared_dog".into(),
            spawn: NetworkTransform::new(
                Vec3::new(0.0, 0.0, 2.0),
                Quat::from_euler(0.5, 0.0, 0.0),
                Vec3::ONE,
            ),
        };

        let encoded = rpc.encode().unwrap();
        let decoded = Rpc::decode(&encoded).unwrap();
        match (rpc, decoded) {
            (
                Rpc::Register {
                    key: k1,
                    view_id: v1,
                    owner: o1,
                    template: t1,
                    spawn: s1,
                },
                Rpc::Register {
                    key: k2,
                    view_id: v2,
                    owner: o2,
                    template: t2,
                    spawn: s2,
                },
            ) => {
                assert_eq!(k1, k2);
                assert_eq!(v1, v2);
                assert_eq!(o1, o2);
                assert_eq!(t1, t2);
                assert!(s1.approx_eq(&s2, 1e-6));
            }
            _ => panic!("decoded to a different variant"),
        }
    }

    #[test]
    fn test_sync_state_roundtrip() {
        let rpc = Rpc::SyncState {
            view_id: ViewId::new(9),
            name: "color".into(),
            value: "red".into(),
        };

        let encoded = rpc.encode().unwrap();
        assert_eq!(Rpc::decode(&encoded).unwrap(), rpc);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(matches!(
            Rpc::decode(&[0x5A, 0, 0]),
            Err(TetherError::UnknownRpcTag(0x5A))
        ));
    }

    #[test]
    fn test_truncated_register_rejected() {
        let rpc = Rpc::Register {
            key: EntityKey::from("m"),
            view_id: ViewId::new(1),
            owner: PeerId::new(2),
            template: "t".into(),
            spawn: NetworkTransform::IDENTITY,
        };
        let encoded = rpc.encode().unwrap();
        for cut in [1usize, 4, 8, encoded.len() - 1] {
            assert!(Rpc::decode(&encoded[..cut]).is_err());
        }
    }
}
