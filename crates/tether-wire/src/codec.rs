//! Primitive codecs for spatial types and directory deltas

use bytes::{Buf, BufMut};
use tether_core::{
    DirectoryDelta, NetworkTransform, Quat, TetherError, TetherResult, Transform, Vec3,
};

/// Maximum length of an encoded string (keys, template names, state values)
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Encoded size of a `NetworkTransform` (10 f32 fields)
pub const NETWORK_TRANSFORM_SIZE: usize = 40;

fn ensure(buf: &impl Buf, needed: usize) -> TetherResult<()> {
    if buf.remaining() < needed {
        return Err(TetherError::BufferTooShort {
            expected: needed,
            actual: buf.remaining(),
        });
    }
    Ok(())
}

pub fn put_string(buf: &mut impl BufMut, s: &str) -> TetherResult<()> {
    if s.len() > MAX_STRING_LEN {
        return Err(TetherError::InvalidWireFormat(format!(
            "string too long: {} bytes",
            s.len()
        )));
    }
    buf.put_u16_le(s.len() as u16);
    buf.put_slice(s.as_bytes());
    Ok(())
}

pub fn get_string(buf: &mut impl Buf) -> TetherResult<String> {
    ensure(buf, 2)?;
    let len = buf.get_u16_le() as usize;
    ensure(buf, len)?;
    let mut raw = vec![0u8; len];
    buf.copy_to_slice(&mut raw);
    String::from_utf8(raw).map_err(|e| TetherError::InvalidWireFormat(e.to_string()))
}

pub fn put_vec3(buf: &mut impl BufMut, v: &Vec3) {
    buf.put_f32_le(v.x);
    buf.put_f32_le(v.y);
    buf.put_f32_le(v.z);
}

pub fn get_vec3(buf: &mut impl Buf) -> TetherResult<Vec3> {
    ensure(buf, 12)?;
    Ok(Vec3::new(
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
    ))
}

pub fn put_quat(buf: &mut impl BufMut, q: &Quat) {
    buf.put_f32_le(q.w);
    buf.put_f32_le(q.x);
    buf.put_f32_le(q.y);
    buf.put_f32_le(q.z);
}

pub fn get_quat(buf: &mut impl Buf) -> TetherResult<Quat> {
    ensure(buf, 16)?;
    Ok(Quat::new(
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
    ))
}

pub fn put_transform(buf: &mut impl BufMut, t: &Transform) {
    put_vec3(buf, &t.position);
    put_quat(buf, &t.rotation);
}

pub fn get_transform(buf: &mut impl Buf) -> TetherResult<Transform> {
    let position = get_vec3(buf)?;
    let rotation = get_quat(buf)?;
    Ok(Transform::new(position, rotation))
}

pub fn put_network_transform(buf: &mut impl BufMut, t: &NetworkTransform) {
    put_vec3(buf, &t.position);
    put_quat(buf, &t.rotation);
    put_vec3(buf, &t.scale);
}

pub fn get_network_transform(buf: &mut impl Buf) -> TetherResult<NetworkTransform> {
    let position = get_vec3(buf)?;
    let rotation = get_quat(buf)?;
    let scale = get_vec3(buf)?;
    Ok(NetworkTransform::new(position, rotation, scale))
}

/// Encode a replication payload (one entity transform per tick)
pub fn encode_state(t: &NetworkTransform) -> Vec<u8> {
    let mut buf = Vec::with_capacity(NETWORK_TRANSFORM_SIZE);
    put_network_transform(&mut buf, t);
    buf
}

/// Decode a replication payload
pub fn decode_state(mut buf: &[u8]) -> TetherResult<NetworkTransform> {
    get_network_transform(&mut buf)
}

pub fn put_directory_delta(buf: &mut impl BufMut, delta: &DirectoryDelta) -> TetherResult<()> {
    put_string(buf, &delta.name)?;
    buf.put_u8(delta.max_players);
    buf.put_u8(delta.player_count);
    let mut flags = 0u8;
    if delta.is_open {
        flags |= 0x01;
    }
    if delta.is_visible {
        flags |= 0x02;
    }
    if delta.removed {
        flags |= 0x04;
    }
    buf.put_u8(flags);
    Ok(())
}

pub fn get_directory_delta(buf: &mut impl Buf) -> TetherResult<DirectoryDelta> {
    let name = get_string(buf)?;
    ensure(buf, 3)?;
    let max_players = buf.get_u8();
    let player_count = buf.get_u8();
    let flags = buf.get_u8();
    Ok(DirectoryDelta {
        name,
        max_players,
        player_count,
        is_open: flags & 0x01 != 0,
        is_visible: flags & 0x02 != 0,
        removed: flags & 0x04 != 0,
    })
}

/// Encode one batch of directory deltas
pub fn encode_directory_batch(deltas: &[DirectoryDelta]) -> TetherResult<Vec<u8>> {
    if deltas.len() > u16::MAX as usize {
        return Err(TetherError::InvalidWireFormat(format!(
            "batch too large: {} deltas",
            deltas.len()
        )));
    }
    let mut buf = Vec::new();
    buf.put_u16_le(deltas.len() as u16);
    for delta in deltas {
        put_directory_delta(&mut buf, delta)?;
    }
    Ok(buf)
}

/// Decode one batch of directory deltas
pub fn decode_directory_batch(mut buf: &[u8]) -> TetherResult<Vec<DirectoryDelta>> {
    ensure(&buf, 2)?;
    let count = buf.get_u16_le() as usize;
    let mut deltas = Vec::with_capacity(count.min(256));
    for _ in 0..count {
        deltas.push(get_directory_delta(&mut buf)?);
    }
    Ok(deltas)
}
