//! TETHER Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout TETHER:
//! - Identifiers (PeerId, ViewId, EntityKey)
//! - Spatial math (Vec3, Quat)
//! - Transforms (Transform, NetworkTransform)
//! - Peer events and status events
//! - Errors

pub mod error;
pub mod event;
pub mod id;
pub mod math;
pub mod transform;

pub use error::*;
pub use event::*;
pub use id::*;
pub use math::*;
pub use transform::*;
