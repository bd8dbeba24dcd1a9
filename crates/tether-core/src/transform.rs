//! Transform types
//!
//! `Transform` is a rigid pose (position + rotation) in some frame.
//! `NetworkTransform` adds scale and is always expressed in the shared
//! network frame, so it is what replication carries.

use crate::{Quat, Vec3};

/// Rigid pose - position and rotation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[inline]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Transform { position, rotation }
    }

    #[inline]
    pub fn from_position(position: Vec3) -> Self {
        Transform {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Map a point from this transform's local space into its parent space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation.rotate(point)
    }

    /// Map a point from parent space into this transform's local space
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse().rotate(point - self.position)
    }

    pub fn approx_eq(&self, other: &Transform, epsilon: f32) -> bool {
        self.position.approx_eq(&other.position, epsilon)
            && self.rotation.approx_eq(&other.rotation, epsilon)
    }
}

/// Replicated entity transform, expressed in the network frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NetworkTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl NetworkTransform {
    pub const IDENTITY: NetworkTransform = NetworkTransform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        NetworkTransform {
            position,
            rotation,
            scale,
        }
    }

    #[inline]
    pub fn pose(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    pub fn approx_eq(&self, other: &NetworkTransform, epsilon: f32) -> bool {
        self.pose().approx_eq(&other.pose(), epsilon)
            && self.scale.approx_eq(&other.scale, epsilon)
    }
}
