//! Anchor-relative frame conversion

use tether_core::{NetworkTransform, Transform};

/// Per-peer mapping between the local spatial frame and the network frame
///
/// Conversions are pure reads, so replication and rendering may call them
/// independently from read-only paths. With no anchor set both directions
/// are the identity: that is the degraded state of an AR peer before its
/// first marker detection, not an error.
#[derive(Debug, Default)]
pub struct CoordinateFrame {
    anchor: Option<Transform>,
}

impl CoordinateFrame {
    /// Create an unanchored frame (AR peers before first detection)
    pub fn new() -> Self {
        CoordinateFrame::default()
    }

    /// Create a frame anchored at the world origin (VR peers)
    pub fn world_origin() -> Self {
        CoordinateFrame {
            anchor: Some(Transform::IDENTITY),
        }
    }

    /// Replace the active anchor
    ///
    /// In-flight interpolations are not retro-adjusted; subsequent
    /// conversions simply use the new anchor.
    pub fn set_anchor(&mut self, anchor: Transform) {
        tracing::debug!(?anchor.position, "anchor set");
        self.anchor = Some(anchor);
    }

    /// Drop the anchor, falling back to identity conversion
    pub fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// The active anchor, if any
    pub fn anchor(&self) -> Option<&Transform> {
        self.anchor.as_ref()
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    /// Convert a local-frame pose to the network frame
    pub fn to_network(&self, local: &Transform) -> Transform {
        match &self.anchor {
            Some(anchor) => Transform::new(
                anchor.inverse_transform_point(local.position),
                anchor.rotation.inverse() * local.rotation,
            ),
            None => *local,
        }
    }

    /// Convert a network-frame pose to the local frame
    pub fn to_local(&self, network: &Transform) -> Transform {
        match &self.anchor {
            Some(anchor) => Transform::new(
                anchor.transform_point(network.position),
                anchor.rotation * network.rotation,
            ),
            None => *network,
        }
    }

    /// Convert a local entity transform to the network frame; scale passes
    /// through untouched
    pub fn transform_to_network(&self, local: &NetworkTransform) -> NetworkTransform {
        let pose = self.to_network(&local.pose());
        NetworkTransform::new(pose.position, pose.rotation, local.scale)
    }

    /// Convert a network entity transform to the local frame; scale passes
    /// through untouched
    pub fn transform_to_local(&self, network: &NetworkTransform) -> NetworkTransform {
        let pose = self.to_local(&network.pose());
        NetworkTransform::new(pose.position, pose.rotation, network.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tether_core::{Quat, Vec3};

    const EPS: f32 = 1e-3;

    #[test]
    fn test_unanchored_conversion_is_identity() {
        let frame = CoordinateFrame::new();
        let t = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_euler(0.5, 0.0, 0.0));

        assert!(frame.to_network(&t).approx_eq(&t, EPS));
        assert!(frame.to_local(&t).approx_eq(&t, EPS));
    }

    #[test]
    fn test_world_origin_anchor_is_identity() {
        let frame = CoordinateFrame::world_origin();
        let t = Transform::new(Vec3::new(-2.0, 0.0, 4.5), Quat::from_euler(0.0, 0.3, 0.0));

        assert!(frame.to_network(&t).approx_eq(&t, EPS));
    }

    #[test]
    fn test_anchor_replacement_changes_conversion() {
        let mut frame = CoordinateFrame::new();
        frame.set_anchor(Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
        let t = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        assert!(frame.to_network(&t).position.approx_eq(&Vec3::ZERO, EPS));

        frame.set_anchor(Transform::from_position(Vec3::new(0.0, 5.0, 0.0)));
        assert!(frame
            .to_network(&t)
            .position
            .approx_eq(&Vec3::new(1.0, -5.0, 0.0), EPS));
    }

    #[test]
    fn test_scale_passes_through() {
        let mut frame = CoordinateFrame::new();
        frame.set_anchor(Transform::new(
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_euler(1.0, 0.0, 0.0),
        ));

        let local = NetworkTransform::new(Vec3::new(2.0, 2.0, 2.0), Quat::IDENTITY, Vec3::splat(1.5));
        let network = frame.transform_to_network(&local);
        assert!(network.scale.approx_eq(&Vec3::splat(1.5), EPS));
    }

    fn arb_quat() -> impl Strategy<Value = Quat> {
        (
            -std::f32::consts::PI..std::f32::consts::PI,
            -1.4f32..1.4,
            -std::f32::consts::PI..std::f32::consts::PI,
        )
            .prop_map(|(yaw, pitch, roll)| Quat::from_euler(yaw, pitch, roll))
    }

    fn arb_vec3() -> impl Strategy<Value = Vec3> {
        (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        /// For any fixed anchor A and pose T: to_local(to_network(T)) == T
        #[test]
        fn prop_frame_roundtrip(
            anchor_pos in arb_vec3(),
            anchor_rot in arb_quat(),
            pos in arb_vec3(),
            rot in arb_quat(),
        ) {
            let mut frame = CoordinateFrame::new();
            frame.set_anchor(Transform::new(anchor_pos, anchor_rot));

            let t = Transform::new(pos, rot);
            let back = frame.to_local(&frame.to_network(&t));

            prop_assert!(back.rotation.approx_eq(&t.rotation, 1e-3));
            // Position tolerance scales with magnitude
            prop_assert!(back.position.distance(&t.position) < 1e-2);
        }

        /// With no anchor both conversions are exactly the identity
        #[test]
        fn prop_degraded_identity(pos in arb_vec3(), rot in arb_quat()) {
            let frame = CoordinateFrame::new();
            let t = Transform::new(pos, rot);

            prop_assert_eq!(frame.to_network(&t), t);
            prop_assert_eq!(frame.to_local(&t), t);
        }
    }
}
