//! Owner publishing and observer interpolation across frames

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tether_core::{EntityKey, PeerEvent, Quat, Transform, Vec3};
use tether_runtime::PeerConfig;
use tether_test::TestCluster;

const DT: Duration = Duration::from_millis(50);

fn spawn_marker(cluster: &mut TestCluster, key: &str) -> EntityKey {
    let key = EntityKey::from(key);
    cluster.peers[0].handle_event(PeerEvent::TriggerDetected {
        key: key.clone(),
        pose: Transform::from_position(Vec3::new(0.0, 0.0, 1.0)),
    });
    cluster.pump(2, DT);
    key
}

#[test]
fn observer_converges_monotonically_to_anchor_relative_target() {
    let mut cluster = TestCluster::new(vec![PeerConfig::default(), PeerConfig::default()]);
    let key = spawn_marker(&mut cluster, "m1");

    // The observer has its own anchor, unrelated to the owner's
    let observer_anchor = Transform::new(
        Vec3::new(5.0, 0.0, -1.0),
        Quat::from_euler(std::f32::consts::FRAC_PI_2, 0.0, 0.0),
    );
    cluster.peers[1].set_anchor(observer_anchor);

    cluster.peers[0].move_entity(&key, Vec3::new(1.0, 0.0, 0.0));
    cluster.pump(1, DT);

    let view = cluster.peers[0].entity(&key).unwrap();
    let mut last_distance = f32::MAX;
    for _ in 0..50 {
        cluster.pump(1, DT);

        let network = cluster.hub.last_state(view).unwrap();
        let target = cluster.peers[1]
            .frame()
            .transform_to_local(&network)
            .position;
        let rendered = cluster.peers[1]
            .replica_by_key(&key)
            .unwrap()
            .local_transform()
            .position;

        // Monotone approach, no overshoot past the anchor-relative target
        let d = rendered.distance(&target);
        assert!(d <= last_distance + 1e-4);
        last_distance = d;
    }
    assert!(last_distance < 1e-2);
}

#[test]
fn later_publish_overwrites_earlier_state() {
    let mut cluster = TestCluster::new(vec![PeerConfig::default(), PeerConfig::default()]);
    let key = spawn_marker(&mut cluster, "m1");
    let view = cluster.peers[0].entity(&key).unwrap();

    cluster.peers[0].move_entity(&key, Vec3::new(1.0, 0.0, 0.0));
    cluster.pump(1, DT);
    cluster.peers[0].move_entity(&key, Vec3::new(1.0, 0.0, 0.0));
    cluster.pump(2, DT);

    // Last write wins: the observer's stored network transform is the most
    // recent publish, with no sequence numbering involved
    let network = cluster.hub.last_state(view).unwrap();
    let stored = *cluster.peers[1]
        .replica_by_key(&key)
        .unwrap()
        .network_transform();
    assert!(stored.position.approx_eq(&network.position, 1e-4));
}

#[test]
fn mixed_ar_vr_peers_agree_in_the_network_frame() {
    // VR authority spawns at session start; the AR follower anchors on a
    // marker it finds later
    let mut cluster = TestCluster::new(vec![PeerConfig::vr(), PeerConfig::default()]);
    cluster.peers[0].start_session().unwrap();
    cluster.pump(2, DT);

    let key = EntityKey::from("shared-object");
    let view = cluster.peers[0].entity(&key).expect("vr spawn bound");
    assert_eq!(cluster.peers[1].entity(&key), Some(view));

    cluster.peers[1].set_anchor(Transform::from_position(Vec3::new(-4.0, 1.0, 2.0)));

    cluster.peers[0].move_entity(&key, Vec3::new(0.0, 0.5, 0.0));
    cluster.pump(60, DT);

    // Both peers report the same network-frame transform even though their
    // local frames are unrelated
    let t0 = cluster.peers[0].entity_transform(&key).unwrap();
    let t1 = cluster.peers[1].entity_transform(&key).unwrap();
    assert!(t0.position.approx_eq(&t1.position, 1e-2));
}

#[test]
fn random_walk_still_converges_after_owner_stops() {
    let mut cluster = TestCluster::new(vec![PeerConfig::default(), PeerConfig::default()]);
    let key = spawn_marker(&mut cluster, "m1");
    let view = cluster.peers[0].entity(&key).unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let delta = Vec3::new(
            rng.gen_range(-0.1..0.1),
            rng.gen_range(-0.1..0.1),
            rng.gen_range(-0.1..0.1),
        );
        cluster.peers[0].move_entity(&key, delta);
        cluster.pump(1, DT);
    }

    // Owner goes quiet; interpolation keeps running and settles
    cluster.pump(60, DT);

    let network = cluster.hub.last_state(view).unwrap();
    let target = cluster.peers[1]
        .frame()
        .transform_to_local(&network)
        .position;
    let rendered = cluster.peers[1]
        .replica_by_key(&key)
        .unwrap()
        .local_transform()
        .position;
    assert!(rendered.approx_eq(&target, 1e-2));
}

#[test]
fn scale_replicates_directly() {
    let mut cluster = TestCluster::new(vec![PeerConfig::default(), PeerConfig::default()]);
    let key = spawn_marker(&mut cluster, "m1");

    cluster.peers[0].scale_entity(&key, 2.0);
    cluster.pump(3, DT);

    let observed = cluster.peers[1]
        .replica_by_key(&key)
        .unwrap()
        .local_transform()
        .scale;
    assert!(observed.approx_eq(&Vec3::splat(2.0), 1e-4));
}
