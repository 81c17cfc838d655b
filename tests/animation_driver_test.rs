use std::f32::consts::FRAC_PI_4;

use avatar_viewer::{
    cgmath::Vector3,
    data_structures::scene_graph::SceneGraph,
    resources::animation::{AnimationClip, KeyframeTrack, Keyframes},
    viewer::animation::{AnimationDriver, HOVER, IDLE, WAVE, WOBBLE, find_wave_target},
};

use crate::common::test_utils::{assert_close, avatar_graph, box_graph};

mod common;

fn root_scale(graph: &SceneGraph) -> Vector3<f32> {
    graph.get(graph.root()).unwrap().transform.scale
}

#[test]
fn builds_synthetic_clips_and_finds_the_right_hand() {
    let fixture = avatar_graph();
    assert_eq!(find_wave_target(&fixture.graph), Some(fixture.right_hand));

    let driver = AnimationDriver::new(&fixture.graph, Vec::new());
    for name in [IDLE, HOVER, WOBBLE, WAVE] {
        assert!(driver.has(name), "{name} missing");
        assert_close(driver.action(name).unwrap().clip().duration, 2.0);
    }
    assert_eq!(driver.current(), None);
}

#[test]
fn wave_is_absent_without_a_right_arm() {
    let mut graph = box_graph([-1.0, 0.0, -1.0], [1.0, 2.0, 1.0]);
    let mut driver = AnimationDriver::new(&graph, Vec::new());
    assert!(!driver.has(WAVE));

    assert!(!driver.play(&mut graph, WAVE));
    assert_eq!(driver.current(), None);
}

#[test]
fn unknown_name_stops_the_running_action() {
    let mut fixture = avatar_graph();
    let graph = &mut fixture.graph;
    let mut driver = AnimationDriver::new(graph, Vec::new());

    assert!(driver.play(graph, IDLE));
    assert_eq!(driver.current(), Some(IDLE));

    assert!(!driver.play(graph, "bogus"));
    assert_eq!(driver.current(), None);
    assert!(!driver.action(IDLE).unwrap().is_playing());
}

#[test]
fn stop_is_idempotent() {
    let mut fixture = avatar_graph();
    let graph = &mut fixture.graph;
    let mut driver = AnimationDriver::new(graph, Vec::new());

    driver.play(graph, HOVER);
    driver.stop(graph);
    assert_eq!(driver.current(), None);
    driver.stop(graph);
    assert_eq!(driver.current(), None);
}

#[test]
fn stopping_restores_the_rest_pose() {
    let mut fixture = avatar_graph();
    let graph = &mut fixture.graph;
    let mut driver = AnimationDriver::new(graph, Vec::new());

    driver.play(graph, IDLE);
    driver.update(graph, 1.0);
    assert_close(root_scale(graph).x, 1.02);

    driver.stop(graph);
    assert_close(root_scale(graph).x, 1.0);
    assert_eq!(driver.action(IDLE).unwrap().time(), 0.0);
}

#[test]
fn switching_actions_restores_the_previous_one() {
    let mut fixture = avatar_graph();
    let graph = &mut fixture.graph;
    let mut driver = AnimationDriver::new(graph, Vec::new());

    driver.play(graph, IDLE);
    driver.update(graph, 1.0);
    driver.play(graph, HOVER);
    assert_close(root_scale(graph).y, 1.0);

    driver.update(graph, 1.0);
    let root = graph.root();
    assert_close(graph.get(root).unwrap().transform.position.y, 0.1);
    assert_close(root_scale(graph).y, 1.0);
}

#[test]
fn actions_loop() {
    let mut fixture = avatar_graph();
    let graph = &mut fixture.graph;
    let mut driver = AnimationDriver::new(graph, Vec::new());

    driver.play(graph, HOVER);
    driver.update(graph, 2.5);
    let root = graph.root();
    assert_close(driver.action(HOVER).unwrap().time(), 0.5);
    assert_close(graph.get(root).unwrap().transform.position.y, 0.05);
}

#[test]
fn wave_swings_the_right_hand() {
    let mut fixture = avatar_graph();
    let hand = fixture.right_hand;
    let graph = &mut fixture.graph;
    let mut driver = AnimationDriver::new(graph, Vec::new());

    driver.play(graph, WAVE);
    driver.update(graph, 0.5);
    assert_close(graph.get(hand).unwrap().transform.euler().z.0, FRAC_PI_4);
    driver.update(graph, 1.0);
    assert_close(graph.get(hand).unwrap().transform.euler().z.0, -FRAC_PI_4);

    driver.stop(graph);
    assert_close(graph.get(hand).unwrap().transform.euler().z.0, 0.0);
}

#[test]
fn embedded_clips_replace_synthetic_ones() {
    let fixture = avatar_graph();
    let track = KeyframeTrack::new(
        fixture.armature,
        vec![0.0, 5.0],
        Keyframes::Translation(vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)]),
    );
    let embedded = vec![
        AnimationClip::new(IDLE, vec![track.clone()]),
        AnimationClip::new("rig|rig|walk|rig|walk", vec![track]),
    ];
    let driver = AnimationDriver::new(&fixture.graph, embedded);

    assert_close(driver.action(IDLE).unwrap().clip().duration, 5.0);
    assert!(driver.has("rig|rig|walk|rig|walk"));
    assert_eq!(driver.names().len(), 5);
}
