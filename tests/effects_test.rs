use avatar_viewer::{
    camera::{Camera, OrbitController, Projection},
    cgmath::{Deg, EuclideanSpace, Point3},
    data_structures::{model::Color, scene_graph::SceneGraph},
    viewer::{
        animation::{AnimationDriver, IDLE},
        color_pulse::{self, pulse_color},
        framing::{FIT_MARGIN, auto_rotate, center_model},
        panel::PanelAction,
        state::{DEFAULT_ROTATION_SPEED, EffectFlags, ViewerState},
    },
};

use crate::common::test_utils::{assert_close, avatar_graph, box_graph};

mod common;

fn colors(graph: &SceneGraph) -> Vec<u32> {
    graph
        .drawables()
        .into_iter()
        .map(|id| graph.drawable(id).unwrap().material.color.to_hex())
        .collect()
}

fn yaw(graph: &SceneGraph) -> f32 {
    graph.get(graph.root()).unwrap().transform.euler().y.0
}

#[test]
fn pulse_hue_wraps_every_six_seconds() {
    let start = pulse_color(0.0);
    assert_eq!(start, Color::from_hsl(0.0, 0.5, 0.5));
    assert_eq!(pulse_color(6000.0), start);
    assert_eq!(pulse_color(6_001_500.0), Color::from_hsl(0.25, 0.5, 0.5));
    assert_eq!(pulse_color(3000.0).to_hex(), Color::from_hsl(0.5, 0.5, 0.5).to_hex());
}

#[test]
fn pulse_paints_every_drawable_the_same_colour() {
    let mut fixture = avatar_graph();
    color_pulse::apply(&mut fixture.graph, 1234.0);
    let expected = pulse_color(1234.0).to_hex();
    assert!(colors(&fixture.graph).iter().all(|&c| c == expected));
}

#[test]
fn stopping_the_pulse_returns_to_white() {
    let mut fixture = avatar_graph();
    let mut state = ViewerState::default();

    state.apply(PanelAction::ColorPulse, &mut fixture.graph);
    assert!(state.effects.is_color_pulsing);
    state.tick(&mut fixture.graph, 0.016, 4321.0);
    assert!(colors(&fixture.graph).iter().all(|&c| c != 0xffffff));

    state.apply(PanelAction::StopAll, &mut fixture.graph);
    assert!(!state.effects.is_color_pulsing);
    assert!(colors(&fixture.graph).iter().all(|&c| c == 0xffffff));
}

#[test]
fn center_model_frames_the_bounds() {
    let mut graph = box_graph([-2.0, 0.0, -1.0], [2.0, 4.0, 1.0]);
    let mut camera = Camera::new(Point3::new(0.0, 1.0, 5.0));
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    let mut controller = OrbitController::new(0.05);
    controller.target = Point3::new(3.0, 3.0, 3.0);

    let fit = center_model(&mut graph, &mut camera, &projection, &mut controller).unwrap();

    let expected = FIT_MARGIN * (4.0 / 2.0) / (projection.fovy.0 / 2.0).tan();
    assert_close(fit.center.y, 2.0);
    assert_close(fit.size.x, 4.0);
    assert_close(fit.distance, expected);
    assert_close(camera.position.z, expected);
    assert_eq!(controller.target, Point3::origin());
    assert_eq!(camera.target, Point3::origin());

    let center = graph.bounding_box().unwrap().center();
    assert_close(center.x, 0.0);
    assert_close(center.y, 0.0);
    assert_close(center.z, 0.0);
}

#[test]
fn center_model_without_geometry_does_nothing() {
    let mut graph = SceneGraph::new();
    let mut camera = Camera::new(Point3::new(0.0, 1.0, 5.0));
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    let mut controller = OrbitController::new(0.05);

    assert!(center_model(&mut graph, &mut camera, &projection, &mut controller).is_none());
    assert_eq!(camera.position, Point3::new(0.0, 1.0, 5.0));
}

#[test]
fn auto_rotation_accumulates_yaw_per_frame() {
    let mut graph = box_graph([-1.0, 0.0, -1.0], [1.0, 2.0, 1.0]);
    let mut effects = EffectFlags {
        rotation_speed: 0.01,
        ..Default::default()
    };

    auto_rotate(&mut graph, &effects);
    assert_eq!(yaw(&graph), 0.0);

    effects.is_rotating = true;
    for _ in 0..100 {
        auto_rotate(&mut graph, &effects);
    }
    assert_close(yaw(&graph), 1.0);
}

#[test]
fn tick_rotation_ignores_frame_time() {
    let mut graph = box_graph([-1.0, 0.0, -1.0], [1.0, 2.0, 1.0]);
    let effects = EffectFlags {
        is_rotating: true,
        is_color_pulsing: false,
        rotation_speed: 0.01,
    };
    let mut state = ViewerState::new(effects, AnimationDriver::new(&graph, Vec::new()));

    for frame in 0..100 {
        let dt = [0.001, 0.016, 0.1, 0.5][frame % 4];
        state.tick(&mut graph, dt, frame as f64 * 16.0);
    }
    assert_close(yaw(&graph), 1.0);
}

#[test]
fn panel_actions_drive_the_state() {
    let mut fixture = avatar_graph();
    let graph = &mut fixture.graph;
    let mut state = ViewerState::new(EffectFlags::default(), AnimationDriver::new(graph, Vec::new()));
    assert_eq!(state.effects.rotation_speed, DEFAULT_ROTATION_SPEED);

    state.apply(PanelAction::SetAutoRotate(true), graph);
    state.apply(PanelAction::SetRotationSpeed(0.02), graph);
    state.apply(PanelAction::PlayAnimation(IDLE.to_string()), graph);
    assert!(state.effects.is_rotating);
    assert_eq!(state.effects.rotation_speed, 0.02);
    assert_eq!(state.driver.current(), Some(IDLE));

    state.tick(graph, 1.0, 0.0);
    assert_close(yaw(graph), 0.02);
    assert_close(graph.get(graph.root()).unwrap().transform.scale.x, 1.02);

    state.apply(PanelAction::StopAll, graph);
    assert_eq!(state.driver.current(), None);
    assert_close(graph.get(graph.root()).unwrap().transform.scale.x, 1.0);
}
