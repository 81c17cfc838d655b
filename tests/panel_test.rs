use avatar_viewer::{
    camera::Camera,
    config::ViewerConfig,
    viewer::{panel::ControlPanel, state::EffectFlags},
};

use crate::common::test_utils::avatar_graph;

mod common;

#[test]
fn binds_one_material_folder_per_drawable() {
    let fixture = avatar_graph();
    let panel = ControlPanel::bind(&fixture.graph);
    let names = panel
        .meshes()
        .iter()
        .map(|(_, name)| name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names.len(), 11);
    assert!(names.contains(&"EyeLeft"));
    assert!(names.contains(&"Wolf3D_Glasses"));
    assert!(!names.contains(&"RightHand"));
}

#[test]
fn idle_frame_produces_no_actions_and_keeps_values() {
    let mut fixture = avatar_graph();
    let panel = ControlPanel::bind(&fixture.graph);
    let config = ViewerConfig::default();
    let mut camera = Camera::new(config.camera_position);
    let mut ambient = config.ambient;
    let mut directional = config.directional;
    let effects = EffectFlags::default();

    let ctx = egui::Context::default();
    let mut actions = Vec::new();
    for _ in 0..2 {
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = panel.show(
                ctx,
                &mut fixture.graph,
                &mut camera,
                &mut ambient,
                &mut directional,
                &effects,
            );
        });
    }

    assert!(actions.is_empty());
    assert_eq!(camera.position, config.camera_position);
    assert_eq!(ambient, config.ambient);
    assert_eq!(directional, config.directional);
}
