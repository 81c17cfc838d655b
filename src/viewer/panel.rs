//! The control panel: one egui window with a folder per concern.
//!
//! Plain properties (light intensities, camera position, model rotation and
//! material flags) are edited in place. Everything that drives an effect is
//! returned as a [`PanelAction`] for [`ViewerState::apply`](super::state::ViewerState::apply).

use std::f32::consts::TAU;

use cgmath::{Euler, Rad};

use crate::{
    camera::Camera,
    config::{Light, WALK_CLIP},
    data_structures::scene_graph::{NodeId, SceneGraph},
    viewer::{
        animation::{HOVER, IDLE, WAVE, WOBBLE},
        state::EffectFlags,
    },
};

#[derive(Clone, Debug, PartialEq)]
pub enum PanelAction {
    PlayAnimation(String),
    ColorPulse,
    /// Stop the current action and the colour pulse.
    StopAll,
    SetAutoRotate(bool),
    SetRotationSpeed(f32),
}

const ANIMATION_BUTTONS: [(&str, &str); 5] = [
    ("Idle (Breathe)", IDLE),
    ("Hover", HOVER),
    ("Wobble", WOBBLE),
    ("Walk", WALK_CLIP),
    ("Wave", WAVE),
];

#[derive(Clone, Debug, Default)]
pub struct ControlPanel {
    /// Drawable nodes that get a material folder, in traversal order.
    meshes: Vec<(NodeId, String)>,
}

impl ControlPanel {
    pub fn bind(graph: &SceneGraph) -> Self {
        let meshes = graph
            .drawables()
            .into_iter()
            .filter_map(|id| graph.get(id).map(|node| (id, node.name.clone())))
            .collect();
        Self { meshes }
    }

    pub fn meshes(&self) -> &[(NodeId, String)] {
        &self.meshes
    }

    pub fn show(
        &self,
        ctx: &egui::Context,
        graph: &mut SceneGraph,
        camera: &mut Camera,
        ambient: &mut Light,
        directional: &mut Light,
        effects: &EffectFlags,
    ) -> Vec<PanelAction> {
        let mut actions = Vec::new();
        egui::Window::new("Controls")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .vscroll(true)
            .show(ctx, |ui| {
                ui.collapsing("Lighting", |ui| {
                    ui.add(egui::Slider::new(&mut ambient.intensity, 0.0..=2.0).text("Ambient Light"));
                    ui.add(
                        egui::Slider::new(&mut directional.intensity, 0.0..=2.0)
                            .text("Directional Light"),
                    );
                });

                ui.collapsing("Camera", |ui| {
                    ui.add(egui::Slider::new(&mut camera.position.x, -20.0..=20.0).text("x"));
                    ui.add(egui::Slider::new(&mut camera.position.y, -20.0..=20.0).text("y"));
                    ui.add(egui::Slider::new(&mut camera.position.z, -20.0..=20.0).text("z"));
                });

                self.model_rotation(ui, graph);
                self.materials(ui, graph);

                ui.collapsing("Animations", |ui| {
                    for (label, clip) in ANIMATION_BUTTONS {
                        if ui.button(label).clicked() {
                            actions.push(PanelAction::PlayAnimation(clip.to_string()));
                        }
                    }
                    if ui.button("Color Pulse").clicked() {
                        actions.push(PanelAction::ColorPulse);
                    }
                    if ui.button("Stop All Animations").clicked() {
                        actions.push(PanelAction::StopAll);
                    }
                });

                ui.collapsing("Auto Rotation", |ui| {
                    let mut rotating = effects.is_rotating;
                    if ui.checkbox(&mut rotating, "Auto Rotate").changed() {
                        actions.push(PanelAction::SetAutoRotate(rotating));
                    }
                    let mut speed = effects.rotation_speed;
                    if ui
                        .add(egui::Slider::new(&mut speed, 0.0..=0.05).text("Rotation Speed"))
                        .changed()
                    {
                        actions.push(PanelAction::SetRotationSpeed(speed));
                    }
                });
            });
        actions
    }

    fn model_rotation(&self, ui: &mut egui::Ui, graph: &mut SceneGraph) {
        let root = graph.root();
        let Some(node) = graph.get_mut(root) else {
            return;
        };
        ui.collapsing("Model Rotation", |ui| {
            let Euler {
                x: Rad(mut x),
                y: Rad(mut y),
                z: Rad(mut z),
            } = node.transform.euler();
            let mut changed = false;
            changed |= ui.add(egui::Slider::new(&mut x, 0.0..=TAU).text("x")).changed();
            changed |= ui.add(egui::Slider::new(&mut y, 0.0..=TAU).text("y")).changed();
            changed |= ui.add(egui::Slider::new(&mut z, 0.0..=TAU).text("z")).changed();
            if changed {
                node.transform.set_euler(Euler::new(Rad(x), Rad(y), Rad(z)));
            }
        });
    }

    fn materials(&self, ui: &mut egui::Ui, graph: &mut SceneGraph) {
        ui.collapsing("Materials", |ui| {
            for (id, name) in &self.meshes {
                let Some(drawable) = graph.drawable_mut(*id) else {
                    continue;
                };
                let material = &mut drawable.material;
                egui::CollapsingHeader::new(name.as_str())
                    .id_salt(id.0)
                    .show(ui, |ui| {
                        ui.checkbox(&mut material.wireframe, "wireframe");
                        ui.checkbox(&mut material.visible, "visible");
                        ui.add(egui::Slider::new(&mut material.roughness, 0.0..=1.0).text("roughness"));
                        ui.add(egui::Slider::new(&mut material.metalness, 0.0..=1.0).text("metalness"));
                    });
            }
        });
    }
}
