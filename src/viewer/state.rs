//! Mutable viewer state shared by the panel and the frame loop.

use crate::{
    data_structures::scene_graph::SceneGraph,
    viewer::{
        animation::AnimationDriver,
        color_pulse,
        framing::auto_rotate,
        panel::PanelAction,
    },
};

pub const DEFAULT_ROTATION_SPEED: f32 = 0.005;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectFlags {
    pub is_rotating: bool,
    pub is_color_pulsing: bool,
    /// Radians added to the model yaw per frame while rotating.
    pub rotation_speed: f32,
}

impl Default for EffectFlags {
    fn default() -> Self {
        Self {
            is_rotating: false,
            is_color_pulsing: false,
            rotation_speed: DEFAULT_ROTATION_SPEED,
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewerState {
    pub effects: EffectFlags,
    pub driver: AnimationDriver,
}

impl ViewerState {
    pub fn new(effects: EffectFlags, driver: AnimationDriver) -> Self {
        Self { effects, driver }
    }

    /// One frame of scene mutation: advance the animation, spin, pulse, and
    /// refresh the world matrices. `dt` is in seconds.
    pub fn tick(&mut self, graph: &mut SceneGraph, dt: f32, now_ms: f64) {
        self.driver.update(graph, dt);
        auto_rotate(graph, &self.effects);
        if self.effects.is_color_pulsing {
            color_pulse::apply(graph, now_ms);
        }
        graph.update_world_transforms();
    }

    pub fn apply(&mut self, action: PanelAction, graph: &mut SceneGraph) {
        match action {
            PanelAction::PlayAnimation(name) => {
                self.driver.play(graph, &name);
            }
            PanelAction::ColorPulse => self.effects.is_color_pulsing = true,
            PanelAction::StopAll => {
                self.driver.stop(graph);
                self.effects.is_color_pulsing = false;
                color_pulse::reset_colors(graph);
            }
            PanelAction::SetAutoRotate(on) => self.effects.is_rotating = on,
            PanelAction::SetRotationSpeed(speed) => self.effects.rotation_speed = speed,
        }
    }
}
