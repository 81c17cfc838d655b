//! Camera fit after load and the per-frame auto-rotation.

use cgmath::{EuclideanSpace, Euler, Point3, Rad, Vector3};
use log::{debug, warn};

use crate::{
    camera::{Camera, OrbitController, Projection},
    data_structures::scene_graph::SceneGraph,
    viewer::state::EffectFlags,
};

/// Extra room around the model when fitting the camera.
pub const FIT_MARGIN: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult {
    /// Centre of the model bounds before recentering.
    pub center: Point3<f32>,
    pub size: Vector3<f32>,
    /// Camera z after the fit, margin included.
    pub distance: f32,
}

/// Move the model so its bounds are centred on the origin, then back the
/// camera off along z until the largest extent fits the vertical field of
/// view. The orbit target is reset to the origin. Returns `None` when the
/// graph has no geometry.
pub fn center_model(
    graph: &mut SceneGraph,
    camera: &mut Camera,
    projection: &Projection,
    controller: &mut OrbitController,
) -> Option<FitResult> {
    graph.update_world_transforms();
    let Some(bounds) = graph.bounding_box() else {
        warn!("Nothing to frame: the model has no geometry");
        return None;
    };
    let center = bounds.center();
    let size = bounds.size();

    let root = graph.root();
    if let Some(node) = graph.get_mut(root) {
        node.transform.position -= center.to_vec();
    }
    graph.update_world_transforms();

    let max_dim = size.x.max(size.y).max(size.z);
    let fit = (max_dim / 2.0 / (projection.fovy.0 / 2.0).tan()).abs();
    let distance = fit * FIT_MARGIN;
    camera.position.z = distance;

    controller.target = Point3::origin();
    controller.update(camera);

    debug!(
        "Centered model (center {:?}, size {:?}), camera z {}",
        center, size, distance
    );
    Some(FitResult {
        center,
        size,
        distance,
    })
}

/// Spin the model around the vertical axis by the configured step.
pub fn auto_rotate(graph: &mut SceneGraph, effects: &EffectFlags) {
    if !effects.is_rotating {
        return;
    }
    let root = graph.root();
    if let Some(node) = graph.get_mut(root) {
        let euler = node.transform.euler();
        node.transform.set_euler(Euler {
            y: euler.y + Rad(effects.rotation_speed),
            ..euler
        });
    }
}
