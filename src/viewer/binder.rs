//! Attaches registry textures to the avatar's materials by mesh name.

use crate::{
    data_structures::scene_graph::SceneGraph,
    viewer::textures::{GLOSS_ROUGHNESS, TextureRegistry, surface_for_mesh},
};

/// Assign the registry layers of every drawable whose name is a known mesh.
/// The gloss layer becomes the roughness map with roughness fixed at
/// [`GLOSS_ROUGHNESS`]. Unknown names are left untouched. Returns the number of
/// materials changed.
pub fn apply_textures(graph: &mut SceneGraph, registry: &TextureRegistry) -> usize {
    let mut touched = 0;
    for id in graph.drawables() {
        let Some(node) = graph.get_mut(id) else {
            continue;
        };
        let Some(set) = surface_for_mesh(&node.name).and_then(|surface| registry.get(surface))
        else {
            continue;
        };
        let Some(drawable) = node.drawable.as_mut() else {
            continue;
        };
        let material = &mut drawable.material;
        if let Some(map) = &set.base_color {
            material.map = Some(map.clone());
        }
        if let Some(normal) = &set.normal {
            material.normal_map = Some(normal.clone());
        }
        if let Some(gloss) = &set.gloss {
            material.roughness_map = Some(gloss.clone());
            material.roughness = GLOSS_ROUGHNESS;
        }
        material.needs_update = true;
        touched += 1;
    }
    touched
}
