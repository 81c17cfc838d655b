//! avatar-viewer
//!
//! Renders a single animated glTF avatar in a window (native) or a canvas
//! (WASM) and exposes its lighting, materials, rotation and canned animations
//! through a floating egui panel. The crate is a thin orchestration layer: a
//! small wgpu engine loads and draws the scene graph, while the `viewer`
//! module wires textures, animations and panel widgets onto it.
//!
//! High-level modules
//! - `camera`: camera, projection, uniforms and the orbit controller
//! - `config`: viewer defaults and the hard-coded asset tables
//! - `context`: scene bootstrap; owns device/queue/surface, camera and lights
//! - `data_structures`: scene graph, meshes, materials, transforms, textures
//! - `flow`: the winit event loop and the per-frame render loop
//! - `gui`: egui integration (input, tessellation, painting)
//! - `pipelines`: the avatar render pipeline and light uniforms
//! - `render`: GPU preparation of the scene graph and frame submission
//! - `resources`: async loading of the glTF asset, images and animation clips
//! - `viewer`: texture registry/binder, animation driver, effects and panel
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod gui;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewer;

pub use cgmath;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point. Expects a `<canvas id="canvas">` in the page and
/// the assets to be served from `{origin}/assets/`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    flow::run(config::ViewerConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
