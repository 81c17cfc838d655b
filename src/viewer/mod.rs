//! Viewer behaviour on top of the engine layer: texture binding, animation,
//! colour pulse, framing and the control panel.
//!
//! Nothing in here touches the GPU, so all of it runs against a bare
//! [`SceneGraph`](crate::data_structures::scene_graph::SceneGraph).

pub mod animation;
pub mod binder;
pub mod color_pulse;
pub mod framing;
pub mod panel;
pub mod state;
pub mod textures;
