//! Render pipelines.
//!
//! - `avatar` draws the loaded scene graph (solid and, where supported, wireframe)
//! - `light` holds the ambient/directional light uniform shared by the avatar pipeline

pub mod avatar;
pub mod light;
