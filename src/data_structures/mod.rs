//! Engine data structures: scene graph, meshes, materials and transforms.
//!
//! - `bounds` is the axis-aligned bounding box used for camera fitting
//! - `image` holds decoded image handles shared between registry and materials
//! - `model` contains vertices, meshes, materials and colours
//! - `scene_graph` is the node hierarchy produced by the glTF loader
//! - `texture` wraps GPU textures
//! - `transform` holds per-node TRS transforms and their Euler view

pub mod bounds;
pub mod image;
pub mod model;
pub mod scene_graph;
pub mod texture;
pub mod transform;
