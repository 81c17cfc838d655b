//! The texture registry: image layers per logical surface of the avatar.
//!
//! Handles are created up front and filled as their files finish loading, so
//! the registry can be bound to materials before any pixels have arrived.

use std::collections::HashMap;

use crate::{
    config::{MESH_SURFACES, TEXTURE_FILES, ViewerConfig},
    data_structures::image::ImageHandle,
    resources::{Task, texture::fill_image},
};

/// Roughness scalar set on materials that receive a gloss layer.
pub const GLOSS_ROUGHNESS: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Surface {
    Body,
    Eyes,
    Beard,
    Teeth,
    Face,
    Hair,
    Pants,
    Shirt,
    Shoes,
}

impl Surface {
    pub const ALL: [Surface; 9] = [
        Surface::Body,
        Surface::Eyes,
        Surface::Beard,
        Surface::Teeth,
        Surface::Face,
        Surface::Hair,
        Surface::Pants,
        Surface::Shirt,
        Surface::Shoes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Surface::Body => "body",
            Surface::Eyes => "eyes",
            Surface::Beard => "beard",
            Surface::Teeth => "teeth",
            Surface::Face => "face",
            Surface::Hair => "hair",
            Surface::Pants => "pants",
            Surface::Shirt => "shirt",
            Surface::Shoes => "shoes",
        }
    }
}

/// Surface a mesh of the bound avatar is textured as, looked up by exact name.
pub fn surface_for_mesh(name: &str) -> Option<Surface> {
    MESH_SURFACES
        .iter()
        .find(|(mesh, _)| *mesh == name)
        .map(|(_, surface)| *surface)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureSet {
    pub base_color: Option<ImageHandle>,
    pub normal: Option<ImageHandle>,
    pub gloss: Option<ImageHandle>,
}

#[derive(Clone, Debug, Default)]
pub struct TextureRegistry {
    sets: HashMap<Surface, TextureSet>,
}

impl TextureRegistry {
    /// Create a pending handle for every file in [`TEXTURE_FILES`] together with the
    /// tasks that load them. Spawn the tasks; the registry is usable right away.
    pub fn request(config: &ViewerConfig) -> (Self, Vec<Task>) {
        let mut tasks: Vec<Task> = Vec::new();
        let mut request = |file: Option<&'static str>| {
            file.map(|file| {
                let handle = ImageHandle::pending(file);
                tasks.push(Box::pin(fill_image(
                    config.assets.clone(),
                    file,
                    handle.clone(),
                )));
                handle
            })
        };

        let sets = TEXTURE_FILES
            .iter()
            .map(|(surface, files)| {
                let set = TextureSet {
                    base_color: request(files.base_color),
                    normal: request(files.normal),
                    gloss: request(files.gloss),
                };
                (*surface, set)
            })
            .collect();

        (Self { sets }, tasks)
    }

    pub fn from_sets(sets: impl IntoIterator<Item = (Surface, TextureSet)>) -> Self {
        Self {
            sets: sets.into_iter().collect(),
        }
    }

    pub fn get(&self, surface: Surface) -> Option<&TextureSet> {
        self.sets.get(&surface)
    }
}
