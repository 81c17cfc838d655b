//! Viewer defaults and the hard-coded asset tables.
//!
//! The bound asset is configured by two tables: [`TEXTURE_FILES`] lists the
//! image layers per logical surface and [`MESH_SURFACES`] maps the avatar's
//! mesh names onto those surfaces. Swapping the avatar means editing both.

use cgmath::{Deg, Point3, Vector3};

use crate::{data_structures::model::Color, viewer::textures::Surface};

/// The packaged avatar loaded at startup.
pub const MODEL_FILE: &str = "male_full-body_sci-fi_character_walk.glb";

/// Name of the walk clip embedded in [`MODEL_FILE`].
pub const WALK_CLIP: &str = "rig|rig|walk|rig|walk";

/// Environment variable overriding the native asset directory.
pub const ASSETS_ENV: &str = "AVATAR_VIEWER_ASSETS";

/// File names of the image layers belonging to one surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureFiles {
    pub base_color: Option<&'static str>,
    pub normal: Option<&'static str>,
    pub gloss: Option<&'static str>,
}

impl TextureFiles {
    const fn color(base_color: &'static str) -> Self {
        Self {
            base_color: Some(base_color),
            normal: None,
            gloss: None,
        }
    }

    const fn color_normal(base_color: &'static str, normal: &'static str) -> Self {
        Self {
            base_color: Some(base_color),
            normal: Some(normal),
            gloss: None,
        }
    }

    const fn full(base_color: &'static str, normal: &'static str, gloss: &'static str) -> Self {
        Self {
            base_color: Some(base_color),
            normal: Some(normal),
            gloss: Some(gloss),
        }
    }
}

pub const TEXTURE_FILES: [(Surface, TextureFiles); 9] = [
    (Surface::Body, TextureFiles::color("body_texture.jpeg")),
    (Surface::Eyes, TextureFiles::color("eyes.jpeg")),
    (
        Surface::Beard,
        TextureFiles::color_normal("beard_color.jpeg", "beard_normal.jpeg"),
    ),
    (Surface::Teeth, TextureFiles::color("teeth.jpeg")),
    (Surface::Face, TextureFiles::color("face_texture.jpeg")),
    (
        Surface::Hair,
        TextureFiles::color_normal("hair_color.jpeg", "hair_normal.jpeg"),
    ),
    (
        Surface::Pants,
        TextureFiles::full(
            "pants_base_color.jpeg",
            "pants_normal.jpeg",
            "pants_gloss_color.png",
        ),
    ),
    (
        Surface::Shirt,
        // the shipped file really is spelled "shrit"
        TextureFiles::full(
            "shirt_base_color.jpeg",
            "shirt_normal.jpeg",
            "shrit_gloss_color.png",
        ),
    ),
    (
        Surface::Shoes,
        TextureFiles::full(
            "shoes_base_color.jpeg",
            "shoes_normal.jpeg",
            "shoes_gloss_color.png",
        ),
    ),
];

pub const MESH_SURFACES: [(&str, Surface); 10] = [
    ("Wolf3D_Body", Surface::Body),
    ("EyeLeft", Surface::Eyes),
    ("EyeRight", Surface::Eyes),
    ("Wolf3D_Beard", Surface::Beard),
    ("Wolf3D_Teeth", Surface::Teeth),
    ("Wolf3D_Head", Surface::Face),
    ("Wolf3D_Hair", Surface::Hair),
    ("Wolf3D_Outfit_Top", Surface::Shirt),
    ("Wolf3D_Outfit_Bottom", Surface::Pants),
    ("Wolf3D_Outfit_Footwear", Surface::Shoes),
];

/// A light as exposed to the panel: colour, intensity and (for directional
/// lights) the position it shines from towards the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
}

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// Directory (native) or URL path below the origin (WASM) holding the assets.
    pub assets: String,
    pub model_file: String,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub camera_position: Point3<f32>,
    pub damping_factor: f32,
    pub ambient: Light,
    pub directional: Light,
    pub rotation_speed: f32,
    pub clear_colour: wgpu::Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            assets: "assets".to_string(),
            model_file: MODEL_FILE.to_string(),
            fovy: Deg(75.0),
            znear: 0.1,
            zfar: 1000.0,
            camera_position: Point3::new(0.0, 1.0, 5.0),
            damping_factor: 0.05,
            ambient: Light {
                color: Color::WHITE,
                intensity: 0.5,
                position: Vector3::new(0.0, 0.0, 0.0),
            },
            directional: Light {
                color: Color::WHITE,
                intensity: 1.0,
                position: Vector3::new(5.0, 10.0, 7.5),
            },
            rotation_speed: 0.005,
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

impl ViewerConfig {
    /// Defaults with the asset directory taken from [`ASSETS_ENV`] when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(assets) = std::env::var(ASSETS_ENV) {
            config.assets = assets;
        }
        config
    }
}
