//! Meshes, materials and the vertex layout they are drawn with.
//!
//! Everything here lives on the CPU first. The `gpu` slots are filled lazily by
//! [`crate::render`] the first time a drawable is prepared, so the loader and the
//! viewer logic can be exercised without a device.

use cgmath::Matrix4;

use crate::data_structures::{bounds::Aabb, image::ImageHandle, scene_graph::NodeId};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // joint indices are u32 so they sit right after the 14 floats above
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 14]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Uint32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 18]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// From hue, saturation and lightness, each in `0.0..=1.0`. The hue wraps.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::new(l, l, l);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;

        Self::new(
            hue_to_rgb(q, p, h + 1.0 / 3.0),
            hue_to_rgb(q, p, h),
            hue_to_rgb(q, p, h - 1.0 / 3.0),
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Surface properties of a single drawable.
///
/// Image slots hold shared handles: a handle may still be loading when it is
/// assigned, in which case the renderer uses a neutral fallback until it fills.
/// Setting any slot should be followed by `needs_update = true` so the bind
/// group is rebuilt.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub map: Option<ImageHandle>,
    pub normal_map: Option<ImageHandle>,
    pub roughness_map: Option<ImageHandle>,
    pub roughness: f32,
    pub metalness: f32,
    pub wireframe: bool,
    pub visible: bool,
    pub needs_update: bool,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: Color::WHITE,
            map: None,
            normal_map: None,
            roughness_map: None,
            roughness: 1.0,
            metalness: 0.0,
            wireframe: false,
            visible: true,
            needs_update: true,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Local-space bounds of `vertices`.
    pub bounds: Option<Aabb>,
}

impl Mesh {
    pub fn new(name: &str, vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::from_points(vertices.iter().map(|v| v.position.into()));
        Self {
            name: name.to_string(),
            vertices,
            indices,
            bounds,
        }
    }
}

/// Joints driving a skinned mesh, in the order referenced by [`ModelVertex::joints`].
#[derive(Clone, Debug)]
pub struct Skin {
    pub joints: Vec<NodeId>,
    pub inverse_bind_matrices: Vec<Matrix4<f32>>,
}

/// Vertex and index buffers of an uploaded [`Mesh`].
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

/// Uniform buffer and bind group of a [`Material`].
///
/// `bound` records which images were ready when the bind group was created so a
/// handle finishing its load later triggers a rebuild.
#[derive(Debug)]
pub struct GpuMaterial {
    pub uniform: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bound: [Option<u64>; 3],
}

/// Per-object transform and joint palette.
#[derive(Debug)]
pub struct GpuObject {
    pub uniform: wgpu::Buffer,
    pub joints: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct GpuDrawable {
    pub mesh: GpuMesh,
    pub material: GpuMaterial,
    pub object: GpuObject,
}

/// A renderable attached to a scene node: geometry plus its own material.
#[derive(Debug)]
pub struct Drawable {
    pub mesh: Mesh,
    pub material: Material,
    pub skin: Option<Skin>,
    pub gpu: Option<GpuDrawable>,
}

impl Drawable {
    pub fn new(mesh: Mesh, material: Material) -> Self {
        Self {
            mesh,
            material,
            skin: None,
            gpu: None,
        }
    }
}
