use crate::data_structures::{
    model::{self, Material, Vertex},
    texture::Texture,
};

/// Upper bound of joints per skin; matches the array length in `avatar.wgsl`.
pub const MAX_JOINTS: usize = 128;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    color: [f32; 4],
    params: [f32; 4],
}

impl MaterialUniform {
    pub fn new(material: &Material) -> Self {
        let [r, g, b] = material.color.to_array();
        let has_normal = material
            .normal_map
            .as_ref()
            .is_some_and(|handle| handle.is_ready());
        Self {
            color: [r, g, b, 1.0],
            params: [
                material.roughness,
                material.metalness,
                if has_normal { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub flags: [u32; 4],
}

#[derive(Debug)]
pub struct AvatarPipelines {
    pub solid: wgpu::RenderPipeline,
    /// Only present when the adapter supports line polygon mode.
    pub wireframe: Option<wgpu::RenderPipeline>,
    pub material_layout: wgpu::BindGroupLayout,
    pub object_layout: wgpu::BindGroupLayout,
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Material uniform followed by base colour, normal and roughness texture/sampler pairs.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
            texture_entry(1),
            sampler_entry(2),
            texture_entry(3),
            sampler_entry(4),
            texture_entry(5),
            sampler_entry(6),
        ],
        label: Some("material_bind_group_layout"),
    })
}

/// Model matrix plus the joint palette of a skinned mesh.
pub fn object_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX),
            uniform_entry(1, wgpu::ShaderStages::VERTEX),
        ],
        label: Some("object_bind_group_layout"),
    })
}

impl AvatarPipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        wireframe_supported: bool,
    ) -> Self {
        let material_layout = material_layout(device);
        let object_layout = object_layout(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Avatar Pipeline Layout"),
            bind_group_layouts: &[
                &material_layout,
                camera_bind_group_layout,
                light_bind_group_layout,
                &object_layout,
            ],
            push_constant_ranges: &[],
        });
        let shader = || wgpu::ShaderModuleDescriptor {
            label: Some("Avatar Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("avatar.wgsl").into()),
        };

        let solid = mk_render_pipeline(
            device,
            &layout,
            config.format,
            wgpu::PolygonMode::Fill,
            shader(),
        );
        let wireframe = wireframe_supported.then(|| {
            mk_render_pipeline(
                device,
                &layout,
                config.format,
                wgpu::PolygonMode::Line,
                shader(),
            )
        });

        Self {
            solid,
            wireframe,
            material_layout,
            object_layout,
        }
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    polygon_mode: wgpu::PolygonMode,
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(match polygon_mode {
            wgpu::PolygonMode::Fill => "Avatar Pipeline",
            _ => "Avatar Wireframe Pipeline",
        }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[model::ModelVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState {
                    alpha: wgpu::BlendComponent::REPLACE,
                    color: wgpu::BlendComponent::REPLACE,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // avatar assets ship single-sided cards (hair, eyelashes)
            cull_mode: None,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
