use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

use crate::config::Light;

#[derive(Debug)]
pub struct LightResources {
    /// Live light parameters, edited by the panel and re-uploaded every frame.
    pub ambient: Light,
    pub directional: Light,
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Ambient colour pre-multiplied by its intensity; `w` unused.
    ambient: [f32; 4],
    /// Unit vector pointing from the surface towards the directional light.
    direction: [f32; 4],
    /// Directional colour pre-multiplied by its intensity.
    color: [f32; 4],
}

impl LightUniform {
    pub fn new(ambient: &Light, directional: &Light) -> Self {
        let scaled = |light: &Light| {
            let [r, g, b] = light.color.to_array();
            [r * light.intensity, g * light.intensity, b * light.intensity, 0.0]
        };
        // directional lights shine from their position towards the origin
        let direction = if directional.position.magnitude2() > 0.0 {
            directional.position.normalize()
        } else {
            cgmath::Vector3::unit_y()
        };
        Self {
            ambient: scaled(ambient),
            direction: direction.extend(0.0).into(),
            color: scaled(directional),
        }
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

impl LightResources {
    pub fn new(device: &wgpu::Device, ambient: Light, directional: Light) -> Self {
        let uniform = LightUniform::new(&ambient, &directional);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });

        Self {
            ambient,
            directional,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Re-derive the uniform from the live lights and upload it if it changed.
    pub fn write(&mut self, queue: &wgpu::Queue) {
        let uniform = LightUniform::new(&self.ambient, &self.directional);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
    }
}
