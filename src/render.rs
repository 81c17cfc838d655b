//! GPU preparation of the scene graph and frame submission.
//!
//! [`prepare`] lazily uploads meshes, rebuilds material bind groups when a
//! material is flagged dirty or one of its images finished loading, and writes
//! per-object uniforms. [`render`] then draws the scene followed by the panel.

use cgmath::{Matrix4, SquareMatrix};
use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        image::ImageHandle,
        model::{GpuDrawable, GpuMaterial, GpuMesh, GpuObject, Material, Mesh},
        scene_graph::SceneGraph,
        texture::{ColorSpace, Texture, create_default_sampler},
    },
    gui::Gui,
    pipelines::avatar::{MAX_JOINTS, MaterialUniform, ObjectUniform},
};

/// Upload `handle` if it is ready and not cached yet. Returns its cache key.
fn ensure_texture(
    ctx: &mut Context,
    handle: Option<&ImageHandle>,
    space: ColorSpace,
) -> Option<(u64, ColorSpace)> {
    let handle = handle?;
    let image = handle.get()?;
    let key = (handle.id(), space);
    if !ctx.textures.contains_key(&key) {
        let texture = Texture::from_rgba(
            &ctx.device,
            &ctx.queue,
            image,
            space,
            Some(handle.label()),
        );
        ctx.textures.insert(key, texture);
    }
    Some(key)
}

fn readiness(material: &Material) -> [Option<u64>; 3] {
    [&material.map, &material.normal_map, &material.roughness_map].map(|slot| {
        slot.as_ref()
            .filter(|handle| handle.is_ready())
            .map(ImageHandle::id)
    })
}

/// View and sampler of a cached texture, or of `fallback` when the layer is absent.
fn binding(
    ctx: &Context,
    key: Option<(u64, ColorSpace)>,
    fallback: &Texture,
) -> (wgpu::TextureView, wgpu::Sampler) {
    let texture = key.and_then(|k| ctx.textures.get(&k)).unwrap_or(fallback);
    let sampler = texture
        .sampler
        .clone()
        .unwrap_or_else(|| create_default_sampler(&ctx.device));
    (texture.view.clone(), sampler)
}

fn mk_material(ctx: &mut Context, material: &Material) -> GpuMaterial {
    let base = ensure_texture(ctx, material.map.as_ref(), ColorSpace::Srgb);
    let normal = ensure_texture(ctx, material.normal_map.as_ref(), ColorSpace::Linear);
    let roughness = ensure_texture(ctx, material.roughness_map.as_ref(), ColorSpace::Linear);

    let (base_view, base_sampler) = binding(ctx, base, &ctx.defaults.white_srgb);
    let (normal_view, normal_sampler) = binding(ctx, normal, &ctx.defaults.flat_normal);
    let (rough_view, rough_sampler) = binding(ctx, roughness, &ctx.defaults.white_linear);

    let uniform = ctx
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", material.name)),
            contents: bytemuck::cast_slice(&[MaterialUniform::new(material)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &ctx.pipelines.material_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&base_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&base_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&normal_view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(&normal_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 5,
                resource: wgpu::BindingResource::TextureView(&rough_view),
            },
            wgpu::BindGroupEntry {
                binding: 6,
                resource: wgpu::BindingResource::Sampler(&rough_sampler),
            },
        ],
        label: Some(&format!("{} Material Bind Group", material.name)),
    });

    GpuMaterial {
        uniform,
        bind_group,
        bound: readiness(material),
    }
}

fn mk_mesh(device: &wgpu::Device, mesh: &Mesh) -> GpuMesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", mesh.name)),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    GpuMesh {
        vertex_buffer,
        index_buffer,
        num_elements: mesh.indices.len() as u32,
    }
}

fn mk_object(ctx: &Context, name: &str) -> GpuObject {
    let uniform = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{name} Object Buffer")),
        size: std::mem::size_of::<ObjectUniform>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let joints = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{name} Joint Buffer")),
        size: (MAX_JOINTS * std::mem::size_of::<[[f32; 4]; 4]>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &ctx.pipelines.object_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: joints.as_entire_binding(),
            },
        ],
        label: Some(&format!("{name} Object Bind Group")),
    });
    GpuObject {
        uniform,
        joints,
        bind_group,
    }
}

/// Bring the GPU side of every drawable up to date with the CPU scene graph.
/// World transforms must already be current.
pub fn prepare(ctx: &mut Context, graph: &mut SceneGraph) {
    for id in graph.drawables() {
        let joints = graph.joint_matrices(id);
        let Some(node) = graph.get_mut(id) else {
            continue;
        };
        let world = node.world;
        let Some(drawable) = node.drawable.as_mut() else {
            continue;
        };

        if drawable.material.wireframe && ctx.pipelines.wireframe.is_none() && !ctx.wireframe_warned
        {
            warn!("Wireframe rendering is not supported by this adapter");
            ctx.wireframe_warned = true;
        }

        let skinned = drawable.skin.is_some() && !joints.is_empty();
        match drawable.gpu.as_mut() {
            None => {
                let mesh = mk_mesh(&ctx.device, &drawable.mesh);
                let material = mk_material(ctx, &drawable.material);
                let object = mk_object(ctx, &drawable.mesh.name);
                drawable.gpu = Some(GpuDrawable {
                    mesh,
                    material,
                    object,
                });
            }
            Some(gpu) => {
                if drawable.material.needs_update
                    || gpu.material.bound != readiness(&drawable.material)
                {
                    gpu.material = mk_material(ctx, &drawable.material);
                } else {
                    ctx.queue.write_buffer(
                        &gpu.material.uniform,
                        0,
                        bytemuck::cast_slice(&[MaterialUniform::new(&drawable.material)]),
                    );
                }
            }
        }
        drawable.material.needs_update = false;

        let Some(gpu) = drawable.gpu.as_ref() else {
            continue;
        };
        // skinned vertices are already in world space after the joint palette
        let model = if skinned {
            Matrix4::identity()
        } else {
            world
        };
        let object = ObjectUniform {
            model: model.into(),
            flags: [u32::from(skinned), 0, 0, 0],
        };
        ctx.queue
            .write_buffer(&gpu.object.uniform, 0, bytemuck::cast_slice(&[object]));
        if skinned {
            let palette = joints
                .iter()
                .take(MAX_JOINTS)
                .map(|m| -> [[f32; 4]; 4] { (*m).into() })
                .collect::<Vec<_>>();
            ctx.queue
                .write_buffer(&gpu.object.joints, 0, bytemuck::cast_slice(&palette));
        }
    }
}

/// Draw the scene and the panel into the next surface texture.
pub fn render(
    ctx: &Context,
    graph: &SceneGraph,
    gui: &mut Gui,
    panel: egui::FullOutput,
) -> Result<(), wgpu::SurfaceError> {
    let output = ctx.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(1, &ctx.camera.bind_group, &[]);
        render_pass.set_bind_group(2, &ctx.light.bind_group, &[]);

        for id in graph.drawables() {
            let Some(drawable) = graph.drawable(id) else {
                continue;
            };
            let Some(gpu) = drawable.gpu.as_ref() else {
                continue;
            };
            if !drawable.material.visible || gpu.mesh.num_elements == 0 {
                continue;
            }
            let pipeline = match (&ctx.pipelines.wireframe, drawable.material.wireframe) {
                (Some(wireframe), true) => wireframe,
                _ => &ctx.pipelines.solid,
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &gpu.material.bind_group, &[]);
            render_pass.set_bind_group(3, &gpu.object.bind_group, &[]);
            render_pass.set_vertex_buffer(0, gpu.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(gpu.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..gpu.mesh.num_elements, 0, 0..1);
        }
    }

    gui.paint(
        &ctx.device,
        &ctx.queue,
        &mut encoder,
        &view,
        [ctx.config.width, ctx.config.height],
        ctx.window.scale_factor() as f32,
        panel,
    );

    ctx.queue.submit(std::iter::once(encoder.finish()));
    output.present();
    Ok(())
}
