//! glTF / GLB to [`SceneGraph`] conversion.

use std::collections::HashMap;

use anyhow::{Context as _, bail};
use cgmath::{Matrix4, Quaternion, Vector3};
use log::{debug, warn};

use crate::{
    data_structures::{
        image::ImageHandle,
        model::{Color, Drawable, Material, Mesh, ModelVertex, Skin},
        scene_graph::{NodeId, SceneGraph},
        transform::Transform,
    },
    resources::{
        LoadedAsset,
        animation::{AnimationClip, Interpolation, KeyframeTrack, Keyframes},
        mesh,
        texture::{decode_image, load_binary},
    },
};

/// Parse a `.glb` or `.gltf` document. External buffers and images are fetched
/// relative to `assets`.
pub async fn parse_gltf(bytes: &[u8], assets: &str) -> anyhow::Result<LoadedAsset> {
    let gltf = gltf::Gltf::from_slice(bytes).context("not a valid glTF document")?;

    let mut buffers = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .context("buffer refers to a binary chunk the file does not have")?;
                buffers.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(assets, uri, |_, _| {})
                    .await
                    .with_context(|| format!("could not load buffer {uri}"))?;
                buffers.push(bin);
            }
        }
    }

    let images = load_images(&gltf, &buffers, assets).await;
    let materials = gltf
        .materials()
        .map(|material| to_material(&material, &images))
        .collect::<Vec<_>>();

    let mut graph = SceneGraph::new();
    let mut node_ids = HashMap::new();
    let mut skinned = Vec::new();

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .context("glTF contains no scene")?;
    let root = graph.root();
    for node in scene.nodes() {
        add_node(
            &mut graph,
            root,
            &node,
            &buffers,
            &materials,
            &mut node_ids,
            &mut skinned,
        )?;
    }

    for (id, skin) in skinned {
        // one slot per joint so vertex joint indices and inverse binds stay aligned
        let joints = skin
            .joints()
            .map(|joint| match node_ids.get(&joint.index()) {
                Some(&id) => id,
                None => {
                    debug!("Joint node {} is outside the scene, bound to the root", joint.index());
                    root
                }
            })
            .collect::<Vec<_>>();
        let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let inverse_bind_matrices = match reader.read_inverse_bind_matrices() {
            Some(matrices) => matrices.map(Matrix4::from).collect(),
            None => Vec::new(),
        };
        if let Some(drawable) = graph.drawable_mut(id) {
            drawable.skin = Some(Skin {
                joints,
                inverse_bind_matrices,
            });
        }
    }

    let animations = gltf
        .animations()
        .map(|animation| to_clip(&animation, &buffers, &node_ids))
        .collect();

    graph.update_world_transforms();

    Ok(LoadedAsset {
        scene: graph,
        animations,
    })
}

async fn load_images(
    gltf: &gltf::Gltf,
    buffers: &[Vec<u8>],
    assets: &str,
) -> Vec<Option<ImageHandle>> {
    let mut images = Vec::new();
    for image in gltf.images() {
        let label = image
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("image_{}", image.index()));
        let decoded = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let start = view.offset();
                let end = start + view.length();
                match buffers.get(view.buffer().index()).and_then(|b| b.get(start..end)) {
                    Some(bytes) => decode_image(bytes, Some(mime_type)),
                    None => Err(anyhow::anyhow!("buffer view out of range")),
                }
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                match load_binary(assets, uri, |_, _| {}).await {
                    Ok(bytes) => decode_image(&bytes, mime_type),
                    Err(e) => Err(e),
                }
            }
        };
        match decoded {
            Ok(rgba) => images.push(Some(ImageHandle::ready(&label, rgba))),
            Err(e) => {
                warn!("Embedded image {label} could not be decoded: {e:#}");
                images.push(None);
            }
        }
    }
    images
}

fn texture_image(texture: gltf::Texture, images: &[Option<ImageHandle>]) -> Option<ImageHandle> {
    images.get(texture.source().index()).cloned().flatten()
}

fn to_material(material: &gltf::Material, images: &[Option<ImageHandle>]) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let mut result = Material::new(material.name().unwrap_or("material"));
    result.color = Color::new(r, g, b);
    result.roughness = pbr.roughness_factor();
    result.metalness = pbr.metallic_factor();
    result.map = pbr
        .base_color_texture()
        .and_then(|info| texture_image(info.texture(), images));
    result.normal_map = material
        .normal_texture()
        .and_then(|normal| texture_image(normal.texture(), images));
    result.roughness_map = pbr
        .metallic_roughness_texture()
        .and_then(|info| texture_image(info.texture(), images));
    result
}

fn add_node<'a>(
    graph: &mut SceneGraph,
    parent: NodeId,
    node: &gltf::Node<'a>,
    buffers: &[Vec<u8>],
    materials: &[Material],
    node_ids: &mut HashMap<usize, NodeId>,
    skinned: &mut Vec<(NodeId, gltf::Skin<'a>)>,
) -> anyhow::Result<()> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let [x, y, z, w] = rotation;
    let transform = Transform::from_trs(
        Vector3::from(translation),
        Quaternion::new(w, x, y, z),
        Vector3::from(scale),
    );
    let name = node.name().unwrap_or("");
    let id = graph.add_node(parent, name, transform);
    node_ids.insert(node.index(), id);

    if let Some(gltf_mesh) = node.mesh() {
        let primitives = gltf_mesh.primitives().collect::<Vec<_>>();
        let single = primitives.len() == 1;
        for (i, primitive) in primitives.iter().enumerate() {
            let material = primitive
                .material()
                .index()
                .and_then(|idx| materials.get(idx))
                .cloned()
                .unwrap_or_default();
            let Some(mesh) = to_mesh(name, primitive, buffers)? else {
                continue;
            };
            // one primitive: the node is the mesh, otherwise one child per primitive
            let target = if single {
                id
            } else {
                graph.add_node(id, &format!("{name}_{i}"), Transform::new())
            };
            if let Some(target_node) = graph.get_mut(target) {
                target_node.drawable = Some(Drawable::new(mesh, material));
            }
            if let Some(skin) = node.skin() {
                skinned.push((target, skin));
            }
        }
    }

    for child in node.children() {
        add_node(graph, id, &child, buffers, materials, node_ids, skinned)?;
    }
    Ok(())
}

fn to_mesh(
    name: &str,
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Option<Mesh>> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        debug!("Skipping non-triangle primitive of {name}");
        return Ok(None);
    }
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let Some(positions) = reader.read_positions() else {
        bail!("primitive of {name} has no positions");
    };
    let mut vertices = positions
        .map(|position| ModelVertex {
            position,
            weights: [1.0, 0.0, 0.0, 0.0],
            ..Default::default()
        })
        .collect::<Vec<_>>();

    if let Some(normals) = reader.read_normals() {
        for (vertex, normal) in vertices.iter_mut().zip(normals) {
            vertex.normal = normal;
        }
    }
    mesh::ensure_normals(&mut vertices);
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        for (vertex, uv) in vertices.iter_mut().zip(tex_coords.into_f32()) {
            vertex.tex_coords = uv;
        }
    }
    if let Some(joints) = reader.read_joints(0) {
        for (vertex, joint) in vertices.iter_mut().zip(joints.into_u16()) {
            vertex.joints = joint.map(u32::from);
        }
    }
    if let Some(weights) = reader.read_weights(0) {
        for (vertex, weight) in vertices.iter_mut().zip(weights.into_f32()) {
            vertex.weights = weight;
        }
    }
    if primitive.morph_targets().next().is_some() {
        debug!("Ignoring morph targets of {name}");
    }

    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect::<Vec<_>>(),
        None => (0..vertices.len() as u32).collect(),
    };

    match reader.read_tangents() {
        Some(tangents) => {
            for (vertex, tangent) in vertices.iter_mut().zip(tangents) {
                mesh::apply_gltf_tangent(vertex, tangent);
            }
        }
        None => mesh::compute_tangents(&mut vertices, &indices),
    }

    Ok(Some(Mesh::new(name, vertices, indices)))
}

fn to_clip(
    animation: &gltf::Animation,
    buffers: &[Vec<u8>],
    node_ids: &HashMap<usize, NodeId>,
) -> AnimationClip {
    let mut tracks = Vec::new();
    for channel in animation.channels() {
        let Some(&target) = node_ids.get(&channel.target().node().index()) else {
            continue;
        };
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let Some(timestamps) = reader.read_inputs().map(|inputs| inputs.collect::<Vec<f32>>())
        else {
            warn!("No keyframe times in channel {}", channel.index());
            continue;
        };
        let interpolation = channel.sampler().interpolation();
        let keyframes = match reader.read_outputs() {
            Some(gltf::animation::util::ReadOutputs::Translations(values)) => {
                Keyframes::Translation(spline_values(interpolation, values.map(Vector3::from)))
            }
            Some(gltf::animation::util::ReadOutputs::Rotations(values)) => Keyframes::Rotation(
                spline_values(
                    interpolation,
                    values
                        .into_f32()
                        .map(|[x, y, z, w]| Quaternion::new(w, x, y, z)),
                ),
            ),
            Some(gltf::animation::util::ReadOutputs::Scales(values)) => {
                Keyframes::Scale(spline_values(interpolation, values.map(Vector3::from)))
            }
            Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) => {
                debug!("Ignoring morph target channel {}", channel.index());
                Keyframes::Other
            }
            None => Keyframes::Other,
        };
        tracks.push(KeyframeTrack {
            target,
            timestamps,
            keyframes,
            interpolation: match interpolation {
                gltf::animation::Interpolation::Step => Interpolation::Step,
                _ => Interpolation::Linear,
            },
        });
    }
    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation_{}", animation.index()));
    AnimationClip::new(&name, tracks)
}

/// Cubic-spline samplers store (in-tangent, value, out-tangent) per key; keep the values.
fn spline_values<T>(
    interpolation: gltf::animation::Interpolation,
    values: impl Iterator<Item = T>,
) -> Vec<T> {
    match interpolation {
        gltf::animation::Interpolation::CubicSpline => values.skip(1).step_by(3).collect(),
        _ => values.collect(),
    }
}
