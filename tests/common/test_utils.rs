#![allow(dead_code)]

use avatar_viewer::{
    cgmath::Vector3,
    config::MESH_SURFACES,
    data_structures::{
        model::{Drawable, Material, Mesh, ModelVertex},
        scene_graph::{NodeId, SceneGraph},
        transform::Transform,
    },
};

/// A triangle fan drawable whose bounds are exactly `min`..`max`.
pub fn boxed_drawable(name: &str, min: [f32; 3], max: [f32; 3]) -> Drawable {
    let vertices = [min, [max[0], min[1], max[2]], max]
        .into_iter()
        .map(|position| ModelVertex {
            position,
            weights: [1.0, 0.0, 0.0, 0.0],
            ..Default::default()
        })
        .collect();
    Drawable::new(Mesh::new(name, vertices, vec![0, 1, 2]), Material::new(name))
}

pub fn add_mesh(graph: &mut SceneGraph, parent: NodeId, name: &str) -> NodeId {
    let id = graph.add_node(parent, name, Transform::new());
    if let Some(node) = graph.get_mut(id) {
        node.drawable = Some(boxed_drawable(name, [-0.5, 0.0, -0.5], [0.5, 1.0, 0.5]));
    }
    id
}

/// Scene layout of the packaged avatar: every known mesh, one unknown mesh, and
/// a small armature with a right hand.
pub struct AvatarFixture {
    pub graph: SceneGraph,
    pub armature: NodeId,
    pub right_hand: NodeId,
    pub unknown: NodeId,
}

pub fn avatar_graph() -> AvatarFixture {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let armature = graph.add_node(root, "Armature", Transform::new());
    let spine = graph.add_node(armature, "Spine", Transform::from(Vector3::new(0.0, 1.0, 0.0)));
    graph.add_node(spine, "LeftHand", Transform::new());
    let right_hand = graph.add_node(spine, "RightHand", Transform::new());
    for (name, _) in MESH_SURFACES {
        add_mesh(&mut graph, root, name);
    }
    let unknown = add_mesh(&mut graph, root, "Wolf3D_Glasses");
    graph.update_world_transforms();
    AvatarFixture {
        graph,
        armature,
        right_hand,
        unknown,
    }
}

/// A single drawable spanning `min`..`max` directly below the root.
pub fn box_graph(min: [f32; 3], max: [f32; 3]) -> SceneGraph {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let id = graph.add_node(root, "Box", Transform::new());
    if let Some(node) = graph.get_mut(id) {
        node.drawable = Some(boxed_drawable("Box", min, max));
    }
    graph.update_world_transforms();
    graph
}

fn push_f32s(bin: &mut Vec<u8>, values: &[f32]) {
    for value in values {
        bin.extend_from_slice(&value.to_le_bytes());
    }
}

/// A binary glTF with one triangle mesh `Wolf3D_Body` spanning (-2,0,-1)..(2,4,1),
/// an `Armature` whose child `RightHand` sits at (0.5,1,0), and one animation
/// `hand_lift` moving the hand up by one unit over one second.
pub fn avatar_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    // 0..36 positions
    push_f32s(&mut bin, &[-2.0, 0.0, -1.0, 2.0, 4.0, 1.0, 0.0, 2.0, 0.0]);
    // 36..48 indices
    for index in [0u32, 1, 2] {
        bin.extend_from_slice(&index.to_le_bytes());
    }
    // 48..56 keyframe times
    push_f32s(&mut bin, &[0.0, 1.0]);
    // 56..80 translations
    push_f32s(&mut bin, &[0.5, 1.0, 0.0, 0.5, 2.0, 0.0]);

    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0, 1] }}],
  "nodes": [
    {{ "name": "Wolf3D_Body", "mesh": 0 }},
    {{ "name": "Armature", "children": [2] }},
    {{ "name": "RightHand", "translation": [0.5, 1.0, 0.0] }}
  ],
  "meshes": [{{
    "name": "Wolf3D_Body",
    "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}]
  }}],
  "animations": [{{
    "name": "hand_lift",
    "channels": [{{ "sampler": 0, "target": {{ "node": 2, "path": "translation" }} }}],
    "samplers": [{{ "input": 2, "output": 3, "interpolation": "LINEAR" }}]
  }}],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [-2.0, 0.0, -1.0], "max": [2.0, 4.0, 1.0] }},
    {{ "bufferView": 1, "componentType": 5125, "count": 3, "type": "SCALAR" }},
    {{ "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
       "min": [0.0], "max": [1.0] }},
    {{ "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 12, "target": 34963 }},
    {{ "buffer": 0, "byteOffset": 48, "byteLength": 8 }},
    {{ "buffer": 0, "byteOffset": 56, "byteLength": 24 }}
  ],
  "buffers": [{{ "byteLength": {} }}]
}}"#,
        bin.len()
    );
    encode_glb(json, bin)
}

/// Two eye nodes instancing one mesh with the shared material `Wolf3D_Eye`.
/// `EyeLeft` is skinned to `[Stray, RightHand]`, where `Stray` is a node
/// outside the scene.
pub fn rig_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    // 0..36 positions
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // 36..48 indices
    for index in [0u32, 1, 2] {
        bin.extend_from_slice(&index.to_le_bytes());
    }

    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0, 1, 2] }}],
  "nodes": [
    {{ "name": "EyeLeft", "mesh": 0, "skin": 0 }},
    {{ "name": "EyeRight", "mesh": 0 }},
    {{ "name": "Armature", "children": [3] }},
    {{ "name": "RightHand" }},
    {{ "name": "Stray" }}
  ],
  "skins": [{{ "joints": [4, 3] }}],
  "materials": [{{ "name": "Wolf3D_Eye" }}],
  "meshes": [{{
    "name": "Eye",
    "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }}]
  }}],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5125, "count": 3, "type": "SCALAR" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 12, "target": 34963 }}
  ],
  "buffers": [{{ "byteLength": {} }}]
}}"#,
        bin.len()
    );
    encode_glb(json, bin)
}

fn encode_glb(json: String, mut bin: Vec<u8>) -> Vec<u8> {
    let mut json = json.into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
