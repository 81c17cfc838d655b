//! Scene graph and hierarchical scene organization.
//!
//! Nodes live in a flat arena and refer to each other through [`NodeId`]s. The
//! graph always has a synthetic root group; loaded glTF scene nodes hang below
//! it, so moving or rotating the root moves the whole avatar.

use cgmath::{Matrix4, SquareMatrix};
use log::warn;

use crate::data_structures::{bounds::Aabb, model::Drawable, transform::Transform};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    /// Cached world matrix; valid after [`SceneGraph::update_world_transforms`].
    pub world: Matrix4<f32>,
    pub drawable: Option<Drawable>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: &str, transform: Transform, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            transform,
            world: Matrix4::identity(),
            drawable: None,
            parent,
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode::new("Scene", Transform::new(), None)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn add_node(&mut self, parent: NodeId, name: &str, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::new(name, transform, Some(parent)));
        match self.nodes.get_mut(parent.0) {
            Some(parent) => parent.children.push(id),
            None => {
                warn!("Parent {:?} does not exist, attaching {} to the root", parent, name);
                self.nodes[id.0].parent = Some(self.root);
                self.nodes[self.root.0].children.push(id);
            }
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    /// Ids of every node below and including the root, parents before children,
    /// siblings in insertion order.
    pub fn traverse(&self) -> Vec<NodeId> {
        self.descendants(self.root)
    }

    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// First node in traversal order carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .into_iter()
            .find(|id| self.nodes[id.0].name == name)
    }

    /// Nodes that carry a drawable, in traversal order.
    pub fn drawables(&self) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|id| self.nodes[id.0].drawable.is_some())
            .collect()
    }

    pub fn drawable(&self, id: NodeId) -> Option<&Drawable> {
        self.get(id).and_then(|node| node.drawable.as_ref())
    }

    pub fn drawable_mut(&mut self, id: NodeId) -> Option<&mut Drawable> {
        self.get_mut(id).and_then(|node| node.drawable.as_mut())
    }

    /// Recompute every cached world matrix from the local transforms.
    pub fn update_world_transforms(&mut self) {
        for id in self.traverse() {
            let parent_world = self.nodes[id.0]
                .parent
                .and_then(|parent| self.nodes.get(parent.0))
                .map(|parent| parent.world)
                .unwrap_or_else(Matrix4::identity);
            let node = &mut self.nodes[id.0];
            node.world = parent_world * node.transform.to_matrix();
        }
    }

    /// World-space bounds over all drawables, from their local mesh bounds and
    /// the cached world matrices. `None` when nothing has geometry.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.drawables()
            .into_iter()
            .filter_map(|id| {
                let node = &self.nodes[id.0];
                let bounds = node.drawable.as_ref()?.mesh.bounds?;
                Some(bounds.transform(&node.world))
            })
            .reduce(|acc, aabb| acc.union(&aabb))
    }

    /// Joint palette for the skin of drawable `id`: `world(joint) * inverse_bind`.
    /// Empty if the drawable is not skinned.
    pub fn joint_matrices(&self, id: NodeId) -> Vec<Matrix4<f32>> {
        let Some(skin) = self.drawable(id).and_then(|d| d.skin.as_ref()) else {
            return Vec::new();
        };
        skin.joints
            .iter()
            .enumerate()
            .map(|(i, joint)| {
                let world = self
                    .get(*joint)
                    .map(|node| node.world)
                    .unwrap_or_else(Matrix4::identity);
                let inverse_bind = skin
                    .inverse_bind_matrices
                    .get(i)
                    .copied()
                    .unwrap_or_else(Matrix4::identity);
                world * inverse_bind
            })
            .collect()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
