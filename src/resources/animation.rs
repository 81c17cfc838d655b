//! Keyframe clips and their sampling.
//!
//! A clip is a set of tracks, each driving one property of one scene node.
//! Values are absolute: sampling a track overwrites the node property.

use cgmath::{InnerSpace, Quaternion, Vector3, VectorSpace};

use crate::data_structures::scene_graph::{NodeId, SceneGraph};

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<Vector3<f32>>),
    /// Only the vertical component of the position.
    TranslationY(Vec<f32>),
    Rotation(Vec<Quaternion<f32>>),
    Scale(Vec<Vector3<f32>>),
    Other,
}

impl Keyframes {
    fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) => v.len(),
            Keyframes::TranslationY(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
            Keyframes::Scale(v) => v.len(),
            Keyframes::Other => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
}

/// The value a track found on its node before it started writing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RestValue {
    Position(Vector3<f32>),
    PositionY(f32),
    Rotation(Quaternion<f32>),
    Scale(Vector3<f32>),
    None,
}

#[derive(Clone, Debug)]
pub struct KeyframeTrack {
    pub target: NodeId,
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
    pub interpolation: Interpolation,
}

/// Position of `t` within `timestamps`: the key before it and the blend factor
/// towards the next key. Clamps outside the keyed range.
fn locate(timestamps: &[f32], t: f32, interpolation: Interpolation) -> (usize, usize, f32) {
    let last = timestamps.len() - 1;
    if t <= timestamps[0] {
        return (0, 0, 0.0);
    }
    if t >= timestamps[last] {
        return (last, last, 0.0);
    }
    let next = timestamps.partition_point(|&ts| ts <= t);
    let prev = next - 1;
    let span = timestamps[next] - timestamps[prev];
    let alpha = if span > 0.0 {
        (t - timestamps[prev]) / span
    } else {
        0.0
    };
    match interpolation {
        Interpolation::Linear => (prev, next, alpha),
        Interpolation::Step => (prev, prev, 0.0),
    }
}

fn slerp(a: Quaternion<f32>, b: Quaternion<f32>, alpha: f32) -> Quaternion<f32> {
    // take the short way round
    let b = if a.dot(b) < 0.0 { -b } else { b };
    a.slerp(b, alpha).normalize()
}

impl KeyframeTrack {
    pub fn new(target: NodeId, timestamps: Vec<f32>, keyframes: Keyframes) -> Self {
        Self {
            target,
            timestamps,
            keyframes,
            interpolation: Interpolation::Linear,
        }
    }

    pub fn duration(&self) -> f32 {
        self.timestamps.last().copied().unwrap_or(0.0)
    }

    fn is_empty(&self) -> bool {
        self.timestamps.is_empty() || self.keyframes.len() < self.timestamps.len()
    }

    /// Write the value at time `t` onto the target node.
    pub fn apply(&self, graph: &mut SceneGraph, t: f32) {
        if self.is_empty() {
            return;
        }
        let Some(node) = graph.get_mut(self.target) else {
            return;
        };
        let (a, b, alpha) = locate(&self.timestamps, t, self.interpolation);
        let transform = &mut node.transform;
        match &self.keyframes {
            Keyframes::Translation(values) => {
                transform.position = values[a].lerp(values[b], alpha);
            }
            Keyframes::TranslationY(values) => {
                transform.position.y = values[a] + (values[b] - values[a]) * alpha;
            }
            Keyframes::Rotation(values) => {
                transform.set_rotation(slerp(values[a], values[b], alpha));
            }
            Keyframes::Scale(values) => {
                transform.scale = values[a].lerp(values[b], alpha);
            }
            Keyframes::Other => {}
        }
    }

    pub fn capture(&self, graph: &SceneGraph) -> RestValue {
        let Some(node) = graph.get(self.target) else {
            return RestValue::None;
        };
        let transform = &node.transform;
        match self.keyframes {
            Keyframes::Translation(_) => RestValue::Position(transform.position),
            Keyframes::TranslationY(_) => RestValue::PositionY(transform.position.y),
            Keyframes::Rotation(_) => RestValue::Rotation(transform.rotation()),
            Keyframes::Scale(_) => RestValue::Scale(transform.scale),
            Keyframes::Other => RestValue::None,
        }
    }

    pub fn restore(&self, graph: &mut SceneGraph, rest: RestValue) {
        let Some(node) = graph.get_mut(self.target) else {
            return;
        };
        let transform = &mut node.transform;
        match rest {
            RestValue::Position(position) => transform.position = position,
            RestValue::PositionY(y) => transform.position.y = y,
            RestValue::Rotation(rotation) => transform.set_rotation(rotation),
            RestValue::Scale(scale) => transform.scale = scale,
            RestValue::None => {}
        }
    }
}

/// An animation clip: a named set of tracks and its length in seconds.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    /// Clip whose duration is the last keyframe time over all tracks.
    pub fn new(name: &str, tracks: Vec<KeyframeTrack>) -> Self {
        let duration = tracks
            .iter()
            .map(KeyframeTrack::duration)
            .fold(0.0, f32::max);
        Self::with_duration(name, duration, tracks)
    }

    pub fn with_duration(name: &str, duration: f32, tracks: Vec<KeyframeTrack>) -> Self {
        Self {
            name: name.to_string(),
            duration,
            tracks,
        }
    }

    pub fn apply(&self, graph: &mut SceneGraph, t: f32) {
        for track in &self.tracks {
            track.apply(graph, t);
        }
    }
}
