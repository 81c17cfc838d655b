//! The animation driver: a named library of looping actions over the scene.
//!
//! Four clips are synthesised for every avatar (idle breathing, hover, wobble
//! and, if a right arm or hand can be found, a wave). Clips embedded in the
//! asset are added afterwards and replace synthetic ones of the same name.
//! At most one action plays at a time.

use std::{collections::HashMap, f32::consts::FRAC_PI_4};

use cgmath::{Euler, Quaternion, Rad, Vector3};
use log::{debug, info, warn};

use crate::{
    data_structures::scene_graph::{NodeId, SceneGraph},
    resources::animation::{AnimationClip, KeyframeTrack, Keyframes, RestValue},
};

pub const IDLE: &str = "idle";
pub const HOVER: &str = "hover";
pub const WOBBLE: &str = "wobble";
pub const WAVE: &str = "wave";

const SYNTHETIC_DURATION: f32 = 2.0;

fn z_turn(angle: f32) -> Quaternion<f32> {
    Euler::new(Rad(0.0), Rad(0.0), Rad(angle)).into()
}

/// Subtle breathing: the model scales up by 2% and back over two seconds.
pub fn idle_clip(model: NodeId) -> AnimationClip {
    let rest = Vector3::new(1.0, 1.0, 1.0);
    let track = KeyframeTrack::new(
        model,
        vec![0.0, 1.0, 2.0],
        Keyframes::Scale(vec![rest, Vector3::new(1.02, 1.02, 1.02), rest]),
    );
    AnimationClip::with_duration(IDLE, SYNTHETIC_DURATION, vec![track])
}

/// The model rises by 0.1 and settles again.
pub fn hover_clip(model: NodeId) -> AnimationClip {
    let track = KeyframeTrack::new(
        model,
        vec![0.0, 1.0, 2.0],
        Keyframes::TranslationY(vec![0.0, 0.1, 0.0]),
    );
    AnimationClip::with_duration(HOVER, SYNTHETIC_DURATION, vec![track])
}

pub fn wobble_clip(model: NodeId) -> AnimationClip {
    let track = KeyframeTrack::new(
        model,
        vec![0.0, 0.5, 1.0, 1.5, 2.0],
        Keyframes::Rotation(vec![
            z_turn(0.05),
            z_turn(-0.05),
            z_turn(0.05),
            z_turn(-0.05),
            z_turn(0.0),
        ]),
    );
    AnimationClip::with_duration(WOBBLE, SYNTHETIC_DURATION, vec![track])
}

/// Swings `arm` a quarter turn either way around its local z axis.
pub fn wave_clip(arm: NodeId) -> AnimationClip {
    let track = KeyframeTrack::new(
        arm,
        vec![0.0, 0.5, 1.0, 1.5, 2.0],
        Keyframes::Rotation(vec![
            z_turn(0.0),
            z_turn(FRAC_PI_4),
            z_turn(0.0),
            z_turn(-FRAC_PI_4),
            z_turn(0.0),
        ]),
    );
    AnimationClip::with_duration(WAVE, SYNTHETIC_DURATION, vec![track])
}

/// The last node in traversal order whose lower-cased name mentions "right"
/// together with "arm" or "hand".
pub fn find_wave_target(graph: &SceneGraph) -> Option<NodeId> {
    graph
        .traverse()
        .into_iter()
        .rev()
        .find(|id| {
            graph.get(*id).is_some_and(|node| {
                let name = node.name.to_lowercase();
                (name.contains("arm") || name.contains("hand")) && name.contains("right")
            })
        })
}

/// A clip bound to the scene with its own playback clock.
#[derive(Debug)]
pub struct AnimationAction {
    clip: AnimationClip,
    time: f32,
    playing: bool,
    /// Values found on the driven properties when the action started.
    rest: Vec<RestValue>,
}

impl AnimationAction {
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            playing: false,
            rest: Vec::new(),
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self, graph: &SceneGraph) {
        if self.playing {
            return;
        }
        self.rest = self
            .clip
            .tracks
            .iter()
            .map(|track| track.capture(graph))
            .collect();
        self.time = 0.0;
        self.playing = true;
    }

    /// Halt playback, rewind and put the driven properties back.
    fn stop(&mut self, graph: &mut SceneGraph) {
        if !self.playing {
            return;
        }
        // reverse order so the first capture of a shared property wins
        for (track, rest) in self.clip.tracks.iter().zip(&self.rest).rev() {
            track.restore(graph, *rest);
        }
        self.rest.clear();
        self.time = 0.0;
        self.playing = false;
    }

    fn advance(&mut self, graph: &mut SceneGraph, dt: f32) {
        if !self.playing {
            return;
        }
        self.time += dt;
        if self.clip.duration > 0.0 {
            self.time = self.time.rem_euclid(self.clip.duration);
        }
        self.clip.apply(graph, self.time);
    }
}

#[derive(Debug, Default)]
pub struct AnimationDriver {
    actions: HashMap<String, AnimationAction>,
    current: Option<String>,
}

impl AnimationDriver {
    /// Build the action library for `graph`. The synthetic clips drive the
    /// graph root, which carries the whole avatar.
    pub fn new(graph: &SceneGraph, embedded: Vec<AnimationClip>) -> Self {
        let model = graph.root();
        let mut actions = HashMap::new();
        for clip in [idle_clip(model), hover_clip(model), wobble_clip(model)] {
            actions.insert(clip.name.clone(), AnimationAction::new(clip));
        }

        match find_wave_target(graph) {
            Some(arm) => {
                if let Some(node) = graph.get(arm) {
                    debug!("Wave animation drives {}", node.name);
                }
                actions.insert(WAVE.to_string(), AnimationAction::new(wave_clip(arm)));
            }
            None => warn!("Couldn't find right arm or hand for wave animation"),
        }

        for clip in embedded {
            info!("Loaded animation: {} ({:.2}s)", clip.name, clip.duration);
            actions.insert(clip.name.clone(), AnimationAction::new(clip));
        }

        let driver = Self {
            actions,
            current: None,
        };
        debug!("Animations set up: {:?}", driver.names());
        driver
    }

    /// Stop whatever is playing, then start `name`. An unknown name leaves
    /// nothing playing. Returns whether `name` was started.
    pub fn play(&mut self, graph: &mut SceneGraph, name: &str) -> bool {
        self.stop(graph);
        match self.actions.get_mut(name) {
            Some(action) => {
                action.play(graph);
                self.current = Some(name.to_string());
                true
            }
            None => {
                warn!("Animation {} not found or not playable", name);
                false
            }
        }
    }

    pub fn stop(&mut self, graph: &mut SceneGraph) {
        if let Some(action) = self
            .current
            .take()
            .and_then(|name| self.actions.get_mut(&name))
        {
            action.stop(graph);
        }
    }

    /// Advance the playing action by `dt` seconds, looping at the clip end.
    pub fn update(&mut self, graph: &mut SceneGraph, dt: f32) {
        for action in self.actions.values_mut() {
            action.advance(graph, dt);
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn has(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.actions.get(name)
    }

    /// Action names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.actions.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}
