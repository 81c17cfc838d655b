//! Asynchronous loading of the avatar and its images.
//!
//! A load is started once and reports back through a [`LoadSink`]: any number of
//! [`LoadEvent::Progress`] events followed by exactly one `Loaded` or `Failed`.
//! The winit event loop proxy is the sink in the app; tests use an mpsc channel.

use std::{future::Future, pin::Pin};

use futures::channel::mpsc::UnboundedSender;
use log::warn;

use crate::{data_structures::scene_graph::SceneGraph, resources::animation::AnimationClip};

pub mod animation;
pub mod gltf_scene;
pub mod mesh;
pub mod texture;

/// A detached loading job. Natively these run on the tokio runtime and must be
/// `Send`; in the browser they are spawned on the local executor.
#[cfg(not(target_arch = "wasm32"))]
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
#[cfg(target_arch = "wasm32")]
pub type Task = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Everything the viewer needs from a parsed asset.
#[derive(Debug)]
pub struct LoadedAsset {
    pub scene: SceneGraph,
    pub animations: Vec<AnimationClip>,
}

#[derive(Debug)]
pub enum LoadEvent {
    /// Fraction of the asset bytes received, in `0.0..=1.0`.
    Progress(f32),
    Loaded(Box<LoadedAsset>),
    Failed(anyhow::Error),
}

pub trait LoadSink {
    fn send(&self, event: LoadEvent);
}

impl LoadSink for UnboundedSender<LoadEvent> {
    fn send(&self, event: LoadEvent) {
        if self.unbounded_send(event).is_err() {
            warn!("Load event dropped: receiver is gone");
        }
    }
}

/// Delivers the events of one load. `finish` consumes the reporter, so a load
/// can complete at most once.
pub struct LoadReporter<S: LoadSink> {
    sink: S,
    last_percent: Option<u32>,
}

impl<S: LoadSink> LoadReporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last_percent: None,
        }
    }

    /// Report `loaded` of `total` bytes. Only whole-percent changes are sent.
    pub fn progress(&mut self, loaded: u64, total: Option<u64>) {
        let Some(total) = total.filter(|&t| t > 0) else {
            return;
        };
        let fraction = (loaded as f64 / total as f64).clamp(0.0, 1.0);
        let percent = (fraction * 100.0).floor() as u32;
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        self.sink.send(LoadEvent::Progress(fraction as f32));
    }

    pub fn finish(self, result: anyhow::Result<LoadedAsset>) {
        let event = match result {
            Ok(asset) => LoadEvent::Loaded(Box::new(asset)),
            Err(e) => LoadEvent::Failed(e),
        };
        self.sink.send(event);
    }
}

/// Fetch and parse `file_name` from `assets`, reporting through `reporter`.
pub async fn load_avatar<S: LoadSink>(
    assets: String,
    file_name: String,
    reporter: LoadReporter<S>,
) {
    let mut reporter = reporter;
    let result = async {
        let bytes = texture::load_binary(&assets, &file_name, |loaded, total| {
            reporter.progress(loaded, total)
        })
        .await?;
        gltf_scene::parse_gltf(&bytes, &assets).await
    }
    .await;
    reporter.finish(result);
}
