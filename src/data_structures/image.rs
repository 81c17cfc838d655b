//! Shared, lazily-filled image handles.
//!
//! A handle is created before its bytes arrive. Every material that receives a
//! clone observes the same slot, so filling it once makes the pixels visible
//! everywhere it has been assigned.

use std::{
    fmt,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
};

use image::RgbaImage;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct Slot {
    id: u64,
    label: String,
    image: OnceLock<Arc<RgbaImage>>,
}

#[derive(Clone)]
pub struct ImageHandle(Arc<Slot>);

impl ImageHandle {
    /// A handle whose pixels are not loaded yet.
    pub fn pending(label: &str) -> Self {
        Self(Arc::new(Slot {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            label: label.to_string(),
            image: OnceLock::new(),
        }))
    }

    pub fn ready(label: &str, image: RgbaImage) -> Self {
        let handle = Self::pending(label);
        handle.fill(image);
        handle
    }

    /// Store the decoded pixels. Returns `false` if the handle was already filled,
    /// in which case the first image is kept.
    pub fn fill(&self, image: RgbaImage) -> bool {
        self.0.image.set(Arc::new(image)).is_ok()
    }

    pub fn get(&self) -> Option<&Arc<RgbaImage>> {
        self.0.image.get()
    }

    pub fn is_ready(&self) -> bool {
        self.0.image.get().is_some()
    }

    /// Process-unique identity of the slot; equal for all clones.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ImageHandle {}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("id", &self.0.id)
            .field("label", &self.0.label)
            .field("ready", &self.is_ready())
            .finish()
    }
}
