//! Hue cycling over every drawable's base colour.

use crate::data_structures::{model::Color, scene_graph::SceneGraph};

/// Length of one trip around the hue wheel.
pub const PULSE_PERIOD_MS: f64 = 6000.0;

const SATURATION: f32 = 0.5;
const LIGHTNESS: f32 = 0.5;

/// The pulse colour at wall-clock time `now_ms`.
pub fn pulse_color(now_ms: f64) -> Color {
    let hue = now_ms.rem_euclid(PULSE_PERIOD_MS) / PULSE_PERIOD_MS;
    Color::from_hsl(hue as f32, SATURATION, LIGHTNESS)
}

/// Give every drawable the same pulse colour for `now_ms`.
pub fn apply(graph: &mut SceneGraph, now_ms: f64) {
    set_all(graph, pulse_color(now_ms));
}

pub fn reset_colors(graph: &mut SceneGraph) {
    set_all(graph, Color::WHITE);
}

fn set_all(graph: &mut SceneGraph, color: Color) {
    for id in graph.drawables() {
        if let Some(drawable) = graph.drawable_mut(id) {
            drawable.material.color = color;
        }
    }
}

/// Milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
