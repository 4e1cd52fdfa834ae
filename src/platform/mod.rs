//! Platform abstraction layer
//!
//! Browser bindings for the two host collaborators of the motion core:
//! - [`Scene`](crate::sim::Scene) backed by absolutely positioned DOM elements
//! - [`FrameSource`](crate::sim::FrameSource) backed by `requestAnimationFrame`
//!
//! Native builds use [`MemoryScene`](crate::sim::MemoryScene) and
//! [`ManualFrameSource`](crate::sim::ManualFrameSource) instead.

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec3;

use crate::sim::{Visual, VisualKind};

/// Edge length of the element box for a visual (px)
pub fn element_extent(visual: &Visual) -> f32 {
    match visual.kind {
        VisualKind::Cube { size } => size,
        VisualKind::Ring { diameter } => diameter,
    }
}

/// CSS transform placing a visual's center at its pose.
///
/// Rotation is applied X, then Y, then Z, in degrees.
pub fn css_transform(visual: &Visual) -> String {
    let half = element_extent(visual) / 2.0;
    let Vec3 { x, y, z } = visual.pose.position;
    let r = visual.pose.rotation;
    format!(
        "translate3d({:.2}px, {:.2}px, {:.2}px) rotateX({:.2}deg) rotateY({:.2}deg) rotateZ({:.2}deg) scale({:.3})",
        x - half,
        y - half,
        z,
        r.x,
        r.y,
        r.z,
        visual.scale
    )
}
