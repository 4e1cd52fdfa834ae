//! Browser scene and frame source

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use glam::Vec3;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

use super::{css_transform, element_extent};
use crate::sim::{FrameHandle, FrameSource, Pose, Scene, Visual, VisualId, VisualKind};

struct DomVisual {
    element: HtmlElement,
    visual: Visual,
}

/// Scene whose visuals are `div`s under a root element with
/// `transform-style: preserve-3d`
pub struct DomScene {
    document: Document,
    root: Element,
    visuals: BTreeMap<VisualId, DomVisual>,
    next_id: u32,
}

impl DomScene {
    pub fn new(document: Document, root: Element) -> Self {
        Self {
            document,
            root,
            visuals: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn create_element(&self, visual: &Visual) -> Option<HtmlElement> {
        let element: HtmlElement = self.document.create_element("div").ok()?.dyn_into().ok()?;
        let class = match visual.kind {
            VisualKind::Cube { .. } => "cb-cube",
            VisualKind::Ring { .. } => "cb-ring",
        };
        element.class_list().add_1(class).ok()?;

        let extent = format!("{}px", element_extent(visual));
        let style = element.style();
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("width", &extent);
        let _ = style.set_property("height", &extent);
        match visual.kind {
            VisualKind::Cube { .. } => {
                let _ = style.set_property("background-color", &visual.color);
            }
            VisualKind::Ring { .. } => {
                let _ = style.set_property("border", &format!("2px solid {}", visual.color));
                let _ = style.set_property("border-radius", "50%");
            }
        }
        Some(element)
    }

    fn sync(entry: &DomVisual) {
        let style = entry.element.style();
        let _ = style.set_property("transform", &css_transform(&entry.visual));
        let _ = style.set_property("opacity", &format!("{:.3}", entry.visual.opacity));
    }

    fn update(&mut self, id: VisualId, f: impl FnOnce(&mut Visual)) {
        if let Some(entry) = self.visuals.get_mut(&id) {
            f(&mut entry.visual);
            Self::sync(entry);
        }
    }
}

impl Scene for DomScene {
    fn add(&mut self, visual: Visual) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;

        match self.create_element(&visual) {
            Some(element) => {
                let _ = self.root.append_child(&element);
                let entry = DomVisual { element, visual };
                Self::sync(&entry);
                self.visuals.insert(id, entry);
            }
            None => log::warn!("Failed to create element for {:?}", id),
        }
        id
    }

    fn remove(&mut self, id: VisualId) {
        if let Some(entry) = self.visuals.remove(&id) {
            entry.element.remove();
        }
    }

    fn contains(&self, id: VisualId) -> bool {
        self.visuals.contains_key(&id)
    }

    fn pose(&self, id: VisualId) -> Option<Pose> {
        self.visuals.get(&id).map(|e| e.visual.pose)
    }

    fn opacity(&self, id: VisualId) -> Option<f32> {
        self.visuals.get(&id).map(|e| e.visual.opacity)
    }

    fn set_position(&mut self, id: VisualId, position: Vec3) {
        self.update(id, |v| v.pose.position = position);
    }

    fn set_rotation(&mut self, id: VisualId, rotation: Vec3) {
        self.update(id, |v| v.pose.rotation = rotation);
    }

    fn set_color(&mut self, id: VisualId, color: &str) {
        if let Some(entry) = self.visuals.get_mut(&id) {
            entry.visual.color = color.to_string();
            let _ = entry.element.style().set_property("background-color", color);
        }
    }

    fn set_opacity(&mut self, id: VisualId, opacity: f32) {
        self.update(id, |v| v.opacity = opacity);
    }

    fn set_scale(&mut self, id: VisualId, scale: f32) {
        self.update(id, |v| v.scale = scale);
    }

    fn len(&self) -> usize {
        self.visuals.len()
    }

    fn set_pose(&mut self, id: VisualId, pose: Pose) {
        self.update(id, |v| v.pose = pose);
    }
}

/// Frame callback installed once the game exists
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame`-backed frame source.
///
/// Every request reuses the callback stored in the shared slot.
pub struct RafFrameSource {
    callback: FrameCallback,
}

impl RafFrameSource {
    pub fn new(callback: FrameCallback) -> Self {
        Self { callback }
    }
}

impl FrameSource for RafFrameSource {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let Some(window) = web_sys::window() else {
            log::warn!("requestAnimationFrame: no window");
            return None;
        };
        let slot = self.callback.borrow();
        let Some(callback) = slot.as_ref() else {
            log::warn!("requestAnimationFrame: frame callback not installed");
            return None;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0);
        }
    }
}
