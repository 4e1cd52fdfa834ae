//! Scene capability used by the motion systems
//!
//! The motion core never walks the scene graph. It inserts visuals, removes
//! them, and pushes pose/opacity updates through this narrow trait. The DOM
//! implementation lives in `platform`; `MemoryScene` backs native runs and
//! tests.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Handle to a visual owned by a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualId(pub u32);

/// Shape of a visual
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VisualKind {
    /// Six-faced cube with the given edge length
    Cube { size: f32 },
    /// Flat ring lying in its local XY plane
    Ring { diameter: f32 },
}

/// Position plus Euler rotation (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
        }
    }
}

/// Everything a scene needs to materialize a visual
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub kind: VisualKind,
    pub color: String,
    pub pose: Pose,
    pub opacity: f32,
    pub scale: f32,
}

impl Visual {
    pub fn cube(size: f32, color: &str) -> Self {
        Self {
            kind: VisualKind::Cube { size },
            color: color.to_string(),
            pose: Pose::default(),
            opacity: 1.0,
            scale: 1.0,
        }
    }

    pub fn ring(diameter: f32) -> Self {
        Self {
            kind: VisualKind::Ring { diameter },
            color: String::new(),
            pose: Pose::default(),
            opacity: 1.0,
            scale: 1.0,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.pose.rotation = rotation;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Shared visual container
///
/// Setters on unknown ids are ignored. `remove` is idempotent.
pub trait Scene {
    /// Insert a visual and return its handle
    fn add(&mut self, visual: Visual) -> VisualId;
    /// Remove a visual (no-op if already gone)
    fn remove(&mut self, id: VisualId);
    fn contains(&self, id: VisualId) -> bool;
    fn pose(&self, id: VisualId) -> Option<Pose>;
    fn opacity(&self, id: VisualId) -> Option<f32>;
    fn set_position(&mut self, id: VisualId, position: Vec3);
    fn set_rotation(&mut self, id: VisualId, rotation: Vec3);
    fn set_color(&mut self, id: VisualId, color: &str);
    fn set_opacity(&mut self, id: VisualId, opacity: f32);
    fn set_scale(&mut self, id: VisualId, scale: f32);
    /// Number of visuals currently in the scene
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_pose(&mut self, id: VisualId, pose: Pose) {
        self.set_position(id, pose.position);
        self.set_rotation(id, pose.rotation);
    }
}

/// In-memory scene
#[derive(Debug, Default)]
pub struct MemoryScene {
    visuals: BTreeMap<VisualId, Visual>,
    next_id: u32,
    /// Every id that was actually removed, in order
    removed: Vec<VisualId>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visual(&self, id: VisualId) -> Option<&Visual> {
        self.visuals.get(&id)
    }

    /// How many times `id` left the scene
    pub fn removal_count(&self, id: VisualId) -> usize {
        self.removed.iter().filter(|&&r| r == id).count()
    }

    pub fn ids(&self) -> impl Iterator<Item = VisualId> + '_ {
        self.visuals.keys().copied()
    }
}

impl Scene for MemoryScene {
    fn add(&mut self, visual: Visual) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        self.visuals.insert(id, visual);
        id
    }

    fn remove(&mut self, id: VisualId) {
        if self.visuals.remove(&id).is_some() {
            self.removed.push(id);
        }
    }

    fn contains(&self, id: VisualId) -> bool {
        self.visuals.contains_key(&id)
    }

    fn pose(&self, id: VisualId) -> Option<Pose> {
        self.visuals.get(&id).map(|v| v.pose)
    }

    fn opacity(&self, id: VisualId) -> Option<f32> {
        self.visuals.get(&id).map(|v| v.opacity)
    }

    fn set_position(&mut self, id: VisualId, position: Vec3) {
        if let Some(v) = self.visuals.get_mut(&id) {
            v.pose.position = position;
        }
    }

    fn set_rotation(&mut self, id: VisualId, rotation: Vec3) {
        if let Some(v) = self.visuals.get_mut(&id) {
            v.pose.rotation = rotation;
        }
    }

    fn set_color(&mut self, id: VisualId, color: &str) {
        if let Some(v) = self.visuals.get_mut(&id) {
            v.color = color.to_string();
        }
    }

    fn set_opacity(&mut self, id: VisualId, opacity: f32) {
        if let Some(v) = self.visuals.get_mut(&id) {
            v.opacity = opacity;
        }
    }

    fn set_scale(&mut self, id: VisualId, scale: f32) {
        if let Some(v) = self.visuals.get_mut(&id) {
            v.scale = scale;
        }
    }

    fn len(&self) -> usize {
        self.visuals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_is_idempotent() {
        let mut scene = MemoryScene::new();
        let id = scene.add(Visual::cube(10.0, "#fff"));
        assert!(scene.contains(id));
        scene.remove(id);
        scene.remove(id);
        assert!(!scene.contains(id));
        assert_eq!(scene.removal_count(id), 1);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_setters_ignore_unknown_ids() {
        let mut scene = MemoryScene::new();
        scene.set_position(VisualId(42), Vec3::ONE);
        assert_eq!(scene.pose(VisualId(42)), None);

        let id = scene.add(Visual::cube(10.0, "#fff").with_position(Vec3::new(1.0, 2.0, 3.0)));
        scene.set_pose(
            id,
            Pose {
                position: Vec3::X,
                rotation: Vec3::Y * 90.0,
            },
        );
        let pose = scene.pose(id).unwrap();
        assert_eq!(pose.position, Vec3::X);
        assert_eq!(pose.rotation, Vec3::new(0.0, 90.0, 0.0));
    }
}
