//! Secondary missiles
//!
//! Small missiles that skim along the ground from an impact point to a
//! destination cell, advancing a fixed fraction of their trip each frame.

use glam::Vec3;

use super::scene::{Visual, VisualId};
use super::{Channel, MotionContext, MotionEvent};
use crate::tuning::SecondaryMissileConfig;

#[derive(Debug, Clone)]
struct SecondaryMissile {
    visual: VisualId,
    start: Vec3,
    target: Vec3,
    progress: f32,
    /// Seconds
    duration: f32,
}

pub struct SecondaryMissileSystem {
    config: SecondaryMissileConfig,
    size: f32,
    missiles: Vec<SecondaryMissile>,
}

impl SecondaryMissileSystem {
    pub fn new(config: SecondaryMissileConfig, cell_size: f32) -> Self {
        let size = (cell_size * config.size_factor).round().max(config.min_size);
        Self {
            config,
            size,
            missiles: Vec::new(),
        }
    }

    pub fn active(&self) -> usize {
        self.missiles.len()
    }

    pub fn is_idle(&self) -> bool {
        self.missiles.is_empty()
    }

    /// Launch with the configured default trip duration
    pub fn launch_default(
        &mut self,
        start_x: f32,
        start_z: f32,
        target_x: f32,
        target_z: f32,
        ctx: &mut MotionContext,
    ) -> VisualId {
        let duration = self.config.default_duration;
        self.launch_missile(start_x, start_z, target_x, target_z, duration, ctx)
    }

    /// Launch a missile on the ground plane. A non-positive `duration`
    /// arrives on the next frame.
    pub fn launch_missile(
        &mut self,
        start_x: f32,
        start_z: f32,
        target_x: f32,
        target_z: f32,
        duration: f32,
        ctx: &mut MotionContext,
    ) -> VisualId {
        let start = Vec3::new(start_x, 0.0, start_z);
        let visual = ctx
            .scene
            .add(Visual::cube(self.size, &self.config.color).with_position(start));
        self.missiles.push(SecondaryMissile {
            visual,
            start,
            target: Vec3::new(target_x, 0.0, target_z),
            progress: 0.0,
            duration,
        });
        ctx.clock.add(Channel::SecondaryMissiles);
        visual
    }

    pub fn tick(&mut self, ctx: &mut MotionContext) {
        let dt = self.config.fixed_delta_time;

        self.missiles.retain_mut(|m| {
            m.progress = if m.duration > 0.0 { m.progress + dt / m.duration } else { 1.0 };
            let t = m.progress.min(1.0);
            ctx.scene.set_position(m.visual, m.start.lerp(m.target, t));

            if m.progress < 1.0 {
                return true;
            }

            // Report the exact destination, not the interpolated point
            ctx.events.push(MotionEvent::MissileArrival {
                x: m.target.x,
                z: m.target.z,
            });
            ctx.scene.remove(m.visual);
            false
        });

        if self.missiles.is_empty() {
            ctx.clock.remove(Channel::SecondaryMissiles);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::Scene;
    use crate::sim::testing::Harness;

    fn system() -> SecondaryMissileSystem {
        SecondaryMissileSystem::new(SecondaryMissileConfig::default(), 40.0)
    }

    #[test]
    fn test_size_and_color() {
        let mut h = Harness::new(41);
        let mut secondaries = system();
        let visual = secondaries.launch_default(0.0, 0.0, 80.0, 40.0, &mut h.ctx());
        let v = h.scene.visual(visual).unwrap();
        assert_eq!(v.color, "#ff6b6b");
        assert!(matches!(v.kind, crate::sim::VisualKind::Cube { size } if size == 8.0));
        assert_eq!(v.pose.position.y, 0.0);
    }

    #[test]
    fn test_halfway_and_arrival() {
        let mut h = Harness::new(42);
        let mut secondaries = system();
        let visual = secondaries.launch_default(0.0, 0.0, 120.0, -60.0, &mut h.ctx());

        for _ in 0..15 {
            secondaries.tick(&mut h.ctx());
        }
        let mid = h.scene.pose(visual).unwrap().position;
        assert!((mid.x - 60.0).abs() < 1e-2);
        assert!((mid.z + 30.0).abs() < 1e-2);
        assert_eq!(mid.y, 0.0);

        for _ in 0..13 {
            secondaries.tick(&mut h.ctx());
        }
        assert!(h.events.is_empty());

        for _ in 0..3 {
            secondaries.tick(&mut h.ctx());
        }
        assert_eq!(h.events, vec![MotionEvent::MissileArrival { x: 120.0, z: -60.0 }]);
        assert!(!h.scene.contains(visual));
        assert!(!h.clock.contains(Channel::SecondaryMissiles));
    }

    #[test]
    fn test_zero_duration_arrives_next_frame() {
        let mut h = Harness::new(43);
        let mut secondaries = system();
        secondaries.launch_missile(5.0, 5.0, 45.0, 5.0, 0.0, &mut h.ctx());
        secondaries.tick(&mut h.ctx());
        assert_eq!(h.events, vec![MotionEvent::MissileArrival { x: 45.0, z: 5.0 }]);
        assert!(secondaries.is_idle());
    }

    #[test]
    fn test_independent_durations() {
        let mut h = Harness::new(44);
        let mut secondaries = system();
        secondaries.launch_missile(0.0, 0.0, 40.0, 0.0, 0.1, &mut h.ctx());
        secondaries.launch_missile(0.0, 0.0, -40.0, 0.0, 1.0, &mut h.ctx());
        for _ in 0..10 {
            secondaries.tick(&mut h.ctx());
        }
        assert_eq!(h.events.len(), 1);
        assert_eq!(secondaries.active(), 1);
    }
}
