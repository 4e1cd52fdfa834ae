//! Drop missiles
//!
//! Missiles released high above a point on the grid fall straight down under
//! constant gravity. Integration uses a fixed step per frame, so flight time
//! is measured in frames rather than wall-clock time.

use glam::Vec3;

use super::explosion::ExplosionSystem;
use super::scene::{Visual, VisualId};
use super::{Channel, MotionContext, MotionEvent};
use crate::tuning::{BurstConfig, DropMissileConfig, Tuning};

#[derive(Debug, Clone)]
struct DropMissile {
    visual: VisualId,
    x: f32,
    z: f32,
    y: f32,
    velocity: f32,
}

pub struct DropMissileSystem {
    config: DropMissileConfig,
    burst: BurstConfig,
    color: String,
    size: f32,
    start_y: f32,
    ground_y: f32,
    missiles: Vec<DropMissile>,
}

impl DropMissileSystem {
    pub fn new(tuning: &Tuning) -> Self {
        let config = tuning.drop_missile;
        Self {
            config,
            burst: tuning.burst_for(&tuning.missile),
            color: tuning.missile.color.clone(),
            size: tuning.projectile_size(),
            start_y: -(tuning.grid.cell_size * config.start_height_multiplier),
            ground_y: tuning.grid.ground_y,
            missiles: Vec::new(),
        }
    }

    pub fn active(&self) -> usize {
        self.missiles.len()
    }

    pub fn is_idle(&self) -> bool {
        self.missiles.is_empty()
    }

    /// Release a missile above world point (`x`, `z`)
    pub fn drop_missile(&mut self, x: f32, z: f32, ctx: &mut MotionContext) -> VisualId {
        let visual = ctx
            .scene
            .add(Visual::cube(self.size, &self.color).with_position(Vec3::new(x, self.start_y, z)));
        self.missiles.push(DropMissile {
            visual,
            x,
            z,
            y: self.start_y,
            velocity: 0.0,
        });
        log::debug!("Drop missile released over ({:.1}, {:.1})", x, z);
        ctx.clock.add(Channel::DropMissiles);
        visual
    }

    /// One fixed step for every falling missile. `time_ms` only stamps the
    /// explosions spawned on landing.
    pub fn tick(
        &mut self,
        time_ms: f64,
        explosions: &mut ExplosionSystem,
        ctx: &mut MotionContext,
    ) {
        let dt = self.config.fixed_delta_time;
        let gravity = self.config.gravity;
        let ground_y = self.ground_y;
        let burst = &self.burst;

        self.missiles.retain_mut(|m| {
            m.velocity += gravity * dt;
            m.y += m.velocity * dt;
            ctx.scene.set_position(m.visual, Vec3::new(m.x, m.y, m.z));

            if m.y < ground_y {
                return true;
            }

            explosions.spawn_explosion(Vec3::new(m.x, ground_y, m.z), burst, time_ms, ctx);
            ctx.events.push(MotionEvent::MissileHit { x: m.x, z: m.z });
            ctx.scene.remove(m.visual);
            false
        });

        if self.missiles.is_empty() {
            ctx.clock.remove(Channel::DropMissiles);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::Scene;
    use crate::sim::testing::Harness;
    use crate::tuning::{ExplosionConfig, ParticlePhysics};

    fn rig() -> (DropMissileSystem, ExplosionSystem) {
        (
            DropMissileSystem::new(&Tuning::standard()),
            ExplosionSystem::new(ExplosionConfig::default(), ParticlePhysics::default(), 40.0, 0.0),
        )
    }

    #[test]
    fn test_starts_high_above_point() {
        let mut h = Harness::new(31);
        let (mut drops, _) = rig();
        let visual = drops.drop_missile(10.0, 20.0, &mut h.ctx());
        assert_eq!(h.scene.pose(visual).unwrap().position, Vec3::new(10.0, -600.0, 20.0));
        assert!(h.clock.contains(Channel::DropMissiles));
    }

    #[test]
    fn test_hits_ground_on_frame_sixty() {
        let mut h = Harness::new(32);
        let (mut drops, mut explosions) = rig();
        let visual = drops.drop_missile(10.0, 20.0, &mut h.ctx());

        for frame in 1..60 {
            drops.tick(frame as f64 * 16.0, &mut explosions, &mut h.ctx());
            assert!(h.events.is_empty(), "early hit on frame {frame}");
        }
        // After 59 steps the missile is ten pixels above the ground
        assert!((h.scene.pose(visual).unwrap().position.y + 10.0).abs() < 0.5);

        drops.tick(960.0, &mut explosions, &mut h.ctx());
        assert_eq!(h.events, vec![MotionEvent::MissileHit { x: 10.0, z: 20.0 }]);
        assert!(!h.scene.contains(visual));
        assert!(drops.is_idle());
        assert_eq!(explosions.bursts_spawned(), 1);
        assert!(!h.clock.contains(Channel::DropMissiles));

        drops.tick(976.0, &mut explosions, &mut h.ctx());
        assert_eq!(h.events.len(), 1);
    }

    #[test]
    fn test_explosion_lands_on_ground() {
        let mut h = Harness::new(33);
        let (mut drops, mut explosions) = rig();
        drops.drop_missile(-40.0, 80.0, &mut h.ctx());
        for frame in 1..=60 {
            drops.tick(frame as f64 * 16.0, &mut explosions, &mut h.ctx());
        }
        for p in explosions.active_particles() {
            assert_eq!(p.position, Vec3::new(-40.0, 0.0, 80.0));
        }
        assert_eq!(explosions.active_particles().len(), 14);
    }

    #[test]
    fn test_concurrent_drops_land_together() {
        let mut h = Harness::new(34);
        let (mut drops, mut explosions) = rig();
        drops.drop_missile(0.0, 0.0, &mut h.ctx());
        drops.drop_missile(40.0, 0.0, &mut h.ctx());
        for frame in 1..=60 {
            drops.tick(frame as f64 * 16.0, &mut explosions, &mut h.ctx());
        }
        assert_eq!(h.events.len(), 2);
        assert_eq!(explosions.bursts_spawned(), 2);
    }
}
