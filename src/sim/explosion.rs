//! Explosion emitter
//!
//! Spawns a burst of tumbling debris cubes plus a ground shockwave ring at an
//! impact point, then integrates them every frame until they expire.

use glam::Vec3;
use rand::Rng;

use super::particle::{ParticleMotion, ParticleStep};
use super::scene::{Visual, VisualId};
use super::{Channel, MotionContext};
use crate::consts::DEFAULT_PARTICLE_COLORS;
use crate::tuning::{BurstConfig, ExplosionConfig, ParticlePhysics};
use crate::{ease_out_quad, random_rotation, random_spin, random_unit_vector};

/// Spin cap per axis for debris (deg/s)
const PARTICLE_SPIN: f32 = 360.0;

#[derive(Debug, Clone)]
struct Shockwave {
    visual: VisualId,
    spawn_ms: f64,
    duration_ms: f32,
}

pub struct ExplosionSystem {
    config: ExplosionConfig,
    physics: ParticlePhysics,
    cell_size: f32,
    ground_y: f32,
    particle_cap: Option<usize>,
    particles: Vec<ParticleMotion>,
    shockwaves: Vec<Shockwave>,
    bursts_spawned: u32,
}

impl ExplosionSystem {
    pub fn new(
        config: ExplosionConfig,
        physics: ParticlePhysics,
        cell_size: f32,
        ground_y: f32,
    ) -> Self {
        Self {
            config,
            physics,
            cell_size,
            ground_y,
            particle_cap: None,
            particles: Vec::new(),
            shockwaves: Vec::new(),
            bursts_spawned: 0,
        }
    }

    /// Limit particles per burst (quality settings); `None` removes the cap
    pub fn set_particle_cap(&mut self, cap: Option<usize>) {
        self.particle_cap = cap;
    }

    pub fn active_particles(&self) -> &[ParticleMotion] {
        &self.particles
    }

    pub fn active_shockwaves(&self) -> usize {
        self.shockwaves.len()
    }

    /// Total bursts spawned since creation
    pub fn bursts_spawned(&self) -> u32 {
        self.bursts_spawned
    }

    /// True once every particle and ring has been removed
    pub fn is_idle(&self) -> bool {
        self.particles.is_empty() && self.shockwaves.is_empty()
    }

    /// Spawn a burst at `impact`
    pub fn spawn_explosion(
        &mut self,
        impact: Vec3,
        burst: &BurstConfig,
        now_ms: f64,
        ctx: &mut MotionContext,
    ) {
        self.bursts_spawned += 1;
        self.spawn_shockwave(impact, now_ms, ctx);

        let count = match self.particle_cap {
            Some(cap) => burst.particle_count.min(cap),
            None => burst.particle_count,
        };
        let min_size = (self.cell_size * self.config.particle_min_size_factor)
            .round()
            .max(self.config.particle_min_size_floor);
        let max_size = (self.cell_size * self.config.particle_max_size_factor)
            .round()
            .max(self.config.particle_max_size_floor);

        for index in 0..count {
            let size = min_size + (ctx.rng.random::<f32>() * (max_size - min_size)).round();
            let color = if burst.particle_colors.is_empty() {
                DEFAULT_PARTICLE_COLORS[0]
            } else {
                burst.particle_colors[index % burst.particle_colors.len()].as_str()
            };
            let visual = ctx.scene.add(Visual::cube(size, color).with_position(impact));

            let direction = random_unit_vector(ctx.rng);
            let speed = self.config.speed_min + ctx.rng.random::<f32>() * self.config.speed_range;
            let mut velocity = direction * speed;
            velocity.y -= self.config.initial_upward_velocity;

            let rotation = random_rotation(ctx.rng);
            let spin = random_spin(ctx.rng, Vec3::splat(PARTICLE_SPIN));
            let lifetime_ms = self.config.lifetime_min_ms
                + ctx.rng.random::<f32>() * self.config.lifetime_range_ms;

            self.particles.push(ParticleMotion {
                visual,
                position: impact,
                velocity,
                rotation,
                spin,
                gravity: burst.gravity,
                spawn_ms: now_ms,
                last_update_ms: now_ms,
                lifetime_ms,
            });
        }

        log::debug!("Explosion at {:?}: {} particles", impact, count);
        ctx.clock.add(Channel::Explosions);
    }

    fn spawn_shockwave(&mut self, impact: Vec3, now_ms: f64, ctx: &mut MotionContext) {
        let shock = &self.config.shockwave;
        let diameter = (self.cell_size * shock.size_factor).round();
        let visual = ctx.scene.add(
            Visual::ring(diameter)
                .with_position(Vec3::new(impact.x, self.ground_y, impact.z))
                // Lay the ring flat on the ground
                .with_rotation(Vec3::new(90.0, 0.0, 0.0))
                .with_scale(shock.initial_scale),
        );
        self.shockwaves.push(Shockwave {
            visual,
            spawn_ms: now_ms,
            duration_ms: shock.duration_seconds * 1000.0,
        });
    }

    /// Advance every particle and ring to `time_ms`
    pub fn tick(&mut self, time_ms: f64, ctx: &mut MotionContext) {
        let ground_y = self.ground_y;
        let physics = self.physics;
        let scene = &mut *ctx.scene;

        self.particles.retain_mut(|p| match p.advance(time_ms, ground_y, &physics) {
            ParticleStep::Expired => {
                scene.remove(p.visual);
                false
            }
            ParticleStep::Idle => true,
            ParticleStep::Moved { opacity, .. } => {
                scene.set_position(p.visual, p.position);
                scene.set_rotation(p.visual, p.rotation);
                scene.set_opacity(p.visual, opacity);
                true
            }
        });

        let shockwave = &self.config.shockwave;
        let (initial, target) = (shockwave.initial_scale, shockwave.final_scale);
        self.shockwaves.retain(|ring| {
            let t = if ring.duration_ms > 0.0 {
                (((time_ms - ring.spawn_ms) as f32) / ring.duration_ms).clamp(0.0, 1.0)
            } else {
                1.0
            };
            if t >= 1.0 {
                scene.remove(ring.visual);
                return false;
            }
            let eased = ease_out_quad(t);
            scene.set_scale(ring.visual, initial + (target - initial) * eased);
            scene.set_opacity(ring.visual, 1.0 - eased);
            true
        });

        if self.is_idle() {
            ctx.clock.remove(Channel::Explosions);
        }
    }
}
