//! Arcing projectiles
//!
//! A projectile travels from a source cube to a target cube over a fixed
//! duration. Horizontal motion is linear; the vertical arc is an eased lift
//! that peaks at mid-flight (not a true ballistic parabola). On arrival the
//! target is struck: explosion, shake, reveal.

use glam::Vec3;

use super::explosion::ExplosionSystem;
use super::scene::{Visual, VisualId};
use super::shake::ImpactShakeSystem;
use super::{Channel, MotionContext, MotionEvent};
use crate::tuning::{BurstConfig, MissileConfig, Tuning};
use crate::{ease_in_quad, ease_out_quad, random_rotation, random_spin};

/// Lower bound on the gravity factor when flattening the arc
const MIN_GRAVITY_FACTOR: f32 = 0.1;

/// Normalized arc height at progress `p`.
///
/// Ease-out rise over the first half, ease-in fall over the second; 0 at both
/// ends and 1 at the midpoint.
pub fn gravity_lift(p: f32) -> f32 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    if p < 0.5 {
        ease_out_quad(p / 0.5)
    } else {
        1.0 - ease_in_quad((p - 0.5) / 0.5)
    }
}

#[derive(Debug, Clone)]
struct ProjectileMotion {
    visual: VisualId,
    start: Vec3,
    end: Vec3,
    target: VisualId,
    start_ms: f64,
    last_update_ms: f64,
    duration_ms: f32,
    arc_height: f32,
    gravity_factor: f32,
    burst: BurstConfig,
    rotation: Vec3,
    spin: Vec3,
}

impl ProjectileMotion {
    fn progress(&self, time_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (((time_ms - self.start_ms) as f32) / self.duration_ms).clamp(0.0, 1.0)
    }

    fn position_at(&self, progress: f32) -> Vec3 {
        let lift = (self.arc_height / self.gravity_factor.max(MIN_GRAVITY_FACTOR))
            * gravity_lift(progress);
        let mut pos = self.start.lerp(self.end, progress);
        pos.y -= lift;
        pos
    }
}

pub struct ProjectileSystem {
    default_missile: MissileConfig,
    gravity_base: f32,
    projectile_size: f32,
    /// Raises start/end above cube centers so shots leave and land on surfaces
    surface_offset: f32,
    max_delta_seconds: f32,
    projectiles: Vec<ProjectileMotion>,
}

impl ProjectileSystem {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            default_missile: tuning.missile.clone(),
            gravity_base: tuning.particles.gravity_base,
            projectile_size: tuning.projectile_size(),
            surface_offset: (tuning.grid.cell_size * tuning.sizes.projectile).round(),
            max_delta_seconds: tuning.particles.max_delta_seconds,
            projectiles: Vec::new(),
        }
    }

    pub fn active(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_idle(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Fire the default missile from `source` to `target`
    pub fn fire(
        &mut self,
        source: VisualId,
        target: VisualId,
        now_ms: f64,
        ctx: &mut MotionContext,
    ) -> Option<VisualId> {
        let config = self.default_missile.clone();
        self.fire_with(source, target, &config, now_ms, ctx)
    }

    /// Fire a specific missile archetype. Returns the projectile visual, or
    /// `None` when either cube is missing from the scene.
    pub fn fire_with(
        &mut self,
        source: VisualId,
        target: VisualId,
        config: &MissileConfig,
        now_ms: f64,
        ctx: &mut MotionContext,
    ) -> Option<VisualId> {
        let Some(source_pose) = ctx.scene.pose(source) else {
            log::warn!("fire: source {:?} not in scene", source);
            return None;
        };
        self.launch(source_pose.position, target, config, now_ms, ctx)
    }

    /// Fire from an arbitrary point (cube center) toward `target`
    pub fn launch(
        &mut self,
        from: Vec3,
        target: VisualId,
        config: &MissileConfig,
        now_ms: f64,
        ctx: &mut MotionContext,
    ) -> Option<VisualId> {
        let Some(target_pose) = ctx.scene.pose(target) else {
            log::warn!("fire: target {:?} not in scene", target);
            return None;
        };

        let lift = Vec3::new(0.0, self.surface_offset, 0.0);
        let start = from - lift;
        let end = target_pose.position - lift;

        let visual = ctx
            .scene
            .add(Visual::cube(self.projectile_size, &config.color).with_position(start));

        let rotation = if config.random_rotation {
            random_rotation(ctx.rng)
        } else {
            Vec3::ZERO
        };
        let spin = random_spin(ctx.rng, config.spin_speed);

        self.projectiles.push(ProjectileMotion {
            visual,
            start,
            end,
            target,
            start_ms: now_ms,
            last_update_ms: now_ms,
            duration_ms: config.duration_ms,
            arc_height: config.arc_height,
            gravity_factor: config.gravity,
            burst: BurstConfig {
                particle_count: config.particle_count,
                particle_colors: config.particle_colors.clone(),
                gravity: self.gravity_base * config.gravity,
            },
            rotation,
            spin,
        });

        log::debug!("Projectile {:?} fired at {:?}", visual, target);
        ctx.clock.add(Channel::Projectiles);
        Some(visual)
    }

    /// Advance every projectile; arrivals strike their targets this frame
    pub fn tick(
        &mut self,
        time_ms: f64,
        explosions: &mut ExplosionSystem,
        shakes: &mut ImpactShakeSystem,
        ctx: &mut MotionContext,
    ) {
        let max_dt = self.max_delta_seconds;

        self.projectiles.retain_mut(|m| {
            let progress = m.progress(time_ms);
            let position = m.position_at(progress);

            let dt = (((time_ms - m.last_update_ms) / 1000.0) as f32).min(max_dt);
            m.last_update_ms = time_ms;
            m.rotation += m.spin * dt;

            ctx.scene.set_position(m.visual, position);
            ctx.scene.set_rotation(m.visual, m.rotation);

            if progress < 1.0 {
                return true;
            }

            explosions.spawn_explosion(m.end, &m.burst, time_ms, ctx);
            shakes.apply_to(m.target, time_ms, ctx);
            ctx.scene.set_opacity(m.target, 1.0);
            ctx.scene.remove(m.visual);
            ctx.events.push(MotionEvent::ProjectileImpact {
                target: m.target,
                point: m.end,
            });
            false
        });

        if self.projectiles.is_empty() {
            ctx.clock.remove(Channel::Projectiles);
        }
    }
}
