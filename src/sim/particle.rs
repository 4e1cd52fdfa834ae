//! Explosion particle kinematics
//!
//! Y grows downward: gravity is positive, "up" is negative, and the ground
//! plane is the largest y a particle may reach.

use glam::Vec3;

use super::scene::VisualId;
use crate::tuning::ParticlePhysics;

/// One simulated debris cube
#[derive(Debug, Clone)]
pub struct ParticleMotion {
    pub visual: VisualId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Degrees
    pub rotation: Vec3,
    /// Degrees/second
    pub spin: Vec3,
    pub gravity: f32,
    pub spawn_ms: f64,
    pub last_update_ms: f64,
    pub lifetime_ms: f32,
}

/// Outcome of advancing a particle to a frame time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleStep {
    /// Lifetime elapsed; the particle must be removed
    Expired,
    /// Frame time did not move forward; nothing changed
    Idle,
    /// State advanced; `opacity` is the fade for this frame
    Moved { opacity: f32, bounced: bool },
}

impl ParticleMotion {
    /// Milliseconds since spawn
    #[inline]
    pub fn age_ms(&self, time_ms: f64) -> f32 {
        (time_ms - self.spawn_ms) as f32
    }

    /// Advance to `time_ms`
    pub fn advance(
        &mut self,
        time_ms: f64,
        ground_y: f32,
        physics: &ParticlePhysics,
    ) -> ParticleStep {
        let elapsed = self.age_ms(time_ms);
        if elapsed >= self.lifetime_ms {
            return ParticleStep::Expired;
        }

        let dt = (((time_ms - self.last_update_ms) / 1000.0) as f32).min(physics.max_delta_seconds);
        if dt <= 0.0 {
            return ParticleStep::Idle;
        }
        self.last_update_ms = time_ms;

        self.velocity.y += self.gravity * dt;
        self.position += self.velocity * dt;

        let mut bounced = false;
        if self.position.y > ground_y {
            self.position.y = ground_y;
            self.velocity.y *= -physics.bounce_damping;
            // Applied once per grounded frame, not scaled by dt
            self.velocity.x *= physics.friction;
            self.velocity.z *= physics.friction;
            bounced = true;
        }

        self.rotation += self.spin * dt;

        ParticleStep::Moved {
            opacity: 1.0 - elapsed / self.lifetime_ms,
            bounced,
        }
    }
}
