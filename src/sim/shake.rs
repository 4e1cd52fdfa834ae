//! Impact shake
//!
//! Jitters a struck cube around its rest pose with linearly decaying
//! amplitude. Offsets are recomputed from the rest pose every frame, so the
//! cube always lands back exactly where it started.

use std::collections::BTreeMap;

use glam::Vec3;

use super::scene::{Pose, VisualId};
use super::{Channel, MotionContext};
use crate::signed_unit;
use crate::tuning::ShakeConfig;

#[derive(Debug, Clone, Copy)]
struct Shake {
    rest: Pose,
    start_ms: f64,
}

pub struct ImpactShakeSystem {
    config: ShakeConfig,
    /// Positional amplitude in px
    amplitude: f32,
    enabled: bool,
    active: BTreeMap<VisualId, Shake>,
    applied: u32,
}

impl ImpactShakeSystem {
    pub fn new(config: ShakeConfig, cell_size: f32) -> Self {
        Self {
            config,
            amplitude: cell_size * config.amplitude_factor,
            enabled: true,
            active: BTreeMap::new(),
            applied: 0,
        }
    }

    /// Reduced-motion switch; disabling does not interrupt running shakes
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_shaking(&self, target: VisualId) -> bool {
        self.active.contains_key(&target)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Shakes started since creation
    pub fn shakes_applied(&self) -> u32 {
        self.applied
    }

    /// Start shaking `target`, replacing any shake already running on it.
    /// The rest pose is whatever the target looks like right now.
    pub fn apply_to(&mut self, target: VisualId, now_ms: f64, ctx: &mut MotionContext) {
        if !self.enabled {
            return;
        }
        let Some(rest) = ctx.scene.pose(target) else {
            log::warn!("shake: target {:?} not in scene", target);
            return;
        };

        if self.active.insert(target, Shake { rest, start_ms: now_ms }).is_some() {
            log::debug!("shake on {:?} restarted", target);
        }
        self.applied += 1;
        ctx.clock.add(Channel::Shakes);
    }

    pub fn tick(&mut self, time_ms: f64, ctx: &mut MotionContext) {
        let config = self.config;
        let amplitude = self.amplitude;

        self.active.retain(|&target, shake| {
            if !ctx.scene.contains(target) {
                return false;
            }

            let progress = if config.duration_ms > 0.0 {
                (((time_ms - shake.start_ms) as f32) / config.duration_ms).min(1.0)
            } else {
                1.0
            };
            if progress >= 1.0 {
                ctx.scene.set_pose(target, shake.rest);
                return false;
            }

            let damping = 1.0 - progress;
            let offset = Vec3::new(
                signed_unit(ctx.rng) * amplitude * damping,
                signed_unit(ctx.rng) * amplitude * config.vertical_reduction * damping,
                signed_unit(ctx.rng) * amplitude * damping,
            );
            let tilt = Vec3::new(
                signed_unit(ctx.rng) * config.rotation_amplitude * damping,
                signed_unit(ctx.rng) * config.rotation_amplitude * damping,
                signed_unit(ctx.rng) * config.rotation_amplitude * damping,
            );

            ctx.scene.set_pose(
                target,
                Pose {
                    position: shake.rest.position + offset,
                    rotation: shake.rest.rotation + tilt,
                },
            );
            true
        });

        if self.active.is_empty() {
            ctx.clock.remove(Channel::Shakes);
        }
    }
}
