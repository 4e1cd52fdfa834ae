//! Motion simulation module
//!
//! Every effect in the game is a record in some system's active set, advanced
//! once per frame by the shared [`AnimationClock`]:
//! - Seeded RNG only (`Pcg32`)
//! - Records are owned by exactly one system and removed in the frame they end
//! - Systems subscribe to the clock while they have work and leave when idle
//! - No DOM access: all output goes through the [`Scene`] trait

pub mod cascade;
pub mod clock;
pub mod drop_missile;
pub mod explosion;
pub mod grid;
pub mod particle;
pub mod projectile;
pub mod scene;
pub mod secondary;
pub mod shake;

pub use cascade::{scatter_cells, sub_position};
pub use clock::{AnimationClock, FrameHandle, FrameSource, ManualFrameSource};
pub use drop_missile::DropMissileSystem;
pub use explosion::ExplosionSystem;
pub use grid::{Cell, Grid};
pub use particle::{ParticleMotion, ParticleStep};
pub use projectile::{ProjectileSystem, gravity_lift};
pub use scene::{MemoryScene, Pose, Scene, Visual, VisualId, VisualKind};
pub use secondary::SecondaryMissileSystem;
pub use shake::ImpactShakeSystem;

use glam::Vec3;
use rand_pcg::Pcg32;

/// Clock subscribers, one per motion system.
///
/// Declaration order is dispatch order within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Projectiles,
    DropMissiles,
    SecondaryMissiles,
    Explosions,
    Shakes,
}

/// Terminal events surfaced to game logic
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEvent {
    /// An arcing projectile reached its target
    ProjectileImpact { target: VisualId, point: Vec3 },
    /// A drop missile crossed the ground plane
    MissileHit { x: f32, z: f32 },
    /// A secondary missile reached its destination
    MissileArrival { x: f32, z: f32 },
}

/// Shared collaborators handed to every system call
pub struct MotionContext<'a> {
    pub scene: &'a mut dyn Scene,
    pub clock: &'a mut AnimationClock<Channel>,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut Vec<MotionEvent>,
}
