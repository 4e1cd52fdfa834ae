//! Data-driven effect tuning
//!
//! Every constant the motion systems read lives here. The defaults reproduce
//! the shipped game feel; a JSON document can override any subset of fields.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    pub cell_size: f32,
    pub ground_y: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: GRID_COLUMNS,
            rows: GRID_ROWS,
            cell_size: CELL_SIZE,
            ground_y: GROUND_Y,
        }
    }
}

/// Parameters for one explosion burst
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    pub particle_count: usize,
    /// Cycled by particle index
    pub particle_colors: Vec<String>,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            particle_colors: DEFAULT_PARTICLE_COLORS.iter().map(|c| c.to_string()).collect(),
            gravity: DEFAULT_PARTICLE_GRAVITY,
        }
    }
}

/// Arcing projectile archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileConfig {
    pub duration_ms: f32,
    pub arc_height: f32,
    pub color: String,
    /// Scales the sub-explosion gravity and flattens the arc
    pub gravity: f32,
    pub particle_count: usize,
    pub particle_colors: Vec<String>,
    /// Max spin per axis (deg/s)
    pub spin_speed: Vec3,
    pub random_rotation: bool,
}

impl Default for MissileConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1200.0,
            arc_height: CELL_SIZE * 5.0,
            color: "#ffd34d".to_string(),
            gravity: 1.0,
            particle_count: DEFAULT_PARTICLE_COUNT,
            particle_colors: DEFAULT_PARTICLE_COLORS.iter().map(|c| c.to_string()).collect(),
            spin_speed: Vec3::new(360.0, 420.0, 280.0),
            random_rotation: true,
        }
    }
}

/// Particle integration constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlePhysics {
    /// Multiplied by a missile's gravity factor for its sub-explosion
    pub gravity_base: f32,
    /// Fraction of vertical speed kept after a ground bounce
    pub bounce_damping: f32,
    /// Horizontal speed kept per frame while on the ground
    pub friction: f32,
    /// Clamp on per-frame delta to avoid tunneling after long gaps
    pub max_delta_seconds: f32,
}

impl Default for ParticlePhysics {
    fn default() -> Self {
        Self {
            gravity_base: DEFAULT_PARTICLE_GRAVITY,
            bounce_damping: 0.35,
            friction: 0.7,
            max_delta_seconds: 0.05,
        }
    }
}

/// Expanding ring drawn on the ground at each impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShockwaveConfig {
    /// Diameter = cell_size * size_factor
    pub size_factor: f32,
    pub initial_scale: f32,
    pub final_scale: f32,
    pub duration_seconds: f32,
}

impl Default for ShockwaveConfig {
    fn default() -> Self {
        Self {
            size_factor: 1.2,
            initial_scale: 0.2,
            final_scale: 2.6,
            duration_seconds: 0.45,
        }
    }
}

/// Spawn ranges for explosion particles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    pub particle_min_size_factor: f32,
    pub particle_min_size_floor: f32,
    pub particle_max_size_factor: f32,
    pub particle_max_size_floor: f32,
    pub speed_min: f32,
    pub speed_range: f32,
    /// Subtracted from the vertical velocity at spawn (up is negative)
    pub initial_upward_velocity: f32,
    pub lifetime_min_ms: f32,
    pub lifetime_range_ms: f32,
    pub shockwave: ShockwaveConfig,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            particle_min_size_factor: 0.12,
            particle_min_size_floor: 6.0,
            particle_max_size_factor: 0.28,
            particle_max_size_floor: 12.0,
            speed_min: 260.0,
            speed_range: 340.0,
            initial_upward_velocity: 650.0,
            lifetime_min_ms: 600.0,
            lifetime_range_ms: 300.0,
            shockwave: ShockwaveConfig::default(),
        }
    }
}

/// Impact shake applied to struck cubes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeConfig {
    pub duration_ms: f32,
    /// Positional amplitude = cell_size * amplitude_factor
    pub amplitude_factor: f32,
    /// Degrees
    pub rotation_amplitude: f32,
    /// Extra scale on the vertical axis
    pub vertical_reduction: f32,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            duration_ms: 220.0,
            amplitude_factor: 0.06,
            rotation_amplitude: 6.0,
            vertical_reduction: 0.5,
        }
    }
}

/// Missiles falling straight down onto the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropMissileConfig {
    pub gravity: f32,
    /// Start y = -(cell_size * start_height_multiplier)
    pub start_height_multiplier: f32,
    pub fixed_delta_time: f32,
}

impl Default for DropMissileConfig {
    fn default() -> Self {
        Self {
            gravity: 1200.0,
            start_height_multiplier: 15.0,
            fixed_delta_time: FIXED_DT,
        }
    }
}

/// Small missiles skimming the grid after a drop impact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryMissileConfig {
    pub fixed_delta_time: f32,
    /// Seconds
    pub default_duration: f32,
    pub size_factor: f32,
    pub min_size: f32,
    pub color: String,
}

impl Default for SecondaryMissileConfig {
    fn default() -> Self {
        Self {
            fixed_delta_time: FIXED_DT,
            default_duration: 0.5,
            size_factor: 0.15,
            min_size: 8.0,
            color: "#ff6b6b".to_string(),
        }
    }
}

/// How cascade cells are scattered around an impact cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterPolicy {
    /// Independent column/row offsets inside a square of the given radius
    #[default]
    Square,
    /// Random radius and angle, rounded to whole cells (denser near center)
    Disc,
}

/// Secondary cascade spawned by a drop-missile hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub count: usize,
    /// In cells
    pub radius: i32,
    pub policy: ScatterPolicy,
    /// Gap between stacked sub-cubes (px)
    pub sub_cube_margin: f32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            count: 10,
            radius: 3,
            policy: ScatterPolicy::Square,
            sub_cube_margin: 2.0,
        }
    }
}

/// Object sizes relative to the cell size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeFactors {
    pub projectile: f32,
    pub projectile_min_px: f32,
    pub target_cube: f32,
}

impl Default for SizeFactors {
    fn default() -> Self {
        Self {
            projectile: 0.35,
            projectile_min_px: 14.0,
            target_cube: 0.3,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub grid: GridConfig,
    pub sizes: SizeFactors,
    pub missile: MissileConfig,
    pub particles: ParticlePhysics,
    pub explosion: ExplosionConfig,
    pub shake: ShakeConfig,
    pub drop_missile: DropMissileConfig,
    pub secondary_missile: SecondaryMissileConfig,
    pub cascade: CascadeConfig,
    /// Projectiles launched by one fireworks burst
    pub fireworks_count: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            sizes: SizeFactors::default(),
            missile: MissileConfig::default(),
            particles: ParticlePhysics::default(),
            explosion: ExplosionConfig::default(),
            shake: ShakeConfig::default(),
            drop_missile: DropMissileConfig::default(),
            secondary_missile: SecondaryMissileConfig::default(),
            cascade: CascadeConfig::default(),
            fireworks_count: 10,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Standard tuning
    pub fn standard() -> Self {
        Self::default()
    }

    /// Sub-explosion used when a missile of this archetype lands
    pub fn burst_for(&self, missile: &MissileConfig) -> BurstConfig {
        BurstConfig {
            particle_count: missile.particle_count,
            particle_colors: missile.particle_colors.clone(),
            gravity: self.particles.gravity_base * missile.gravity,
        }
    }

    /// Visual size of an arcing projectile
    pub fn projectile_size(&self) -> f32 {
        (self.grid.cell_size * self.sizes.projectile)
            .round()
            .max(self.sizes.projectile_min_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "shake": { "duration_ms": 300.0 }, "cascade": { "policy": "disc" } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.shake.duration_ms, 300.0);
        assert_eq!(tuning.shake.rotation_amplitude, 6.0);
        assert_eq!(tuning.cascade.policy, ScatterPolicy::Disc);
        assert_eq!(tuning.grid.cell_size, CELL_SIZE);
        assert_eq!(tuning.fireworks_count, 10);
    }

    #[test]
    fn test_default_fireworks_count() {
        assert_eq!(Tuning::default().fireworks_count, 10);
        assert_eq!(Tuning::standard(), Tuning::default());
    }

    #[test]
    fn test_fireworks_can_be_disabled() {
        let tuning = Tuning::from_json(r#"{ "fireworks_count": 0 }"#).unwrap();
        assert_eq!(tuning.fireworks_count, 0);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_burst_scales_gravity() {
        let tuning = Tuning::standard();
        let heavy = MissileConfig {
            gravity: 2.0,
            ..Default::default()
        };
        assert_eq!(tuning.burst_for(&heavy).gravity, 4400.0);
        assert_eq!(tuning.projectile_size(), 14.0);
    }
}
