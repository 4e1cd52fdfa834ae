//! Cube Barrage - projectile and explosion effects for a CSS-3D cube arena
//!
//! Core modules:
//! - `sim`: Motion simulation (clock, particles, projectiles, shakes, missiles)
//! - `game`: Mini-game composition (layouts, turns, cell stacks, cascades)
//! - `platform`: Browser bindings for the scene and frame source
//! - `tuning`: Data-driven effect constants
//! - `settings`: Player preferences

pub mod game;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::ShootGame;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec3;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed timestep used by the missile systems (60 Hz)
    pub const FIXED_DT: f32 = 1.0 / 60.0;

    /// Grid defaults
    pub const GRID_COLUMNS: u32 = 20;
    pub const GRID_ROWS: u32 = 20;
    pub const CELL_SIZE: f32 = 40.0;
    /// Ground plane. Y grows downward, so anything above the grid is negative.
    pub const GROUND_Y: f32 = 0.0;

    /// Explosion defaults
    pub const DEFAULT_PARTICLE_COUNT: usize = 14;
    pub const DEFAULT_PARTICLE_GRAVITY: f32 = 2200.0;
    pub const DEFAULT_PARTICLE_COLORS: [&str; 5] =
        ["#ffcc66", "#ffd34d", "#ff9966", "#ff6b6b", "#ffe3a3"];

    /// Number of sub-cube slots per stacking level inside one cell (2x2)
    pub const POSITIONS_PER_LEVEL: usize = 4;
}

#[inline]
pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}

#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Uniform sample in `[-1, 1)`
#[inline]
pub fn signed_unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>() * 2.0 - 1.0
}

/// Random direction on the unit sphere.
///
/// Rejection-samples the cube `[-1, 1)^3` until the point is non-zero, then
/// normalizes it.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(signed_unit(rng), signed_unit(rng), signed_unit(rng));
        let length = v.length();
        if length > 0.0 {
            return v / length;
        }
    }
}

/// Random Euler angles in degrees, each axis in `[0, 360)`
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.random::<f32>() * 360.0,
        rng.random::<f32>() * 360.0,
        rng.random::<f32>() * 360.0,
    )
}

/// Random spin in degrees/second, each axis in `[-max, max)`
pub fn random_spin<R: Rng + ?Sized>(rng: &mut R, max: Vec3) -> Vec3 {
    Vec3::new(
        signed_unit(rng) * max.x,
        signed_unit(rng) * max.y,
        signed_unit(rng) * max.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_unit_vector_is_normalized() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease_in_quad(0.0), 0.0);
        assert_eq!(ease_in_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert!(ease_out_quad(0.5) > ease_in_quad(0.5));
    }

    #[test]
    fn test_random_spin_bounds() {
        let mut rng = Pcg32::seed_from_u64(3);
        let max = Vec3::new(360.0, 420.0, 280.0);
        for _ in 0..200 {
            let s = random_spin(&mut rng, max);
            assert!(s.x >= -360.0 && s.x < 360.0);
            assert!(s.y >= -420.0 && s.y < 420.0);
            assert!(s.z >= -280.0 && s.z < 280.0);
        }
    }
}
