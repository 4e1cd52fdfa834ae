//! Secondary cascade placement
//!
//! Picks the cells a cascade of secondary missiles flies to after a drop hit,
//! and the slot each arriving cube takes inside its cell.

use std::f32::consts::TAU;

use rand::Rng;

use super::grid::{Cell, Grid};
use crate::consts::POSITIONS_PER_LEVEL;
use crate::tuning::ScatterPolicy;

/// `count` cells scattered around `center`, each clamped to the board.
/// Cells may repeat.
pub fn scatter_cells<R: Rng + ?Sized>(
    center: Cell,
    radius: i32,
    count: usize,
    policy: ScatterPolicy,
    grid: &Grid,
    rng: &mut R,
) -> Vec<Cell> {
    let radius = radius.max(0);
    (0..count)
        .map(|_| {
            let (dc, dr) = match policy {
                ScatterPolicy::Square => (
                    rng.random_range(-radius..=radius),
                    rng.random_range(-radius..=radius),
                ),
                ScatterPolicy::Disc => {
                    let distance = rng.random::<f32>() * radius as f32;
                    let angle = rng.random::<f32>() * TAU;
                    (
                        (distance * angle.cos()).round() as i32,
                        (distance * angle.sin()).round() as i32,
                    )
                }
            };
            grid.clamp(center.col as i64 + dc as i64, center.row as i64 + dr as i64)
        })
        .collect()
}

/// Slot of the `index`-th cube in a cell: (sub column, sub row, level).
///
/// Cubes fill a 2×2 pattern left to right, top to bottom, and start a new
/// level every four cubes.
pub fn sub_position(index: usize) -> (u32, u32, u32) {
    let pos = index % POSITIONS_PER_LEVEL;
    ((pos % 2) as u32, (pos / 2) as u32, (index / POSITIONS_PER_LEVEL) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::GridConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_sub_positions_cycle() {
        let slots: Vec<_> = (0..6).map(sub_position).collect();
        assert_eq!(
            slots,
            vec![(0, 0, 0), (1, 0, 0), (0, 1, 0), (1, 1, 0), (0, 0, 1), (1, 0, 1)]
        );
        assert_eq!(sub_position(9), (1, 0, 2));
    }

    #[test]
    fn test_zero_radius_stays_on_center() {
        let grid = Grid::from(GridConfig::default());
        let mut rng = Pcg32::seed_from_u64(51);
        let cells = scatter_cells(Cell::new(7, 3), 0, 10, ScatterPolicy::Square, &grid, &mut rng);
        assert_eq!(cells.len(), 10);
        assert!(cells.iter().all(|c| *c == Cell::new(7, 3)));
    }

    #[test]
    fn test_corner_clamps() {
        let grid = Grid::from(GridConfig::default());
        let mut rng = Pcg32::seed_from_u64(52);
        let cells = scatter_cells(Cell::new(0, 19), 3, 50, ScatterPolicy::Square, &grid, &mut rng);
        assert!(cells.iter().all(|c| c.col <= 3 && c.row >= 16 && c.row <= 19));
    }

    #[test]
    fn test_same_seed_same_cells() {
        let grid = Grid::from(GridConfig::default());
        let scatter = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            scatter_cells(Cell::new(10, 10), 3, 10, ScatterPolicy::Disc, &grid, &mut rng)
        };
        let (a, b) = (scatter(9), scatter(9));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_scatter_within_radius_and_board(
            col in 0u32..20,
            row in 0u32..20,
            radius in 0i32..6,
            disc in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let grid = Grid::from(GridConfig::default());
            let policy = if disc { ScatterPolicy::Disc } else { ScatterPolicy::Square };
            let mut rng = Pcg32::seed_from_u64(seed);
            for cell in scatter_cells(Cell::new(col, row), radius, 10, policy, &grid, &mut rng) {
                prop_assert!(cell.col < 20 && cell.row < 20);
                prop_assert!((cell.col as i32 - col as i32).abs() <= radius);
                prop_assert!((cell.row as i32 - row as i32).abs() <= radius);
            }
        }
    }
}
