//! Board geometry
//!
//! The grid is centered on the world origin in the XZ plane. Cubes resting
//! on a cell have their center half a cell above the ground.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::tuning::GridConfig;

/// Integer cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
}

impl Cell {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub columns: u32,
    pub rows: u32,
    pub cell_size: f32,
}

impl From<GridConfig> for Grid {
    fn from(config: GridConfig) -> Self {
        Self {
            columns: config.columns.max(1),
            rows: config.rows.max(1),
            cell_size: config.cell_size,
        }
    }
}

impl Grid {
    #[inline]
    fn half_extent(&self) -> (f32, f32) {
        (
            self.columns as f32 * self.cell_size / 2.0,
            self.rows as f32 * self.cell_size / 2.0,
        )
    }

    /// Center of a resting cube on `cell`
    pub fn cell_to_world(&self, cell: Cell) -> Vec3 {
        let (half_w, half_h) = self.half_extent();
        Vec3::new(
            (cell.col as f32 + 0.5) * self.cell_size - half_w,
            -(self.cell_size / 2.0),
            (cell.row as f32 + 0.5) * self.cell_size - half_h,
        )
    }

    /// Nearest cell to world point (`x`, `z`), clamped onto the board
    pub fn world_to_cell(&self, x: f32, z: f32) -> Cell {
        let (half_w, half_h) = self.half_extent();
        let col = ((x + half_w) / self.cell_size - 0.5).round();
        let row = ((z + half_h) / self.cell_size - 0.5).round();
        self.clamp(col as i64, row as i64)
    }

    /// Clip signed coordinates to the board
    pub fn clamp(&self, col: i64, row: i64) -> Cell {
        Cell {
            col: col.clamp(0, self.columns as i64 - 1) as u32,
            row: row.clamp(0, self.rows as i64 - 1) as u32,
        }
    }

    pub fn contains(&self, col: i64, row: i64) -> bool {
        (0..self.columns as i64).contains(&col) && (0..self.rows as i64).contains(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid() -> Grid {
        Grid::from(GridConfig::default())
    }

    #[test]
    fn test_cell_to_world_centers() {
        let g = grid();
        assert_eq!(g.cell_to_world(Cell::new(0, 0)), Vec3::new(-380.0, -20.0, -380.0));
        assert_eq!(g.cell_to_world(Cell::new(10, 10)), Vec3::new(20.0, -20.0, 20.0));
        assert_eq!(g.cell_to_world(Cell::new(19, 19)), Vec3::new(380.0, -20.0, 380.0));
    }

    #[test]
    fn test_world_to_cell_clamps() {
        let g = grid();
        assert_eq!(g.world_to_cell(-5000.0, 5000.0), Cell::new(0, 19));
        assert_eq!(g.world_to_cell(21.0, 19.0), Cell::new(10, 10));
    }

    #[test]
    fn test_contains() {
        let g = grid();
        assert!(g.contains(0, 19));
        assert!(!g.contains(-1, 0));
        assert!(!g.contains(0, 20));
    }

    proptest! {
        #[test]
        fn prop_world_to_cell_inverts_cell_to_world(col in 0u32..20, row in 0u32..20) {
            let g = grid();
            let world = g.cell_to_world(Cell::new(col, row));
            prop_assert_eq!(g.world_to_cell(world.x, world.z), Cell::new(col, row));
        }

        #[test]
        fn prop_world_to_cell_stays_on_board(x in -1.0e5f32..1.0e5, z in -1.0e5f32..1.0e5) {
            let cell = grid().world_to_cell(x, z);
            prop_assert!(cell.col < 20 && cell.row < 20);
        }
    }
}
