//! Board layouts
//!
//! A layout names the fixed cubes placed on the grid at game start.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::Cell;
use crate::tuning::GridConfig;

pub const LEFT_SHOOTER_COLOR: &str = "#32b9ff";
pub const RIGHT_SHOOTER_COLOR: &str = "#ff7a32";
pub const ENEMY_COLOR: &str = "#2f6cff";
pub const OBSTACLE_COLOR: &str = "#ff4444";

/// What a layout cube does in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CubeRole {
    /// Fires at the other shooter
    LeftShooter,
    /// Fires at a random enemy
    RightShooter,
    Enemy,
    /// Launches fireworks
    Obstacle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeDescriptor {
    pub key: String,
    pub role: CubeRole,
    pub color: String,
    pub cell: Cell,
    /// Cube edge = cell_size * size_scale
    pub size_scale: f32,
    pub interactive: bool,
}

impl CubeDescriptor {
    fn new(key: &str, role: CubeRole, color: &str, cell: Cell) -> Self {
        Self {
            key: key.to_string(),
            role,
            color: color.to_string(),
            cell,
            size_scale: 1.0,
            interactive: !matches!(role, CubeRole::Enemy),
        }
    }
}

pub type GridLayout = Vec<CubeDescriptor>;

/// Two shooters on opposite edges, two enemies, a central obstacle
pub fn full_layout(grid: &GridConfig) -> GridLayout {
    let (cols, rows) = (grid.columns.max(1), grid.rows.max(1));
    vec![
        CubeDescriptor::new(
            "leftShooter",
            CubeRole::LeftShooter,
            LEFT_SHOOTER_COLOR,
            Cell::new(cols - 1, rows / 2),
        ),
        CubeDescriptor::new(
            "rightShooter",
            CubeRole::RightShooter,
            RIGHT_SHOOTER_COLOR,
            Cell::new(0, rows / 2),
        ),
        CubeDescriptor::new(
            "enemyTop",
            CubeRole::Enemy,
            ENEMY_COLOR,
            Cell::new(cols / 2, 3.min(rows - 1)),
        ),
        CubeDescriptor::new(
            "enemyBottom",
            CubeRole::Enemy,
            ENEMY_COLOR,
            Cell::new(cols / 2, rows.saturating_sub(4)),
        ),
        CubeDescriptor::new(
            "obstacle",
            CubeRole::Obstacle,
            OBSTACLE_COLOR,
            Cell::new(cols / 2, rows / 2),
        ),
    ]
}

/// A single double-size obstacle
pub fn minimal_layout(grid: &GridConfig) -> GridLayout {
    let (cols, rows) = (grid.columns.max(1), grid.rows.max(1));
    vec![CubeDescriptor {
        size_scale: 2.0,
        ..CubeDescriptor::new(
            "obstacle",
            CubeRole::Obstacle,
            OBSTACLE_COLOR,
            Cell::new(cols / 2, rows / 2),
        )
    }]
}

/// Registry of named layouts with one current selection
pub struct LayoutManager {
    layouts: BTreeMap<String, GridLayout>,
    current_key: String,
    current: GridLayout,
}

impl LayoutManager {
    pub const DEFAULT_KEY: &'static str = "full";

    pub fn new(grid: &GridConfig) -> Self {
        let full = full_layout(grid);
        let mut layouts = BTreeMap::new();
        layouts.insert(Self::DEFAULT_KEY.to_string(), full.clone());
        layouts.insert("minimal".to_string(), minimal_layout(grid));
        Self {
            layouts,
            current_key: Self::DEFAULT_KEY.to_string(),
            current: full,
        }
    }

    /// Switch to `key`. Unknown keys keep the current layout.
    pub fn load_layout(&mut self, key: &str) -> &GridLayout {
        match self.layouts.get(key) {
            Some(layout) => {
                self.current = layout.clone();
                self.current_key = key.to_string();
                log::info!("Layout \"{}\" loaded", key);
            }
            None => log::warn!("Layout \"{}\" not found, keeping \"{}\"", key, self.current_key),
        }
        &self.current
    }

    pub fn current_key(&self) -> &str {
        &self.current_key
    }

    pub fn current_layout(&self) -> &GridLayout {
        &self.current
    }

    /// Add or replace a layout
    pub fn register_layout(&mut self, key: &str, layout: GridLayout) {
        self.layouts.insert(key.to_string(), layout);
        log::info!("Layout \"{}\" registered", key);
    }

    /// Registered keys, sorted
    pub fn available_layouts(&self) -> Vec<&str> {
        self.layouts.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_layout_positions() {
        let layout = full_layout(&GridConfig::default());
        let find = |key: &str| layout.iter().find(|d| d.key == key).unwrap();
        assert_eq!(find("leftShooter").cell, Cell::new(19, 10));
        assert_eq!(find("rightShooter").cell, Cell::new(0, 10));
        assert_eq!(find("enemyTop").cell, Cell::new(10, 3));
        assert_eq!(find("enemyBottom").cell, Cell::new(10, 16));
        assert_eq!(find("obstacle").cell, Cell::new(10, 10));
        assert!(!find("enemyTop").interactive);
        assert!(layout.iter().all(|d| d.size_scale == 1.0));
    }

    #[test]
    fn test_unknown_layout_keeps_current() {
        let mut layouts = LayoutManager::new(&GridConfig::default());
        assert_eq!(layouts.load_layout("minimal").len(), 1);
        assert_eq!(layouts.load_layout("nope").len(), 1);
        assert_eq!(layouts.current_key(), "minimal");
        assert_eq!(layouts.current_layout()[0].size_scale, 2.0);
    }

    #[test]
    fn test_register_layout() {
        let mut layouts = LayoutManager::new(&GridConfig::default());
        let custom = vec![CubeDescriptor::new(
            "lone",
            CubeRole::Enemy,
            ENEMY_COLOR,
            Cell::new(1, 1),
        )];
        layouts.register_layout("custom", custom);
        assert_eq!(layouts.available_layouts(), vec!["custom", "full", "minimal"]);
        assert_eq!(layouts.load_layout("custom")[0].key, "lone");
    }
}
