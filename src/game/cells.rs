//! Target cubes stacked on grid cells, and their tallies

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::subscribers::{SubscriptionId, Subscribers};
use crate::sim::{Cell, VisualId};

/// Colored target cube variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
}

impl TargetKind {
    pub const ALL: [TargetKind; 6] = [
        TargetKind::Red,
        TargetKind::Green,
        TargetKind::Blue,
        TargetKind::Yellow,
        TargetKind::Magenta,
        TargetKind::Cyan,
    ];

    pub fn color(&self) -> &'static str {
        match self {
            TargetKind::Red => "#ff3333",
            TargetKind::Green => "#33ff33",
            TargetKind::Blue => "#3333ff",
            TargetKind::Yellow => "#ffff00",
            TargetKind::Magenta => "#ff00ff",
            TargetKind::Cyan => "#00ffff",
        }
    }

    /// Stable key, `type-0` through `type-5`
    pub fn key(&self) -> &'static str {
        match self {
            TargetKind::Red => "type-0",
            TargetKind::Green => "type-1",
            TargetKind::Blue => "type-2",
            TargetKind::Yellow => "type-3",
            TargetKind::Magenta => "type-4",
            TargetKind::Cyan => "type-5",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// One cube stacked on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackedCube {
    pub visual: VisualId,
    pub kind: TargetKind,
}

/// Per-cell stacks, bottom first
pub struct GridCellManager {
    columns: u32,
    rows: u32,
    cells: Vec<Vec<StackedCube>>,
}

impl GridCellManager {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            cells: vec![Vec::new(); columns as usize * rows as usize],
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.col < self.columns && cell.row < self.rows)
            .then(|| (cell.row * self.columns + cell.col) as usize)
    }

    /// Push a cube onto `cell`'s stack. Returns its stack index (0 = bottom),
    /// or `None` for cells off the board.
    pub fn add_cube_to_cell(
        &mut self,
        cell: Cell,
        visual: VisualId,
        kind: TargetKind,
    ) -> Option<usize> {
        let Some(index) = self.index(cell) else {
            log::warn!("Invalid cell ({}, {})", cell.col, cell.row);
            return None;
        };
        let stack = &mut self.cells[index];
        stack.push(StackedCube { visual, kind });
        Some(stack.len() - 1)
    }

    pub fn cell_content(&self, cell: Cell) -> &[StackedCube] {
        match self.index(cell) {
            Some(index) => &self.cells[index],
            None => &[],
        }
    }

    pub fn stack_height(&self, cell: Cell) -> usize {
        self.cell_content(cell).len()
    }

    /// Empty a cell, returning what it held
    pub fn clear_cell(&mut self, cell: Cell) -> Vec<StackedCube> {
        match self.index(cell) {
            Some(index) => std::mem::take(&mut self.cells[index]),
            None => Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(Vec::clear);
    }

    pub fn total_cube_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

pub type KindCounts = BTreeMap<TargetKind, u32>;

/// Live tally of revealed target cubes by kind
pub struct TargetCubeCounter {
    counts: KindCounts,
    observers: Subscribers<KindCounts>,
}

impl Default for TargetCubeCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetCubeCounter {
    pub fn new() -> Self {
        Self {
            counts: TargetKind::ALL.iter().map(|&k| (k, 0)).collect(),
            observers: Subscribers::default(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&KindCounts) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn increment(&mut self, kind: TargetKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.observers.notify(&self.counts);
    }

    /// Never goes below zero
    pub fn decrement(&mut self, kind: TargetKind) {
        let count = self.counts.entry(kind).or_insert(0);
        *count = count.saturating_sub(1);
        self.observers.notify(&self.counts);
    }

    pub fn count(&self, kind: TargetKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &KindCounts {
        &self.counts
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn reset(&mut self) {
        self.counts.values_mut().for_each(|c| *c = 0);
        self.observers.notify(&self.counts);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_stack_indices() {
        let mut cells = GridCellManager::new(20, 20);
        let cell = Cell::new(4, 7);
        assert_eq!(cells.add_cube_to_cell(cell, VisualId(1), TargetKind::Red), Some(0));
        assert_eq!(cells.add_cube_to_cell(cell, VisualId(2), TargetKind::Cyan), Some(1));
        assert_eq!(cells.stack_height(cell), 2);
        assert_eq!(cells.cell_content(cell)[1].kind, TargetKind::Cyan);
        assert_eq!(cells.total_cube_count(), 2);
    }

    #[test]
    fn test_out_of_range_cell() {
        let mut cells = GridCellManager::new(20, 20);
        assert_eq!(cells.add_cube_to_cell(Cell::new(20, 0), VisualId(1), TargetKind::Red), None);
        assert!(cells.cell_content(Cell::new(0, 99)).is_empty());
        assert_eq!(cells.total_cube_count(), 0);
    }

    #[test]
    fn test_clear_and_reset() {
        let mut cells = GridCellManager::new(4, 4);
        cells.add_cube_to_cell(Cell::new(1, 1), VisualId(1), TargetKind::Blue);
        cells.add_cube_to_cell(Cell::new(2, 3), VisualId(2), TargetKind::Blue);
        let removed = cells.clear_cell(Cell::new(1, 1));
        assert_eq!(removed, vec![StackedCube { visual: VisualId(1), kind: TargetKind::Blue }]);
        assert_eq!(cells.total_cube_count(), 1);
        cells.reset();
        assert_eq!(cells.total_cube_count(), 0);
    }

    #[test]
    fn test_counter_saturates_and_notifies() {
        let mut counter = TargetCubeCounter::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        counter.subscribe(move |counts| sink.borrow_mut().push(counts[&TargetKind::Green]));

        counter.increment(TargetKind::Green);
        counter.increment(TargetKind::Green);
        counter.decrement(TargetKind::Green);
        counter.decrement(TargetKind::Green);
        counter.decrement(TargetKind::Green);

        assert_eq!(counter.count(TargetKind::Green), 0);
        assert_eq!(*log.borrow(), vec![1, 2, 1, 0, 0]);
    }

    #[test]
    fn test_counter_reset() {
        let mut counter = TargetCubeCounter::new();
        counter.increment(TargetKind::Yellow);
        counter.increment(TargetKind::Red);
        assert_eq!(counter.total(), 2);
        counter.reset();
        assert_eq!(counter.total(), 0);
        assert_eq!(counter.counts().len(), 6);
    }

    #[test]
    fn test_kind_keys() {
        let keys: Vec<_> = TargetKind::ALL.iter().map(|k| k.key()).collect();
        assert_eq!(keys, vec!["type-0", "type-1", "type-2", "type-3", "type-4", "type-5"]);
        assert_eq!(TargetKind::Blue.color(), "#3333ff");
    }
}
