//! Enemy selection

use rand::Rng;

use crate::sim::VisualId;

#[derive(Debug, Clone, Default)]
pub struct TargetingSystem {
    enemies: Vec<VisualId>,
}

impl TargetingSystem {
    pub fn new(enemies: Vec<VisualId>) -> Self {
        Self { enemies }
    }

    pub fn enemies(&self) -> &[VisualId] {
        &self.enemies
    }

    /// Uniformly random enemy, or `None` when there are none
    pub fn pick_random_enemy<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<VisualId> {
        if self.enemies.is_empty() {
            return None;
        }
        Some(self.enemies[rng.random_range(0..self.enemies.len())])
    }
}
