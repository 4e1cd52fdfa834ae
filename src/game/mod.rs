//! Shooting mini-game
//!
//! Owns the scene, the clock and every motion system, and turns motion
//! events into game state:
//! - Projectile impacts reveal hidden targets
//! - Drop-missile hits scatter secondary missiles to nearby cells
//! - Secondary arrivals stack a new target cube and bump its tally

pub mod cells;
pub mod layout;
pub mod subscribers;
pub mod targeting;
pub mod turn;

pub use cells::{GridCellManager, KindCounts, StackedCube, TargetCubeCounter, TargetKind};
pub use layout::{CubeDescriptor, CubeRole, GridLayout, LayoutManager};
pub use subscribers::{SubscriptionId, Subscribers};
pub use targeting::TargetingSystem;
pub use turn::GameTurnManager;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::Settings;
use crate::sim::{
    AnimationClock, Cell, Channel, DropMissileSystem, ExplosionSystem, FrameSource, Grid,
    ImpactShakeSystem, MotionContext, MotionEvent, ProjectileSystem, Scene,
    SecondaryMissileSystem, Visual, VisualId, scatter_cells, sub_position,
};
use crate::tuning::Tuning;

/// Collaborators shared by all motion systems
struct World {
    scene: Box<dyn Scene>,
    clock: AnimationClock<Channel>,
    rng: Pcg32,
    events: Vec<MotionEvent>,
}

impl World {
    fn ctx(&mut self) -> MotionContext<'_> {
        MotionContext {
            scene: self.scene.as_mut(),
            clock: &mut self.clock,
            rng: &mut self.rng,
            events: &mut self.events,
        }
    }
}

/// A layout cube placed in the scene
#[derive(Debug, Clone)]
struct PlacedCube {
    key: String,
    role: CubeRole,
    visual: VisualId,
}

pub struct ShootGame {
    tuning: Tuning,
    grid: Grid,
    world: World,
    now_ms: f64,

    explosions: ExplosionSystem,
    shakes: ImpactShakeSystem,
    projectiles: ProjectileSystem,
    drops: DropMissileSystem,
    secondaries: SecondaryMissileSystem,

    layouts: LayoutManager,
    placed: Vec<PlacedCube>,
    targeting: TargetingSystem,
    cells: GridCellManager,
    counter: TargetCubeCounter,
    turns: GameTurnManager,
    /// Fireworks targets, hidden until struck
    loose_targets: Vec<VisualId>,
}

impl ShootGame {
    /// Build the game on the default layout
    pub fn new(
        scene: Box<dyn Scene>,
        frames: Box<dyn FrameSource>,
        tuning: Tuning,
        seed: u64,
    ) -> Self {
        let grid = Grid::from(tuning.grid);
        let cell_size = tuning.grid.cell_size;

        let mut game = Self {
            explosions: ExplosionSystem::new(
                tuning.explosion,
                tuning.particles,
                cell_size,
                tuning.grid.ground_y,
            ),
            shakes: ImpactShakeSystem::new(tuning.shake, cell_size),
            projectiles: ProjectileSystem::new(&tuning),
            drops: DropMissileSystem::new(&tuning),
            secondaries: SecondaryMissileSystem::new(tuning.secondary_missile.clone(), cell_size),
            layouts: LayoutManager::new(&tuning.grid),
            placed: Vec::new(),
            targeting: TargetingSystem::default(),
            cells: GridCellManager::new(grid.columns, grid.rows),
            counter: TargetCubeCounter::new(),
            turns: GameTurnManager::new(),
            loose_targets: Vec::new(),
            world: World {
                scene,
                clock: AnimationClock::new(frames),
                rng: Pcg32::seed_from_u64(seed),
                events: Vec::new(),
            },
            now_ms: 0.0,
            grid,
            tuning,
        };
        game.place_layout();
        log::info!(
            "Shoot game ready: {}x{} grid, layout \"{}\"",
            game.grid.columns,
            game.grid.rows,
            game.layouts.current_key()
        );
        game
    }

    // === Accessors ===

    pub fn scene(&self) -> &dyn Scene {
        self.world.scene.as_ref()
    }

    pub fn clock(&self) -> &AnimationClock<Channel> {
        &self.world.clock
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn cells(&self) -> &GridCellManager {
        &self.cells
    }

    pub fn counter(&self) -> &TargetCubeCounter {
        &self.counter
    }

    pub fn counter_mut(&mut self) -> &mut TargetCubeCounter {
        &mut self.counter
    }

    pub fn turns(&self) -> &GameTurnManager {
        &self.turns
    }

    pub fn turns_mut(&mut self) -> &mut GameTurnManager {
        &mut self.turns
    }

    pub fn layouts(&self) -> &LayoutManager {
        &self.layouts
    }

    pub fn explosions(&self) -> &ExplosionSystem {
        &self.explosions
    }

    /// Visual of the layout cube named `key`
    pub fn cube(&self, key: &str) -> Option<VisualId> {
        self.placed.iter().find(|c| c.key == key).map(|c| c.visual)
    }

    pub fn enemies(&self) -> &[VisualId] {
        self.targeting.enemies()
    }

    /// True when nothing is in flight and every effect has finished
    pub fn is_idle(&self) -> bool {
        self.world.clock.is_empty()
    }

    /// Host time (ms) used to stamp records spawned by input between frames
    pub fn set_now(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    // === Configuration ===

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.explosions
            .set_particle_cap(Some(settings.max_particles_per_burst()));
        self.shakes.set_enabled(settings.effective_screen_shake());
        log::debug!(
            "Settings applied: quality {}, shake {}",
            settings.quality.as_str(),
            settings.effective_screen_shake()
        );
    }

    /// Swap the board layout. Unknown keys keep the current one.
    pub fn load_layout(&mut self, key: &str) {
        if self.layouts.current_key() == key {
            return;
        }
        let previous = self.layouts.current_key().to_string();
        self.layouts.load_layout(key);
        if self.layouts.current_key() == previous {
            return;
        }
        for cube in self.placed.drain(..) {
            self.world.scene.remove(cube.visual);
        }
        self.place_layout();
    }

    fn place_layout(&mut self) {
        let cell_size = self.grid.cell_size;
        let ground_y = self.tuning.grid.ground_y;
        let mut enemies = Vec::new();

        for descriptor in self.layouts.current_layout() {
            let size = cell_size * descriptor.size_scale;
            let center = self.grid.cell_to_world(descriptor.cell);
            let position = Vec3::new(center.x, ground_y - size / 2.0, center.z);
            let visual = self
                .world
                .scene
                .add(Visual::cube(size, &descriptor.color).with_position(position));
            if descriptor.role == CubeRole::Enemy {
                enemies.push(visual);
            }
            self.placed.push(PlacedCube {
                key: descriptor.key.clone(),
                role: descriptor.role,
                visual,
            });
        }

        self.targeting = TargetingSystem::new(enemies);
    }

    fn cube_with_role(&self, role: CubeRole) -> Option<VisualId> {
        self.placed.iter().find(|c| c.role == role).map(|c| c.visual)
    }

    // === Actions ===

    /// Fire the default missile between two cubes
    pub fn fire(&mut self, source: VisualId, target: VisualId) -> Option<VisualId> {
        let now = self.now_ms;
        self.projectiles.fire(source, target, now, &mut self.world.ctx())
    }

    pub fn fire_at_random_enemy(&mut self, source: VisualId) -> Option<VisualId> {
        let Some(target) = self.targeting.pick_random_enemy(&mut self.world.rng) else {
            log::warn!("No enemy to target");
            return None;
        };
        self.fire(source, target)
    }

    /// Trigger the layout cube named `key` the way a click would.
    /// Returns how many projectiles were launched.
    pub fn activate(&mut self, key: &str) -> usize {
        let Some(cube) = self.placed.iter().find(|c| c.key == key).cloned() else {
            log::warn!("No cube \"{}\" in layout \"{}\"", key, self.layouts.current_key());
            return 0;
        };
        match cube.role {
            CubeRole::LeftShooter => self
                .cube_with_role(CubeRole::RightShooter)
                .and_then(|target| self.fire(cube.visual, target))
                .map_or(0, |_| 1),
            CubeRole::RightShooter => self.fire_at_random_enemy(cube.visual).map_or(0, |_| 1),
            CubeRole::Obstacle => self.fireworks_burst(),
            CubeRole::Enemy => 0,
        }
    }

    /// Launch a volley from the obstacle at hidden targets on random cells
    pub fn fireworks_burst(&mut self) -> usize {
        let Some(obstacle) = self.cube_with_role(CubeRole::Obstacle) else {
            log::warn!("Fireworks need an obstacle");
            return 0;
        };
        let size = self.grid.cell_size * self.tuning.sizes.target_cube;

        let mut launched = 0;
        for _ in 0..self.tuning.fireworks_count {
            let kind = TargetKind::random(&mut self.world.rng);
            let cell = Cell::new(
                self.world.rng.random_range(0..self.grid.columns),
                self.world.rng.random_range(0..self.grid.rows),
            );
            let target = self.world.scene.add(
                Visual::cube(size, kind.color())
                    .with_position(self.grid.cell_to_world(cell))
                    .with_opacity(0.0),
            );
            self.loose_targets.push(target);
            if self.fire(obstacle, target).is_some() {
                launched += 1;
            }
        }
        log::debug!("Fireworks burst: {} projectiles", launched);
        launched
    }

    /// Release a drop missile over world point (`x`, `z`)
    pub fn drop_missile(&mut self, x: f32, z: f32) -> VisualId {
        self.drops.drop_missile(x, z, &mut self.world.ctx())
    }

    pub fn drop_missile_on(&mut self, cell: Cell) -> VisualId {
        let center = self.grid.cell_to_world(cell);
        self.drop_missile(center.x, center.z)
    }

    pub fn next_turn(&mut self) -> u32 {
        self.turns.next_turn()
    }

    /// Remove stacked and fireworks cubes and zero the tallies
    pub fn reset_board(&mut self) {
        let (columns, rows) = (self.grid.columns, self.grid.rows);
        for cell in (0..rows).flat_map(|row| (0..columns).map(move |col| Cell::new(col, row))) {
            for cube in self.cells.clear_cell(cell) {
                self.world.scene.remove(cube.visual);
            }
        }
        for target in self.loose_targets.drain(..) {
            self.world.scene.remove(target);
        }
        self.counter.reset();
    }

    // === Frame loop ===

    /// Host frame callback
    pub fn on_frame(&mut self, time_ms: f64) {
        self.now_ms = time_ms;

        for channel in self.world.clock.begin_tick() {
            let ctx = &mut self.world.ctx();
            match channel {
                Channel::Projectiles => {
                    self.projectiles
                        .tick(time_ms, &mut self.explosions, &mut self.shakes, ctx)
                }
                Channel::DropMissiles => self.drops.tick(time_ms, &mut self.explosions, ctx),
                Channel::SecondaryMissiles => self.secondaries.tick(ctx),
                Channel::Explosions => self.explosions.tick(time_ms, ctx),
                Channel::Shakes => self.shakes.tick(time_ms, ctx),
            }
        }
        self.world.clock.end_tick();

        self.process_events();
    }

    fn process_events(&mut self) {
        for event in std::mem::take(&mut self.world.events) {
            match event {
                MotionEvent::ProjectileImpact { target, .. } => {
                    log::debug!("Projectile struck {:?}", target);
                }
                MotionEvent::MissileHit { x, z } => self.scatter_cascade(x, z),
                MotionEvent::MissileArrival { x, z } => self.stack_target(x, z),
            }
        }
    }

    fn scatter_cascade(&mut self, x: f32, z: f32) {
        let cascade = self.tuning.cascade;
        let center = self.grid.world_to_cell(x, z);
        let cells = scatter_cells(
            center,
            cascade.radius,
            cascade.count,
            cascade.policy,
            &self.grid,
            &mut self.world.rng,
        );
        log::debug!("Drop hit {:?}: {} secondary missiles", center, cells.len());

        for cell in cells {
            let target = self.grid.cell_to_world(cell);
            self.secondaries
                .launch_default(x, z, target.x, target.z, &mut self.world.ctx());
        }
    }

    /// Edge of a stacked sub-cube: four per cell level with margins around them
    fn sub_cube_size(&self) -> f32 {
        let margin = self.tuning.cascade.sub_cube_margin;
        ((self.grid.cell_size - 3.0 * margin) / 2.0).max(1.0)
    }

    /// World center of the `index`-th cube stacked on `cell`
    fn sub_cube_position(&self, cell: Cell, index: usize) -> Vec3 {
        let margin = self.tuning.cascade.sub_cube_margin;
        let size = self.sub_cube_size();
        let (sub_col, sub_row, level) = sub_position(index);
        let center = self.grid.cell_to_world(cell);
        let corner = -self.grid.cell_size / 2.0 + margin + size / 2.0;
        Vec3::new(
            center.x + corner + sub_col as f32 * (size + margin),
            self.tuning.grid.ground_y - size / 2.0 - level as f32 * (size + margin),
            center.z + corner + sub_row as f32 * (size + margin),
        )
    }

    fn stack_target(&mut self, x: f32, z: f32) {
        let cell = self.grid.world_to_cell(x, z);
        let kind = TargetKind::random(&mut self.world.rng);
        let size = self.sub_cube_size();
        let position = self.sub_cube_position(cell, self.cells.stack_height(cell));
        let visual = self
            .world
            .scene
            .add(Visual::cube(size, kind.color()).with_position(position));

        if self.cells.add_cube_to_cell(cell, visual, kind).is_some() {
            self.counter.increment(kind);
        } else {
            self.world.scene.remove(visual);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::settings::QualityPreset;
    use crate::sim::{ManualFrameSource, MemoryScene};

    fn game() -> ShootGame {
        ShootGame::new(
            Box::new(MemoryScene::new()),
            Box::new(ManualFrameSource::new()),
            Tuning::standard(),
            7,
        )
    }

    /// Step 16ms frames while the clock wants them; returns the final time
    fn run(game: &mut ShootGame, mut time: f64, max_frames: usize) -> f64 {
        for _ in 0..max_frames {
            if !game.clock().is_running() {
                break;
            }
            time += 16.0;
            game.on_frame(time);
        }
        time
    }

    #[test]
    fn test_full_layout_is_placed() {
        let game = game();
        assert_eq!(game.scene().len(), 5);
        assert_eq!(game.enemies().len(), 2);
        let obstacle = game.cube("obstacle").unwrap();
        assert_eq!(game.scene().pose(obstacle).unwrap().position, Vec3::new(20.0, -20.0, 20.0));
        assert!(!game.clock().is_running());
    }

    #[test]
    fn test_left_shooter_hits_right_shooter() {
        let mut game = game();
        let right = game.cube("rightShooter").unwrap();
        let rest = game.scene().pose(right).unwrap();

        assert_eq!(game.activate("leftShooter"), 1);
        assert!(game.clock().is_running());
        run(&mut game, 0.0, 400);

        assert!(game.is_idle());
        assert!(!game.clock().is_running());
        assert_eq!(game.explosions().bursts_spawned(), 1);
        // Projectile, debris and ring are gone; the struck cube is back at rest
        assert_eq!(game.scene().len(), 5);
        assert_eq!(game.scene().pose(right).unwrap(), rest);
    }

    #[test]
    fn test_fireworks_reveal_hidden_targets() {
        let mut game = game();
        assert_eq!(game.activate("obstacle"), 10);
        assert_eq!(game.scene().len(), 5 + 10 + 10);
        for &target in &game.loose_targets {
            assert_eq!(game.scene().opacity(target), Some(0.0));
        }

        run(&mut game, 0.0, 400);
        assert!(game.is_idle());
        assert_eq!(game.scene().len(), 5 + 10);
        for &target in &game.loose_targets {
            assert_eq!(game.scene().opacity(target), Some(1.0));
        }

        game.reset_board();
        assert_eq!(game.scene().len(), 5);
    }

    #[test]
    fn test_default_tuning_fireworks_volley() {
        let mut game = ShootGame::new(
            Box::new(MemoryScene::new()),
            Box::new(ManualFrameSource::new()),
            Tuning::default(),
            7,
        );
        assert_eq!(game.activate("obstacle"), 10);

        let mut quiet = ShootGame::new(
            Box::new(MemoryScene::new()),
            Box::new(ManualFrameSource::new()),
            Tuning {
                fireworks_count: 0,
                ..Tuning::default()
            },
            7,
        );
        assert_eq!(quiet.activate("obstacle"), 0);
        assert!(!quiet.clock().is_running());
    }

    #[test]
    fn test_drop_missile_cascade_stacks_cubes() {
        let mut game = game();
        let totals = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&totals);
        game.counter_mut()
            .subscribe(move |counts| sink.borrow_mut().push(counts.values().sum::<u32>()));

        let center = Cell::new(10, 10);
        game.drop_missile_on(center);
        run(&mut game, 0.0, 400);

        assert!(game.is_idle());
        assert_eq!(game.cells().total_cube_count(), 10);
        assert_eq!(game.counter().total(), 10);
        assert_eq!(*totals.borrow(), (1..=10).collect::<Vec<u32>>());
        for col in 7..=13 {
            for row in 7..=13 {
                for cube in game.cells().cell_content(Cell::new(col, row)) {
                    assert!(game.scene().contains(cube.visual));
                }
            }
        }
        assert_eq!(game.scene().len(), 5 + 10);

        game.reset_board();
        assert_eq!(game.cells().total_cube_count(), 0);
        assert_eq!(game.counter().total(), 0);
        assert_eq!(game.scene().len(), 5);
    }

    #[test]
    fn test_sub_cubes_fill_cell_then_stack() {
        let game = game();
        let cell = Cell::new(0, 0);
        let center = game.grid().cell_to_world(cell);
        let first = game.sub_cube_position(cell, 0);
        let fourth = game.sub_cube_position(cell, 3);
        let fifth = game.sub_cube_position(cell, 4);

        assert_eq!(game.sub_cube_size(), 17.0);
        assert_eq!(first, Vec3::new(center.x - 9.5, -8.5, center.z - 9.5));
        assert_eq!(fourth, Vec3::new(center.x + 9.5, -8.5, center.z + 9.5));
        assert_eq!(fifth, Vec3::new(first.x, -27.5, first.z));
    }

    #[test]
    fn test_minimal_layout_has_no_enemies() {
        let mut game = game();
        game.load_layout("minimal");
        assert_eq!(game.scene().len(), 1);
        assert!(game.enemies().is_empty());
        assert_eq!(game.activate("rightShooter"), 0);

        let obstacle = game.cube("obstacle").unwrap();
        assert_eq!(game.fire_at_random_enemy(obstacle), None);
        assert_eq!(game.scene().pose(obstacle).unwrap().position.y, -40.0);

        game.load_layout("bogus");
        assert_eq!(game.layouts().current_key(), "minimal");
        assert_eq!(game.scene().len(), 1);
    }

    #[test]
    fn test_settings_cap_particles_and_disable_shake() {
        let mut game = game();
        let settings = Settings {
            reduced_motion: true,
            ..Settings::from_preset(QualityPreset::Low)
        };
        game.apply_settings(&settings);

        game.activate("leftShooter");
        // Projectile lands after 1200ms
        let mut time = 0.0;
        while game.explosions().bursts_spawned() == 0 {
            time += 16.0;
            game.on_frame(time);
        }
        assert_eq!(game.explosions().active_particles().len(), 6);
        assert!(!game.clock().contains(Channel::Shakes));
    }

    #[test]
    fn test_next_turn() {
        let mut game = game();
        assert_eq!(game.turns().current_turn(), 1);
        assert_eq!(game.next_turn(), 2);
    }
}
