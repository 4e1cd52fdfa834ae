//! Cube Barrage entry point
//!
//! Web builds mount the game into the page and drive it from
//! `requestAnimationFrame`. Native builds run a headless demo volley and log
//! what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use cube_barrage::platform::web::{DomScene, FrameCallback, RafFrameSource};
    use cube_barrage::sim::Cell;
    use cube_barrage::{Settings, ShootGame, Tuning};

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Cube Barrage starting...");

        let Some(window) = web_sys::window() else {
            log::error!("no window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("no document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(root) = document.get_element_by_id("scene") else {
            log::error!("no #scene element");
            return;
        };

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(ShootGame::new(
            Box::new(DomScene::new(document, root)),
            Box::new(RafFrameSource::new(callback.clone())),
            Tuning::standard(),
            seed,
        )));
        let settings = Settings::load();
        game.borrow_mut().apply_settings(&settings);
        log::info!("Game initialized with seed: {}", seed);

        // The frame callback only holds a weak handle so dropping the game ends the loop
        {
            let weak = Rc::downgrade(&game);
            *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                if let Some(game) = weak.upgrade() {
                    game.borrow_mut().on_frame(time);
                }
            }));
        }

        setup_keyboard(game, settings);

        log::info!("Cube Barrage running!");
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    fn setup_keyboard(game: Rc<RefCell<ShootGame>>, mut settings: Settings) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            g.set_now(now());
            match event.key().as_str() {
                "1" => {
                    g.activate("leftShooter");
                }
                "2" => {
                    g.activate("rightShooter");
                }
                "f" | "F" => {
                    g.activate("obstacle");
                }
                "d" | "D" => {
                    let grid = *g.grid();
                    let col = (js_sys::Math::random() * grid.columns as f64) as u32;
                    let row = (js_sys::Math::random() * grid.rows as f64) as u32;
                    g.drop_missile_on(Cell::new(col.min(grid.columns - 1), row.min(grid.rows - 1)));
                }
                "n" | "N" => {
                    g.next_turn();
                }
                "l" | "L" => {
                    let next = if g.layouts().current_key() == "full" { "minimal" } else { "full" };
                    g.load_layout(next);
                }
                "r" | "R" => g.reset_board(),
                "q" | "Q" => {
                    let quality = settings.cycle_quality();
                    g.apply_settings(&settings);
                    settings.save();
                    log::info!("Quality: {}", quality.as_str());
                }
                _ => {}
            }
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cube Barrage (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in a browser");

    // Usage: cube-barrage [tuning.json] [low|medium|high]
    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => load_tuning(&path),
        None => cube_barrage::Tuning::standard(),
    };
    let mut settings = cube_barrage::Settings::load();
    if let Some(name) = args.next() {
        match cube_barrage::QualityPreset::from_str(&name) {
            Some(preset) => {
                settings.quality = preset;
                settings.save();
            }
            None => log::warn!(
                "Unknown quality preset '{}'; using {}",
                name,
                settings.quality.as_str()
            ),
        }
    }
    run_demo(tuning, &settings);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> cube_barrage::Tuning {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| cube_barrage::Tuning::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Could not load tuning from {}: {}; using defaults", path, e);
            cube_barrage::Tuning::standard()
        }
    }
}

/// Fire one of everything and step 60 fps frames until every effect ends
#[cfg(not(target_arch = "wasm32"))]
fn run_demo(tuning: cube_barrage::Tuning, settings: &cube_barrage::Settings) {
    use cube_barrage::ShootGame;
    use cube_barrage::sim::{Cell, ManualFrameSource, MemoryScene};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 30;

    let mut game = ShootGame::new(
        Box::new(MemoryScene::new()),
        Box::new(ManualFrameSource::new()),
        tuning,
        0xC0BE,
    );
    game.apply_settings(settings);

    let fired = game.activate("leftShooter")
        + game.activate("rightShooter")
        + game.activate("obstacle");
    let center = Cell::new(game.grid().columns / 2, game.grid().rows / 2);
    game.drop_missile_on(center);
    log::info!("Launched {} projectiles and 1 drop missile", fired);

    let mut time = 0.0;
    let mut frames = 0;
    while game.clock().is_running() && frames < MAX_FRAMES {
        time += FRAME_MS;
        frames += 1;
        game.on_frame(time);
        if frames % 30 == 0 {
            log::debug!(
                "t={:.0}ms visuals={} listeners={}",
                time,
                game.scene().len(),
                game.clock().len()
            );
        }
    }

    log::info!(
        "Settled after {} frames ({:.2}s): {} explosions, {} stacked cubes, {} visuals left",
        frames,
        time / 1000.0,
        game.explosions().bursts_spawned(),
        game.cells().total_cube_count(),
        game.scene().len()
    );
    for (kind, count) in game.counter().counts() {
        if *count > 0 {
            log::info!("  {} ({}): {}", kind.key(), kind.color(), count);
        }
    }
    game.next_turn();
}
