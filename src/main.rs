//! Merge Balls entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlCanvasElement, MouseEvent, TouchEvent};

    use merge_balls::platform::{self, KeyValueStore, LocalStore, MemoryStore};
    use merge_balls::renderer::{CanvasRenderer, SpriteAtlas};
    use merge_balls::sim::{FixedStep, GameSession, tick};
    use merge_balls::ui::{DomScoreDisplay, GameOverDialog};
    use merge_balls::{GameConfig, Layout};

    struct Game {
        session: GameSession,
        renderer: CanvasRenderer,
        dialog: GameOverDialog,
        clock: FixedStep,
        // Dialog already shown for the current run
        dialog_shown: bool,
    }

    impl Game {
        /// Run simulation ticks for this frame
        fn update(&mut self, time: f64) {
            let steps = self.clock.advance(time);
            let now = platform::now_ms();
            for _ in 0..steps {
                match tick(&mut self.session, now) {
                    Ok(outcome) => {
                        if let Some(report) = outcome.game_over {
                            log::info!(
                                "Final score {} (best {})",
                                report.final_score,
                                report.high_score
                            );
                        }
                    }
                    Err(e) => log::error!("Tick failed: {}", e),
                }
            }
        }

        /// Render the current frame and raise the dialog once a run ends
        fn render(&mut self) {
            if let Err(e) = self.renderer.render(&self.session) {
                log::warn!("Render error: {}", e);
            }

            if self.session.is_over() && !self.dialog_shown {
                let screenshot = match self.renderer.screenshot() {
                    Ok(url) => Some(url),
                    Err(e) => {
                        log::warn!("Screenshot failed: {}", e);
                        None
                    }
                };
                self.dialog.show(screenshot.as_deref());
                self.dialog_shown = true;
            }
        }

        fn restart(&mut self) {
            self.dialog.hide();
            self.dialog_shown = false;
            self.clock.reset();
            self.session.restart();
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{}; scores will not persist", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| e.to_string())?;

        log::info!("Merge Balls starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let viewport_w = window.inner_width()?.as_f64().unwrap_or(0.0) as f32;
        let viewport_h = window.inner_height()?.as_f64().unwrap_or(0.0) as f32;
        let layout = Layout::from_viewport(viewport_w, viewport_h);

        let scene = document.get_element_by_id("scene").ok_or("no #scene")?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        scene.append_child(&canvas)?;

        let sprites = SpriteAtlas::preload().map_err(|e| e.to_string())?;
        let renderer = CanvasRenderer::new(canvas, &layout, sprites).map_err(|e| e.to_string())?;
        let dialog = GameOverDialog::new().map_err(|e| e.to_string())?;
        let display = DomScoreDisplay::new().map_err(|e| e.to_string())?;

        let mut store = open_store();
        let config = GameConfig::load_or_init(store.as_mut());
        let seed = js_sys::Date::now() as u64;
        let session = GameSession::new(config, layout, store, Box::new(display), seed)
            .map_err(|e| e.to_string())?;

        let game = Rc::new(RefCell::new(Game {
            session,
            renderer,
            dialog,
            clock: FixedStep::new(),
            dialog_shown: false,
        }));

        setup_input_handlers(&scene, game.clone());
        setup_restart_button(game.clone());
        setup_resize_reload();

        request_animation_frame(game);

        log::info!("Merge Balls running!");
        Ok(())
    }

    /// x of a touch relative to the scene
    fn touch_x(scene: &Element, event: &TouchEvent, changed: bool) -> Option<f32> {
        let list = if changed {
            event.changed_touches()
        } else {
            event.touches()
        };
        let touch = list.get(0)?;
        let rect = scene.get_bounding_client_rect();
        Some(touch.client_x() as f32 - rect.left() as f32)
    }

    fn setup_input_handlers(scene: &Element, game: Rc<RefCell<Game>>) {
        // Mouse move - aim
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.session.held().is_none() {
                    return;
                }
                event.prevent_default();
                g.session.aim(event.offset_x() as f32);
            });
            let _ = scene
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move - aim
        {
            let game = game.clone();
            let scene_clone = scene.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.session.held().is_none() {
                    return;
                }
                event.prevent_default();
                if let Some(x) = touch_x(&scene_clone, &event, false) {
                    g.session.aim(x);
                }
            });
            let _ = scene
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up - drop
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let now = platform::now_ms();
                game.borrow_mut()
                    .session
                    .release(event.offset_x() as f32, now);
            });
            let _ = scene
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end - drop
        {
            let scene_clone = scene.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(x) = touch_x(&scene_clone, &event, true) {
                    let now = platform::now_ms();
                    game.borrow_mut().session.release(x, now);
                }
            });
            let _ = scene
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Board size is fixed at startup, so a resize starts a fresh page
    fn setup_resize_reload() {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(window) = web_sys::window() {
                let _ = window.location().reload();
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Merge Balls (native) starting...");
    log::info!("Native mode runs a headless autoplay - use `trunk serve` for the web version");

    match headless::autoplay(0x5eed, 200) {
        Ok(summary) => println!(
            "Autoplay finished after {} drops: score {}, {} merges, highest rank {}{}",
            summary.drops,
            summary.score,
            summary.merges,
            summary.highest_rank,
            if summary.game_over { " (game over)" } else { "" }
        ),
        Err(e) => {
            log::error!("Autoplay failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use merge_balls::platform::MemoryStore;
    use merge_balls::sim::{GameSession, NullDisplay, tick};
    use merge_balls::{GameConfig, Layout, Result};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const DROP_EVERY_MS: f64 = 600.0;
    /// Give up after this much virtual time without a game over
    const TIME_LIMIT_MS: f64 = 30.0 * 60.0 * 1000.0;

    pub struct Summary {
        pub drops: u32,
        pub merges: usize,
        pub score: u64,
        pub highest_rank: u8,
        pub game_over: bool,
    }

    /// Drop balls at random x on a wide board until the run ends or
    /// `max_drops` balls have been dropped
    pub fn autoplay(seed: u64, max_drops: u32) -> Result<Summary> {
        let mut session = GameSession::new(
            GameConfig::default(),
            Layout::wide(),
            Box::new(MemoryStore::new()),
            Box::new(NullDisplay),
            seed,
        )?;
        let mut rng = Pcg32::seed_from_u64(seed ^ 0xd20b);

        let mut now = 0.0;
        let mut next_drop = DROP_EVERY_MS;
        let mut drops = 0;
        let mut merges = 0;
        let mut highest_rank = 0;

        while !session.is_over() && now < TIME_LIMIT_MS {
            if now >= next_drop && drops < max_drops && session.held().is_some() {
                let x = rng.random_range(0.0..session.layout().width);
                session.aim(x);
                session.release(x, now);
                drops += 1;
                next_drop = now + DROP_EVERY_MS;
            }

            let outcome = tick(&mut session, now)?;
            for merge in &outcome.merges {
                highest_rank = highest_rank.max(merge.rank.value());
            }
            merges += outcome.merges.len();
            now += FRAME_MS;

            if drops >= max_drops && session.held().is_some() {
                break;
            }
        }

        Ok(Summary {
            drops,
            merges,
            score: session.score(),
            highest_rank,
            game_over: session.is_over(),
        })
    }
}
