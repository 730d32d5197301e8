//! Vax Runner entry point
//!
//! Handles platform-specific initialization and runs the per-frame loop.
//! Everything here is presentation glue: the sim core only ever sees a
//! clamped frame delta and a `TickInput` built from keyboard/touch events.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use vax_runner::consts::*;
    use vax_runner::sim::{GameEvent, GameState, GameStatus, TickInput, tick};
    use vax_runner::stats::PersistentStats;

    /// Game instance holding all state the shell needs between frames
    struct Game {
        state: GameState,
        input: TickInput,
        last_time: f64,
        touch_start: (f32, f32),
    }

    impl Game {
        fn new(seed: u64, stats: PersistentStats) -> Self {
            Self {
                state: GameState::new(seed, stats),
                input: TickInput::default(),
                last_time: 0.0,
                touch_start: (0.0, 0.0),
            }
        }

        /// Run one simulation frame from a requestAnimationFrame timestamp
        fn update(&mut self, time: f64) {
            let raw_dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                1.0 / 60.0
            };
            self.last_time = time;
            // A backgrounded tab or GC stall must not teleport the world
            let dt = raw_dt.clamp(0.0, MAX_FRAME_DELTA);

            let input = self.input;
            tick(&mut self.state, &input, dt);
            self.input = TickInput::default();

            for event in self.state.drain_events() {
                signal(&event);
            }
            if self.state.take_stats_dirty() {
                self.state.stats.save();
            }
        }

        fn start(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.state.start_game(seed);
        }

        /// Classify a touch swipe into one of the four directional intents
        fn classify_swipe(&mut self, end_x: f32, end_y: f32) {
            let dx = end_x - self.touch_start.0;
            let dy = end_y - self.touch_start.1;
            let threshold = 30.0;

            if dx.abs() > dy.abs() {
                if dx.abs() > threshold {
                    self.input.move_lane = if dx > 0.0 { 1 } else { -1 };
                }
            } else if dy.abs() > threshold {
                if dy < 0.0 {
                    self.input.jump = true;
                } else {
                    self.input.slide = true;
                }
            }
        }
    }

    /// Forward a fire-and-forget sim signal to the cosmetic layer
    fn signal(event: &GameEvent) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        match event {
            GameEvent::Hit { .. } => {
                if let Some(el) = document.get_element_by_id("screen-flash") {
                    let _ = el.class_list().remove_1("flash");
                    let _ = el.class_list().add_1("flash");
                }
            }
            GameEvent::Collected { color, .. } => {
                if let Some(el) = document.get_element_by_id("hud-vaccines") {
                    let _ = el.set_attribute("class", "hud-item pop");
                    let _ = el.set_attribute("data-color", &format!("#{color:06X}"));
                }
            }
        }
    }

    fn set_hidden(document: &web_sys::Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn set_text(document: &web_sys::Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Mirror the store's output surface into the DOM HUD
    fn update_hud(game: &Game) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let state = &game.state;

        set_text(&document, "#hud-score .hud-value", &state.score.to_string());
        set_text(
            &document,
            "#hud-time .hud-value",
            &format!("{:.0}", state.time_left.ceil()),
        );
        set_text(
            &document,
            "#hud-vaccines .hud-value",
            &format!("{}/{MAX_VACCINES}", state.vaccine_count),
        );
        set_text(&document, "#hud-level .hud-value", &state.level.to_string());

        set_hidden(&document, "menu", state.status != GameStatus::Menu);
        set_hidden(&document, "pause-menu", state.status != GameStatus::Paused);
        set_hidden(&document, "game-over", state.status != GameStatus::GameOver);
        set_hidden(&document, "victory", state.status != GameStatus::Victory);
        set_hidden(&document, "stats-screen", state.status != GameStatus::Stats);
        set_hidden(&document, "milestone-popup", !state.show_level_up_popup);

        let counting = state.countdown_value > 0;
        set_hidden(&document, "countdown", !counting);
        if counting {
            set_text(&document, "#countdown", &state.countdown_value.to_string());
        }

        if state.status == GameStatus::GameOver || state.status == GameStatus::Victory {
            set_text(&document, "#final-score", &state.score.to_string());
            set_text(&document, "#final-bonus", &state.time_bonus.to_string());
        }
        if state.status == GameStatus::Stats {
            let stats = &state.stats;
            set_text(&document, "#stats-score", &stats.total_score.to_string());
            set_text(
                &document,
                "#stats-level",
                &stats.highest_level_reached.to_string(),
            );
            set_text(
                &document,
                "#stats-vaccines",
                &stats.total_vaccines_collected.to_string(),
            );
            set_text(
                &document,
                "#stats-time",
                &format!("{}s", stats.total_play_time_seconds),
            );
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Vax Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let stats = PersistentStats::load();
        let game = Rc::new(RefCell::new(Game::new(seed, stats)));

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Vax Runner running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowUp" | "w" | " " => g.input.jump = true,
                    "ArrowDown" | "s" => g.input.slide = true,
                    "ArrowLeft" | "a" => g.input.move_lane = -1,
                    "ArrowRight" | "d" => g.input.move_lane = 1,
                    "Enter" => g.input.special = true,
                    "Escape" | "p" => g.input.pause = true,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start: remember the origin for swipe classification
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().touch_start =
                        (touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end: bucket the swipe into jump/slide/lane intents
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                if let Some(touch) = event.changed_touches().get(0) {
                    game.borrow_mut()
                        .classify_swipe(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        let on_click = |id: &str, game: Rc<RefCell<Game>>, action: fn(&mut Game)| {
            let document = web_sys::window().unwrap().document().unwrap();
            if let Some(btn) = document.get_element_by_id(id) {
                let closure = Closure::<dyn FnMut(_)>::new(move |_: web_sys::MouseEvent| {
                    action(&mut game.borrow_mut());
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        };

        on_click("start-btn", game.clone(), |g| g.start());
        on_click("restart-btn", game.clone(), |g| g.start());
        on_click("dismiss-btn", game.clone(), |g| g.input.dismiss = true);
        on_click("resume-btn", game.clone(), |g| g.input.pause = true);
        on_click("stats-btn", game.clone(), |g| {
            g.state.status = GameStatus::Stats;
        });
        on_click("back-btn", game.clone(), |g| {
            g.state.status = GameStatus::Menu;
        });

        // Stats reset requires explicit confirmation
        if let Some(btn) = document.get_element_by_id("reset-stats-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_: web_sys::MouseEvent| {
                let confirmed = web_sys::window()
                    .and_then(|w| {
                        w.confirm_with_message("Reset all lifetime stats? This cannot be undone.")
                            .ok()
                    })
                    .unwrap_or(false);
                if confirmed {
                    let mut g = game.borrow_mut();
                    g.state.reset_persistent_stats();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Tab switch or minimize pauses a live run
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.status == GameStatus::Playing {
                        g.input.pause = true;
                        log::info!("auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.status == GameStatus::Playing {
                    g.input.pause = true;
                    log::info!("auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
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
            update_hud(&g);
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use vax_runner::consts::*;
    use vax_runner::sim::{GameState, TickInput, tick};
    use vax_runner::stats::PersistentStats;

    env_logger::init();
    log::info!("Vax Runner (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    // Headless smoke run: a motionless player must still reach a terminal
    // state within the session time budget
    let mut state = GameState::new(42, PersistentStats::load());
    state.start_game(42);

    let dt = 1.0 / 60.0;
    let mut frames = 0u32;
    while !state.status.is_terminal() && frames < 60 * 60 {
        tick(&mut state, &TickInput::default(), dt);
        frames += 1;
    }

    println!(
        "Session ended: {:?} after {:.1}s, score {}, {}/{} vaccines, {} objects live",
        state.status,
        frames as f32 * dt,
        state.score,
        state.vaccine_count,
        MAX_VACCINES,
        state.objects.len()
    );
    assert!(state.status.is_terminal(), "session did not terminate");
    println!("✓ Headless smoke run passed!");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
