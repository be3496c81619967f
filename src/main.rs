//! Exterminator entry point
//!
//! The wasm build wires the simulation to the page: DOM bug elements, HUD
//! counters, the start/again buttons and Web Audio feedback. The native
//! build runs a headless autoplay session as a smoke harness.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element};

    use exterminator::Settings;
    use exterminator::audio::{AudioManager, SoundEffect};
    use exterminator::consts::*;
    use exterminator::sim::{Bug, BugKind, GameEvent, GamePhase, GameSession, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        input: TickInput,
        audio: AudioManager,
        settings: Settings,
        /// DOM element per on-screen bug, keyed by entity id
        sprites: HashMap<u32, Element>,
        /// Tap queue shared with the per-sprite event listeners
        taps: Rc<RefCell<Vec<u32>>>,
        accumulator: f32,
        last_time: f64,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                session: GameSession::new(seed, settings.difficulty.tuning()),
                input: TickInput::default(),
                audio,
                settings,
                sprites: HashMap::new(),
                taps: Rc::new(RefCell::new(Vec::new())),
                accumulator: 0.0,
                last_time: 0.0,
                last_phase: GamePhase::Idle,
            }
        }

        /// Run simulation ticks and apply the resulting events to the page
        fn update(&mut self, document: &Document, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.input.squashes.append(&mut self.taps.borrow_mut());
                let input = std::mem::take(&mut self.input);
                tick(&mut self.session, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            // A fresh run starts with an empty board
            if self.session.phase == GamePhase::Playing && self.last_phase != GamePhase::Playing {
                self.clear_sprites();
            }
            self.last_phase = self.session.phase;

            for event in self.session.drain_events() {
                self.apply_event(document, event);
            }
        }

        fn apply_event(&mut self, document: &Document, event: GameEvent) {
            match event {
                GameEvent::Spawned { id, .. } => {
                    if let Some(bug) = self.session.bugs.iter().find(|b| b.id == id) {
                        let bug = bug.clone();
                        self.spawn_sprite(document, &bug);
                    }
                    self.audio.play(SoundEffect::Spawn);
                }
                GameEvent::Squashed { id, kind, .. } => {
                    if let Some(el) = self.sprites.get(&id) {
                        let _ = el.class_list().add_1("squashed");
                    }
                    self.audio.play(SoundEffect::Squash {
                        fast: kind == BugKind::Fast,
                    });
                }
                GameEvent::Escaped { .. } => {}
                GameEvent::Retired { id } => {
                    if let Some(el) = self.sprites.remove(&id) {
                        el.remove();
                    }
                }
                GameEvent::Won { score } => {
                    self.clear_sprites();
                    set_text(document, "finalScore", &score.to_string());
                    self.audio.play(SoundEffect::Victory);
                }
                GameEvent::Lost { score } => {
                    self.clear_sprites();
                    set_text(document, "finalScoreLose", &score.to_string());
                    self.audio.play(SoundEffect::Defeat);
                }
            }
        }

        /// Create the DOM element for a freshly spawned bug
        fn spawn_sprite(&mut self, document: &Document, bug: &Bug) {
            let Ok(el) = document.create_element("div") else {
                return;
            };
            let class = match bug.kind {
                BugKind::Regular => "bug regular",
                BugKind::Fast => "bug fast",
            };
            el.set_class_name(class);

            if let Some(html) = el.dyn_ref::<web_sys::HtmlElement>() {
                let style = html.style();
                let _ = style.set_property("left", &format!("{}vw", bug.x));
                let _ = style.set_property(
                    "animation",
                    &format!("rise {}s linear forwards", bug.lifetime),
                );
                let _ = style.set_property("z-index", &bug.depth.to_string());
            }

            // Only the first tap per bug matters; the sim guard absorbs the rest
            let taps = self.taps.clone();
            let id = bug.id;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.stop_propagation();
                taps.borrow_mut().push(id);
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            let _ =
                el.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();

            if let Some(container) = document.get_element_by_id("game") {
                let _ = container.append_child(&el);
            }
            let _ = self.sprites.insert(bug.id, el);
        }

        fn clear_sprites(&mut self) {
            for (_, el) in self.sprites.drain() {
                el.remove();
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            set_text(document, "scoreVal", &self.session.score.to_string());
            set_text(document, "missVal", &self.session.misses.to_string());

            let phase = self.session.phase;
            set_hidden(document, "startScreen", phase != GamePhase::Idle);
            set_hidden(document, "winScreen", phase != GamePhase::Won);
            set_hidden(document, "loseScreen", phase != GamePhase::Lost);
            set_hidden(document, "hud", phase == GamePhase::Idle);
            set_hidden(document, "game", phase == GamePhase::Idle);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let result = if hidden {
                el.class_list().add_1("hidden")
            } else {
                el.class_list().remove_1("hidden")
            };
            let _ = result;
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Exterminator starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));

        log::info!("Game initialized with seed: {seed}");

        setup_buttons(&document, game.clone());
        setup_auto_mute(game.clone());

        request_animation_frame(game);

        log::info!("Exterminator running!");
    }

    /// Play / play-again / try-again all issue the same start command
    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["playBtn", "againBtn", "tryBtn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    let mut g = game.borrow_mut();
                    g.input.start = true;
                    // User gesture - a good moment to unlock audio
                    g.audio.resume();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Suspend audio while the tab is hidden
    fn setup_auto_mute(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let g = game.borrow();
                if g.settings.mute_on_blur {
                    g.audio.suspend();
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            let document = web_sys::window().unwrap().document().unwrap();
            g.update(&document, dt);
            g.update_hud(&document);
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
    use exterminator::Settings;
    use exterminator::consts::SIM_DT;
    use exterminator::sim::{GamePhase, GameSession, TickInput, tick};

    env_logger::init();
    log::info!("Exterminator (native) starting...");

    // Headless autoplay: squash everything past the halfway mark and see
    // how the session ends. The web version is the real game.
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1);
    let settings = Settings::load();
    let mut session = GameSession::new(seed, settings.difficulty.tuning());
    session.start();

    while session.phase == GamePhase::Playing && session.time_ticks < 1_000_000 {
        let squashes: Vec<u32> = session
            .bugs
            .iter()
            .filter(|b| b.is_alive() && b.rise_progress() > 0.5)
            .map(|b| b.id)
            .collect();
        let input = TickInput {
            squashes,
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT);
        let _ = session.drain_events();
    }

    println!(
        "Session over: {:?} with {} points and {} misses after {:.1}s",
        session.phase,
        session.score,
        session.misses,
        session.time_ticks as f32 * SIM_DT
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
