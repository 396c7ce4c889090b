//! Chain Pop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent};

    use chain_pop::audio::AudioManager;
    use chain_pop::palette::Color;
    use chain_pop::persistence::LocalStorageScoreStore;
    use chain_pop::platform::web::{AnimationFrameScheduler, DomTextLayer};
    use chain_pop::ports::{InputEvent, Renderer, ScoreStore, TextStyle};
    use chain_pop::renderer::CircleRenderState;
    use chain_pop::sim::Circle;
    use chain_pop::tuning::LevelTuning;
    use chain_pop::{GameContext, GameLoop, Settings};

    type WebLoop = GameLoop<AnimationFrameScheduler, AudioManager, LocalStorageScoreStore>;

    /// GPU circles plus DOM text
    struct WebRenderer {
        gpu: CircleRenderState,
        text: DomTextLayer,
    }

    impl Renderer for WebRenderer {
        fn begin_frame(&mut self) {
            self.gpu.begin_frame();
            self.text.begin();
        }

        fn fill_background(&mut self, color: Color) {
            self.gpu.fill_background(color);
        }

        fn draw_circle(&mut self, circle: &Circle) {
            self.gpu.draw_circle(circle);
        }

        fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle, color: Color) {
            self.text.draw_text(text, x, y, style, color);
        }

        fn end_frame(&mut self) {
            self.gpu.end_frame();
            self.text.end();
        }
    }

    /// Game instance holding all state
    struct App {
        game: WebLoop,
        view: WebRenderer,
        settings: Settings,
    }

    /// CSS size and device pixel size of the canvas
    fn canvas_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> ((f32, f32), (u32, u32), f32) {
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        ((client_w as f32, client_h as f32), (width, height), dpr as f32)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Chain Pop starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let hud: HtmlElement = document
            .get_element_by_id("hud")
            .ok_or("no hud container")?
            .dyn_into()?;

        let ((css_w, css_h), (width, height), dpr) = canvas_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();

        // Initialize WebGPU, falling back to WebGL2
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut gpu = CircleRenderState::new(surface, &adapter, width, height, dpr)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        gpu.set_shadows(settings.circle_shadows);

        // Initialize game
        let store = LocalStorageScoreStore;
        let best = store.load_best_score().unwrap_or(0);
        let seed = js_sys::Date::now() as u64;
        let mut ctx = GameContext::new(
            seed,
            glam::Vec2::new(css_w, css_h),
            LevelTuning::default(),
            best,
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        ctx.set_debug(settings.show_debug);
        log::info!("Game initialized with seed: {}, best score: {}", seed, best);

        let scheduler = AnimationFrameScheduler::new(window.clone());
        let frame_slot = scheduler.callback();
        let audio = AudioManager::new(&settings);

        let app = Rc::new(RefCell::new(App {
            game: GameLoop::new(ctx, scheduler, audio, store),
            view: WebRenderer {
                gpu,
                text: DomTextLayer::new(document.clone(), hud),
            },
            settings,
        }));

        {
            let app = app.clone();
            *frame_slot.borrow_mut() = Some(Closure::new(move |time: f64| {
                let mut guard = app.borrow_mut();
                let App { game, view, .. } = &mut *guard;
                game.frame(time, view);
            }));
        }

        setup_input_handlers(&canvas, app.clone());
        setup_resize(canvas, app.clone());
        setup_auto_pause(app.clone());

        app.borrow_mut().game.start();

        log::info!("Chain Pop running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse click
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut app = app.borrow_mut();
                app.game.audio().resume();
                app.game.handle_input(InputEvent::PointerDown {
                    x: event.offset_x() as f32,
                    y: event.offset_y() as f32,
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(window) = web_sys::window() else {
            return;
        };

        // Pause on key release so a held key does not flicker
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if matches!(event.key().as_str(), "p" | "P") {
                    app.borrow_mut().game.handle_input(InputEvent::PauseToggle);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if matches!(event.key().as_str(), "d" | "D") && !event.repeat() {
                    let mut app = app.borrow_mut();
                    app.game.handle_input(InputEvent::DebugToggle);
                    // Remembered across reloads
                    app.settings.show_debug = !app.settings.show_debug;
                    app.settings.save();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let win = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let ((css_w, css_h), (width, height), dpr) = canvas_size(&win, &canvas);
            canvas.set_width(width);
            canvas.set_height(height);

            let mut app = app.borrow_mut();
            app.view.gpu.resize(width, height, dpr);
            if let Err(e) = app.game.resize(css_w, css_h) {
                log::error!("Resize rejected: {}", e);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut app = app.borrow_mut();
                    if app.settings.pause_on_blur && !app.game.is_paused() {
                        app.game.pause();
                        log::info!("Auto-paused (tab hidden)");
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
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut app = app.borrow_mut();
                if app.settings.pause_on_blur && !app.game.is_paused() {
                    app.game.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Chain Pop failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Chain Pop (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    if let Err(e) = autoplay::run(0xC1C1E, 5) {
        log::error!("Autoplay failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: clicks through a few rounds and logs what happens
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use chain_pop::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
    use chain_pop::persistence::MemoryScoreStore;
    use chain_pop::platform::headless::{ManualScheduler, RecordingRenderer, SilentAudio};
    use chain_pop::ports::{InputEvent, ScoreStore};
    use chain_pop::sim::{CircleState, GamePhase};
    use chain_pop::tuning::LevelTuning;
    use chain_pop::{GameContext, GameLoop, InvalidConfigError};
    use glam::Vec2;

    /// Frames per round before giving up on it
    const FRAME_LIMIT: usize = 60 * 60;

    pub fn run(seed: u64, rounds: u32) -> Result<(), InvalidConfigError> {
        let viewport = Vec2::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        let ctx = GameContext::new(seed, viewport, LevelTuning::default(), 0)?;
        let mut game = GameLoop::new(
            ctx,
            ManualScheduler::default(),
            SilentAudio,
            MemoryScoreStore::default(),
        );
        let mut renderer = RecordingRenderer::default();
        let mut now = 0.0;
        let mut phase = game.ctx().round.phase();
        let mut finished = 0;

        game.start();
        for _ in 0..FRAME_LIMIT * rounds as usize {
            if finished >= rounds {
                break;
            }
            if game.scheduler_mut().fire().is_none() {
                break;
            }
            now += 1000.0 / 60.0;
            game.frame(now, &mut renderer);

            let current = game.ctx().round.phase();
            if current != phase {
                log::info!(
                    "{:?} -> {:?} (round {}/{}, total {})",
                    phase,
                    current,
                    game.ctx().round.round_score(),
                    game.ctx().round.score_goal(),
                    game.ctx().round.total_score()
                );
                if current.is_round_result() {
                    finished += 1;
                }
                phase = current;
            }

            if let Some(target) = pick_click(game.ctx().field.circles(), current) {
                game.handle_input(InputEvent::PointerDown {
                    x: target.x,
                    y: target.y,
                });
            }
        }

        log::info!(
            "Autoplay done: {} rounds, total score {}, best {}",
            finished,
            game.ctx().round.total_score(),
            game.store().load_best_score().unwrap_or(0)
        );
        Ok(())
    }

    /// Where to click next, if anywhere
    fn pick_click(circles: &[chain_pop::sim::Circle], phase: GamePhase) -> Option<Vec2> {
        match phase {
            GamePhase::MainScreen | GamePhase::RoundOver | GamePhase::RepeatLevel | GamePhase::End => {
                Some(Vec2::ZERO)
            }
            GamePhase::Begin | GamePhase::Default => circles
                .iter()
                .find(|c| c.state == CircleState::Normal)
                .map(|c| c.pos),
            GamePhase::Exploding => None,
        }
    }
}
