//! Mini Arcade entry point
//!
//! Handles platform-specific initialization and runs the falling-blocks loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlInputElement, KeyboardEvent};

    use mini_arcade::consts::{FIELD_HEIGHT, FIELD_WIDTH};
    use mini_arcade::leaderboard::http::HttpScoreService;
    use mini_arcade::leaderboard::{
        Rankings, ScoreEntry, ScoreService, SectionRows, validate_nickname,
    };
    use mini_arcade::platform::Intent;
    use mini_arcade::renderer::{DrawCommand, RenderState};
    use mini_arcade::reporter;
    use mini_arcade::sim::GamePhase;
    use mini_arcade::{GameLoop, Settings};

    /// Browser-side app holding the loop and its collaborators
    struct App {
        game: GameLoop,
        render_state: RenderState,
        settings: Settings,
        service: HttpScoreService,
        /// Last fetched leaderboard
        rankings: Rankings,
        last_phase: GamePhase,
    }

    impl App {
        fn render(&mut self, commands: &[DrawCommand]) {
            match self.render_state.render(commands) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (w, h) = self.render_state.size;
                    self.render_state.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Sync overlays and score text with the game phase
        fn update_hud(&mut self) {
            let document = match web_sys::window().and_then(|w| w.document()) {
                Some(d) => d,
                None => return,
            };

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&self.game.score().to_string()));
            }

            let phase = self.game.phase();
            if phase == self.last_phase {
                return;
            }
            self.last_phase = phase;

            set_hidden(&document, "ready-overlay", phase != GamePhase::Ready);
            set_hidden(&document, "game-over", phase != GamePhase::GameOver);
            if phase == GamePhase::GameOver {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&self.game.score().to_string()));
                }
            }
        }
    }

    fn set_hidden(document: &web_sys::Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Mini Arcade starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Field pixels scaled by device pixel ratio
        let dpr = window.device_pixel_ratio();
        let width = (FIELD_WIDTH as f64 * dpr) as u32;
        let height = (FIELD_HEIGHT as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = GameLoop::new(seed, &settings).expect("stored tuning already validated");
        log::info!("Session seed {}, initial fall speed {:.2}", seed, game.state().initial_fall_speed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .expect("Failed to create renderer");

        let service = HttpScoreService::new(&settings.api_base_url);
        let app = Rc::new(RefCell::new(App {
            game,
            render_state,
            settings,
            service,
            rankings: Rankings::default(),
            last_phase: GamePhase::GameOver,
        }));

        {
            let mut a = app.borrow_mut();
            let commands = a.game.current_frame();
            a.render(&commands);
            a.update_hud();
        }

        setup_nickname_input(app.clone());
        setup_keyboard(app.clone());
        setup_buttons(app.clone());
        setup_lifecycle(app.clone());
        setup_leaderboard(app.clone());
        refresh_leaderboard(app);

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        log::info!("Mini Arcade running!");
    }

    fn setup_nickname_input(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let input: HtmlInputElement = match document
            .get_element_by_id("nickname")
            .and_then(|el| el.dyn_into().ok())
        {
            Some(input) => input,
            None => return,
        };
        input.set_value(&app.borrow().settings.nickname);

        let input_clone = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            a.settings.set_nickname(&input_clone.value());
            let nickname = a.settings.nickname.clone();
            a.game.set_player_label(&nickname);
            a.settings.save();
        });
        let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if is_text_input(&event) {
                    return;
                }
                let intent = app.borrow_mut().game.key_down(&event.key());
                match intent {
                    Some(Intent::Confirm) => {
                        event.prevent_default();
                        confirm(app.clone());
                    }
                    Some(_) => event.prevent_default(),
                    None => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().game.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Typing a nickname must not steer the player
    fn is_text_input(event: &KeyboardEvent) -> bool {
        event
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .is_some()
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    confirm(app.clone());
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Stop ticking when the page goes away, pick the run up when it returns
    fn setup_lifecycle(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();

        {
            let app = app.clone();
            let closure =
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::PageTransitionEvent| {
                    let handle = app.borrow_mut().game.suspend();
                    if let Some(handle) = handle {
                        if let Some(window) = web_sys::window() {
                            let _ = window.cancel_animation_frame(handle);
                        }
                        log::info!("Frame loop suspended");
                    }
                });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure =
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::PageTransitionEvent| {
                    let resumed = app.borrow_mut().game.resume();
                    if resumed {
                        request_animation_frame(app.clone());
                    }
                });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn confirm(app: Rc<RefCell<App>>) {
        let started = {
            let mut a = app.borrow_mut();
            let started = a.game.confirm();
            if started {
                a.update_hud();
            }
            started
        };
        if started {
            request_animation_frame(app);
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        if !app.borrow().game.needs_frame() {
            return;
        }
        let window = web_sys::window().unwrap();
        let app_clone = app.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(app_clone, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => app.borrow_mut().game.frame_requested(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        let report = {
            let mut a = app.borrow_mut();
            let frame = a.game.on_frame(time);
            a.render(&frame.commands);
            a.update_hud();
            a.game.take_report()
        };

        if let Some(report) = report {
            let service = app.borrow().service.clone();
            let app = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if reporter::submit(&service, report).await {
                    refresh_leaderboard(app);
                }
            });
        }

        request_animation_frame(app);
    }

    fn document() -> Option<Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn filter_input() -> Option<HtmlInputElement> {
        document()?
            .get_element_by_id("filter")
            .and_then(|el| el.dyn_into().ok())
    }

    /// Filter box, clear button and the row actions (edit, delete)
    fn setup_leaderboard(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(input) = filter_input() {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                render_leaderboard(&app);
            });
            let _ =
                input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("clear-filter") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if let Some(input) = filter_input() {
                    input.set_value("");
                }
                render_leaderboard(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Rows are rebuilt on every render, so clicks are handled on the container
        if let Some(board) = document.get_element_by_id("leaderboard") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                else {
                    return;
                };
                let (Some(action), Some(id)) =
                    (target.get_attribute("data-action"), target.get_attribute("data-id"))
                else {
                    return;
                };
                let entry = app.borrow().rankings.find(&id).cloned();
                match (action.as_str(), entry) {
                    ("edit", Some(entry)) => edit_entry(app.clone(), entry),
                    ("delete", Some(entry)) => delete_entry(app.clone(), entry),
                    _ => log::warn!("Unknown leaderboard action {} on {}", action, id),
                }
            });
            let _ =
                board.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn edit_entry(app: Rc<RefCell<App>>, entry: ScoreEntry) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let raw = match window.prompt_with_message_and_default("New nickname", &entry.nickname) {
            Ok(Some(raw)) => raw,
            _ => return,
        };
        if let Err(e) = validate_nickname(&raw) {
            let _ = window.alert_with_message(&e.to_string());
            return;
        }

        let service = app.borrow().service.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match service.update_nickname(&entry, &raw).await {
                Ok(()) => refresh_leaderboard(app),
                Err(e) => {
                    log::warn!("Failed to rename score {}: {}", entry.id, e);
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message("Could not update the nickname.");
                    }
                }
            }
        });
    }

    fn delete_entry(app: Rc<RefCell<App>>, entry: ScoreEntry) {
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message("Delete this score?").ok())
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        let service = app.borrow().service.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match service.delete_score(&entry.id).await {
                Ok(()) => refresh_leaderboard(app),
                Err(e) => log::warn!("Failed to delete score {}: {}", entry.id, e),
            }
        });
    }

    /// Refetch every game's scores, then redraw
    fn refresh_leaderboard(app: Rc<RefCell<App>>) {
        let service = app.borrow().service.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match service.fetch_all().await {
                Ok(rankings) => {
                    app.borrow_mut().rankings = rankings;
                    render_leaderboard(&app);
                }
                Err(e) => log::warn!("Failed to load rankings: {}", e),
            }
        });
    }

    /// One card per game, rows matching the nickname filter
    fn render_leaderboard(app: &Rc<RefCell<App>>) {
        let Some(document) = document() else {
            return;
        };
        let Some(board) = document.get_element_by_id("leaderboard") else {
            return;
        };
        let filter = filter_input().map(|input| input.value()).unwrap_or_default();
        board.set_text_content(None);

        let a = app.borrow();
        for section in a.rankings.sections(&filter) {
            let Ok(card) = document.create_element("section") else {
                continue;
            };
            card.set_class_name("ranking-card");
            append_text(&document, &card, "h4", section.game.title());

            match section.rows {
                SectionRows::NoScores => {
                    append_text(&document, &card, "p", "No scores yet.");
                }
                SectionRows::NoMatch => {
                    append_text(&document, &card, "p", "No scores for that nickname.");
                }
                SectionRows::Rows(rows) => {
                    if let Ok(list) = document.create_element("ol") {
                        for row in rows {
                            let Ok(item) = document.create_element("li") else {
                                continue;
                            };
                            if row.is_podium() {
                                item.set_class_name(&format!("rank-{}", row.rank));
                            }
                            append_text(
                                &document,
                                &item,
                                "span",
                                &format!("{}. {} {}", row.rank, row.entry.nickname, row.entry.score),
                            );
                            append_action(&document, &item, "edit", "Edit", &row.entry.id);
                            append_action(&document, &item, "delete", "\u{2715}", &row.entry.id);
                            let _ = list.append_child(&item);
                        }
                        let _ = card.append_child(&list);
                    }
                }
            }
            let _ = board.append_child(&card);
        }
    }

    fn append_text(document: &Document, parent: &Element, tag: &str, text: &str) {
        if let Ok(el) = document.create_element(tag) {
            el.set_text_content(Some(text));
            let _ = parent.append_child(&el);
        }
    }

    fn append_action(document: &Document, parent: &Element, action: &str, label: &str, id: &str) {
        if let Ok(btn) = document.create_element("button") {
            btn.set_text_content(Some(label));
            let _ = btn.set_attribute("data-action", action);
            let _ = btn.set_attribute("data-id", id);
            let _ = parent.append_child(&btn);
        }
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
    log::info!("Mini Arcade (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run: a simple autopilot dodges until hit, then the score goes to
/// an in-memory leaderboard
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use mini_arcade::consts::{PLAYER_WIDTH, PLAYER_Y};
    use mini_arcade::leaderboard::{InMemoryScoreService, ScoreService, SectionRows};
    use mini_arcade::reporter;
    use mini_arcade::sim::GamePhase;
    use mini_arcade::{GameLoop, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    pub fn run() {
        let mut settings = Settings::load();
        settings.set_nickname("autopilot");
        let service = InMemoryScoreService::new();

        for seed in 1..=3u64 {
            let mut game = match GameLoop::new(seed, &settings) {
                Ok(game) => game,
                Err(e) => {
                    log::error!("Invalid tuning: {}", e);
                    return;
                }
            };
            game.start();

            let mut now = 0.0;
            let mut frames = 0;
            while game.phase() == GamePhase::Running && frames < MAX_FRAMES {
                steer(&mut game);
                game.on_frame(now);
                now += FRAME_MS;
                frames += 1;
            }

            println!("seed {}: score {} after {} frames", seed, game.score(), frames);
            if let Some(report) = game.take_report() {
                pollster::block_on(reporter::submit(&service, report));
            }
        }

        if service.is_empty() {
            println!("\nNo run scored; nothing was submitted");
        }
        match pollster::block_on(service.fetch_all()) {
            Ok(rankings) => {
                for section in rankings.sections("") {
                    println!("\n{}", section.game.title());
                    match section.rows {
                        SectionRows::Rows(rows) => {
                            for row in rows {
                                println!("{:>2}. {} {}", row.rank, row.entry.nickname, row.entry.score);
                            }
                        }
                        SectionRows::NoScores | SectionRows::NoMatch => println!("    no scores"),
                    }
                }
            }
            Err(e) => log::warn!("Failed to load rankings: {}", e),
        }
    }

    /// Move away from the nearest obstacle heading for the player's row
    fn steer(game: &mut GameLoop) {
        let state = game.state();
        let player_mid = state.player.pos.x + PLAYER_WIDTH / 2.0;
        let threat = state
            .obstacles
            .iter()
            .filter(|o| o.pos.y < PLAYER_Y && o.pos.y > PLAYER_Y - 200.0)
            .filter(|o| {
                let rect = o.rect();
                let danger = rect.left() - PLAYER_WIDTH..rect.right() + PLAYER_WIDTH;
                danger.contains(&state.player.pos.x)
            })
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|o| o.rect().left() + o.rect().size.x / 2.0);

        game.key_up("ArrowLeft");
        game.key_up("ArrowRight");
        if let Some(threat_mid) = threat {
            if threat_mid >= player_mid {
                game.key_down("ArrowLeft");
            } else {
                game.key_down("ArrowRight");
            }
        }
    }
}
