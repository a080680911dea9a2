//! Emberfall -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. All simulation runs
//! inside `RedrawRequested` using a fixed-timestep model (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- one `Control::tick` per fixed slice; the first
//!      tick of a frame takes that frame's key presses
//!   3. `present()` the last frame the active state submitted
//!
//! `ember_game --replay <path>` skips the window entirely and runs the same
//! control loop against a scripted input sequence.

mod collision;
mod config;
mod entity;
mod game;
mod level;
mod menu;
mod replay;
mod rng;
mod states;
mod tileset;

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use ember_core::audio::LogAudio;
use ember_core::input::{InputState, Key, MouseBtn};
use ember_core::time::TimeState;
use ember_platform::window::{caption_with_fps, PlatformConfig};
use ember_render::QuadRenderer;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use config::{load_config_or_default, GameConfig};
use game::{Game, GameContent};
use level::load_level_from_path;
use menu::Menu;
use replay::{load_replay_from_path, run_headless};
use rng::SimRng;
use states::{Control, StateId};
use tileset::load_tilesets_from_path;

const CONFIG_PATH: &str = "assets/config/game.json";
const TILESET_PATH: &str = "assets/tilesets/tilesets.json";
const LEVEL_PATH: &str = "assets/levels/level_1.json";
/// Frames between window caption refreshes.
const CAPTION_INTERVAL: u64 = 30;

struct EngineState {
    window: Arc<Window>,
    renderer: QuadRenderer,
    time: TimeState,
    input: InputState,
    control: Control,
    audio: LogAudio,
    config: Rc<GameConfig>,
}

impl EngineState {
    fn new(window: Arc<Window>, config: Rc<GameConfig>, content: Rc<GameContent>) -> Self {
        let viewport = (config.display_width, config.display_height);
        let renderer = QuadRenderer::new(window.clone(), viewport)
            .unwrap_or_else(|err| panic!("Failed to initialise renderer: {}", err));
        let time = TimeState::new(config.tick_rate);
        let input = InputState::new();
        let mut audio = LogAudio;

        let rng = SimRng::seeded(config.gameplay_seed, config.cosmetic_seed);
        let mut control = Control::new(&config, rng, StateId::Menu)
            .with_state(StateId::Menu, Box::new(Menu::new()))
            .with_state(StateId::Game, Box::new(Game::new(content)));
        if let Err(err) = control.start(&config, &input, &mut audio) {
            panic!("Failed to enter the initial state: {}", err);
        }

        Self {
            window,
            renderer,
            time,
            input,
            control,
            audio,
            config,
        }
    }
}

struct App {
    platform: PlatformConfig,
    config: Rc<GameConfig>,
    content: Rc<GameContent>,
    state: Option<EngineState>,
}

impl App {
    fn new(config: Rc<GameConfig>, content: Rc<GameContent>) -> Self {
        Self {
            platform: PlatformConfig::for_viewport(
                &config.title,
                config.display_width,
                config.display_height,
            ),
            config,
            content,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = ember_platform::window::create_window(event_loop, &self.platform);
        log::info!(
            "Window created: {}x{}",
            self.platform.width,
            self.platform.height
        );
        self.state = Some(EngineState::new(
            window,
            Rc::clone(&self.config),
            Rc::clone(&self.content),
        ));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                state.input.request_quit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.renderer.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(engine_key),
                            ElementState::Released => state.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                if let Some(btn) = map_mouse(button) {
                    match button_state {
                        ElementState::Pressed => state.input.mouse_down(btn),
                        ElementState::Released => state.input.mouse_up(btn),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                state.time.begin_frame();

                while state.time.should_step() {
                    let result = state.control.tick(
                        &mut state.input,
                        &state.config,
                        &mut state.renderer,
                        &mut state.audio,
                    );
                    if let Err(err) = result {
                        log::error!("Stopping: {}", err);
                        event_loop.exit();
                        return;
                    }
                    if !state.control.is_playing() {
                        break;
                    }
                }

                if !state.control.is_playing() {
                    log::info!("Control loop finished, exiting.");
                    event_loop.exit();
                    return;
                }

                state.renderer.present();

                if state.time.frame_count % CAPTION_INTERVAL == 0 {
                    state.window.set_title(&caption_with_fps(
                        &state.config.title,
                        state.time.smoothed_fps,
                    ));
                }
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyJ => Some(Key::J),
        KeyCode::KeyK => Some(Key::K),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Return),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

fn map_mouse(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        _ => None,
    }
}

/// `--replay <path>` selects the headless runner.
fn replay_arg(args: &[String]) -> Result<Option<PathBuf>, String> {
    match args.iter().position(|arg| arg == "--replay") {
        None => Ok(None),
        Some(idx) => args
            .get(idx + 1)
            .map(|path| Some(PathBuf::from(path)))
            .ok_or_else(|| "--replay expects a file path".to_string()),
    }
}

fn load_content(config_path: &Path) -> (GameConfig, GameContent) {
    let config = load_config_or_default(config_path)
        .unwrap_or_else(|err| panic!("Failed to load config '{}': {}", config_path.display(), err));

    let tileset_path = PathBuf::from(TILESET_PATH);
    let tiles = load_tilesets_from_path(&tileset_path).unwrap_or_else(|err| {
        panic!(
            "Failed to load tilesets '{}': {}",
            tileset_path.display(),
            err
        );
    });

    let level_path = PathBuf::from(LEVEL_PATH);
    let level = load_level_from_path(&level_path).unwrap_or_else(|err| {
        panic!("Failed to load level '{}': {}", level_path.display(), err);
    });
    if let Err(err) = level.preflight(&tiles) {
        log::error!("Level '{}' failed preflight: {}", level_path.display(), err);
        panic!(
            "Level '{}' references tiles the registry does not define: {}",
            level_path.display(),
            err
        );
    }

    log::info!(
        "Loaded level '{}' ({} columns, {} tiles registered)",
        level.level_id,
        level.columns(),
        tiles.len()
    );
    (config, GameContent { tiles, level })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Emberfall starting...");

    let args: Vec<String> = std::env::args().collect();
    let replay_path = match replay_arg(&args) {
        Ok(path) => path,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(2);
        }
    };

    let (config, content) = load_content(Path::new(CONFIG_PATH));
    let content = Rc::new(content);

    if let Some(path) = replay_path {
        let replay = load_replay_from_path(&path)
            .unwrap_or_else(|err| panic!("Failed to load replay '{}': {}", path.display(), err));
        match run_headless(&replay, &config, content) {
            Ok(report) => match report.player_rect() {
                Some(rect) => log::info!(
                    "Final player position after {} ticks: ({:.1}, {:.1})",
                    report.ticks,
                    rect.center().x,
                    rect.center().y
                ),
                None => log::warn!("Replay ended after {} ticks without a game frame", report.ticks),
            },
            Err(err) => {
                log::error!("Headless run failed: {}", err);
                std::process::exit(1);
            }
        }
        return;
    }

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(Rc::new(config), content);
    event_loop.run_app(&mut app).expect("Event loop error");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn replay_flag_takes_a_path() {
        let parsed = replay_arg(&args(&["ember_game", "--replay", "run.json"])).expect("parse");
        assert_eq!(parsed, Some(PathBuf::from("run.json")));
    }

    #[test]
    fn no_flag_means_windowed() {
        assert_eq!(replay_arg(&args(&["ember_game"])).expect("parse"), None);
    }

    #[test]
    fn dangling_replay_flag_is_an_error() {
        let err = replay_arg(&args(&["ember_game", "--replay"])).expect_err("missing path");
        assert!(err.contains("expects a file path"));
    }

    #[test]
    fn keyboard_mapping_covers_game_controls() {
        assert_eq!(map_key(KeyCode::KeyJ), Some(Key::J));
        assert_eq!(map_key(KeyCode::Enter), Some(Key::Return));
        assert_eq!(map_key(KeyCode::F1), None);
        assert_eq!(map_mouse(MouseButton::Left), Some(MouseBtn::Left));
    }
}
