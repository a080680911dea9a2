//! Top-level state machine and the fixed-tick control loop that drives it.
//!
//! Each tick: drain input events into the active state, then honor its
//! `quit` / `done` flags, then let it update and hand a frame to the renderer.
//! A transition runs `cleanup` on the outgoing state and `startup` on the one
//! it names, within the same tick.

use ember_core::audio::AudioSink;
use ember_core::draw::Renderer;
use ember_core::input::{InputEvent, InputState};
use ember_core::time::SimClock;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::GameConfig;
use crate::level::LevelError;
use crate::rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    Menu,
    Game,
}

/// Transition flags every state exposes to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFlow {
    pub done: bool,
    pub quit: bool,
    pub next: StateId,
    pub previous: Option<StateId>,
}

impl StateFlow {
    pub fn new(next: StateId) -> Self {
        Self {
            done: false,
            quit: false,
            next,
            previous: None,
        }
    }
}

/// Everything a state may touch during one tick.
pub struct StateContext<'a> {
    pub config: &'a GameConfig,
    pub input: &'a InputState,
    /// Simulation time at the start of this tick.
    pub now_us: u64,
    pub rng: &'a mut SimRng,
    pub audio: &'a mut dyn AudioSink,
}

pub trait State {
    fn startup(&mut self, ctx: &mut StateContext<'_>) -> Result<(), LevelError>;

    fn cleanup(&mut self) {}

    fn get_event(&mut self, event: InputEvent, ctx: &mut StateContext<'_>);

    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        renderer: &mut dyn Renderer,
    ) -> Result<(), LevelError>;

    fn flow(&self) -> &StateFlow;

    fn flow_mut(&mut self) -> &mut StateFlow;
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("failed to enter {state:?} state: {source}")]
    StartupFailed {
        state: StateId,
        #[source]
        source: LevelError,
    },
    #[error("{state:?} state failed during update: {source}")]
    UpdateFailed {
        state: StateId,
        #[source]
        source: LevelError,
    },
    #[error("no state registered for {0:?}")]
    MissingState(StateId),
}

pub struct Control {
    states: HashMap<StateId, Box<dyn State>>,
    active: StateId,
    playing: bool,
    clock: SimClock,
    rng: SimRng,
}

impl Control {
    pub fn new(config: &GameConfig, rng: SimRng, initial: StateId) -> Self {
        Self {
            states: HashMap::new(),
            active: initial,
            playing: true,
            clock: SimClock::new(config.tick_rate),
            rng,
        }
    }

    pub fn with_state(mut self, id: StateId, state: Box<dyn State>) -> Self {
        self.states.insert(id, state);
        self
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn active(&self) -> StateId {
        self.active
    }

    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }

    /// Run `startup` on the initial state.
    pub fn start(
        &mut self,
        config: &GameConfig,
        input: &InputState,
        audio: &mut dyn AudioSink,
    ) -> Result<(), ControlError> {
        let id = self.active;
        let state = self
            .states
            .get_mut(&id)
            .ok_or(ControlError::MissingState(id))?;
        let mut ctx = StateContext {
            config,
            input,
            now_us: self.clock.now_us(),
            rng: &mut self.rng,
            audio,
        };
        if let Err(source) = state.startup(&mut ctx) {
            self.playing = false;
            return Err(ControlError::StartupFailed { state: id, source });
        }
        log::info!("Entered {:?} state", id);
        Ok(())
    }

    /// One fixed simulation tick. Takes this tick's edge events out of
    /// `input`; held keys stay for later ticks.
    pub fn tick(
        &mut self,
        input: &mut InputState,
        config: &GameConfig,
        renderer: &mut dyn Renderer,
        audio: &mut dyn AudioSink,
    ) -> Result<(), ControlError> {
        if !self.playing {
            return Ok(());
        }
        let now_us = self.clock.now_us();
        let events = input.take_events();
        let input = &*input;

        let id = self.active;
        let state = self
            .states
            .get_mut(&id)
            .ok_or(ControlError::MissingState(id))?;
        let mut ctx = StateContext {
            config,
            input,
            now_us,
            rng: &mut self.rng,
            audio: &mut *audio,
        };
        for event in events {
            if event == InputEvent::Quit {
                self.playing = false;
            }
            state.get_event(event, &mut ctx);
        }

        if state.flow().quit {
            self.playing = false;
            log::info!("{:?} state requested quit", id);
            return Ok(());
        }
        if state.flow().done {
            self.switch_state(config, input, &mut *audio)?;
        }

        let id = self.active;
        let state = self
            .states
            .get_mut(&id)
            .ok_or(ControlError::MissingState(id))?;
        let mut ctx = StateContext {
            config,
            input,
            now_us,
            rng: &mut self.rng,
            audio,
        };
        state
            .update(&mut ctx, renderer)
            .map_err(|source| ControlError::UpdateFailed { state: id, source })?;

        self.clock.advance();
        Ok(())
    }

    fn switch_state(
        &mut self,
        config: &GameConfig,
        input: &InputState,
        audio: &mut dyn AudioSink,
    ) -> Result<(), ControlError> {
        let previous = self.active;
        let outgoing = self
            .states
            .get_mut(&previous)
            .ok_or(ControlError::MissingState(previous))?;
        outgoing.flow_mut().done = false;
        let next = outgoing.flow().next;
        outgoing.cleanup();

        let incoming = self
            .states
            .get_mut(&next)
            .ok_or(ControlError::MissingState(next))?;
        let mut ctx = StateContext {
            config,
            input,
            now_us: self.clock.now_us(),
            rng: &mut self.rng,
            audio,
        };
        if let Err(source) = incoming.startup(&mut ctx) {
            self.playing = false;
            return Err(ControlError::StartupFailed {
                state: next,
                source,
            });
        }
        incoming.flow_mut().previous = Some(previous);
        self.active = next;
        log::info!("State transition {:?} -> {:?}", previous, next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelLayer;
    use ember_core::audio::RecordingAudio;
    use ember_core::draw::{DrawList, NullRenderer};
    use ember_core::input::Key;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records lifecycle calls; finishes on `Return`, quits on `Escape`.
    struct Scripted {
        name: &'static str,
        flow: StateFlow,
        log: Log,
        fail_startup: bool,
    }

    impl Scripted {
        fn boxed(name: &'static str, next: StateId, log: &Log) -> Box<dyn State> {
            Box::new(Self {
                name,
                flow: StateFlow::new(next),
                log: Rc::clone(log),
                fail_startup: false,
            })
        }
    }

    impl State for Scripted {
        fn startup(&mut self, _ctx: &mut StateContext<'_>) -> Result<(), LevelError> {
            self.log.borrow_mut().push(format!("{} startup", self.name));
            if self.fail_startup {
                return Err(LevelError::EmptyGrid {
                    layer: LevelLayer::Solid,
                });
            }
            Ok(())
        }

        fn cleanup(&mut self) {
            self.log.borrow_mut().push(format!("{} cleanup", self.name));
        }

        fn get_event(&mut self, event: InputEvent, _ctx: &mut StateContext<'_>) {
            match event {
                InputEvent::KeyDown(Key::Return) => self.flow.done = true,
                InputEvent::KeyDown(Key::Escape) => self.flow.quit = true,
                InputEvent::KeyDown(Key::J) => {
                    self.log.borrow_mut().push(format!("{} jump", self.name))
                }
                _ => {}
            }
        }

        fn update(
            &mut self,
            _ctx: &mut StateContext<'_>,
            renderer: &mut dyn Renderer,
        ) -> Result<(), LevelError> {
            self.log.borrow_mut().push(format!("{} update", self.name));
            renderer.submit(DrawList::default());
            Ok(())
        }

        fn flow(&self) -> &StateFlow {
            &self.flow
        }

        fn flow_mut(&mut self) -> &mut StateFlow {
            &mut self.flow
        }
    }

    fn control(log: &Log) -> Control {
        let config = GameConfig::default();
        Control::new(&config, SimRng::seeded(1, 2), StateId::Menu)
            .with_state(StateId::Menu, Scripted::boxed("menu", StateId::Game, log))
            .with_state(StateId::Game, Scripted::boxed("game", StateId::Menu, log))
    }

    #[test]
    fn done_switches_state_within_the_tick() {
        let log: Log = Rc::default();
        let config = GameConfig::default();
        let mut audio = RecordingAudio::default();
        let mut renderer = NullRenderer::default();
        let mut control = control(&log);
        let mut input = InputState::new();

        control
            .start(&config, &input, &mut audio)
            .expect("menu starts");
        input.key_down(Key::Return);
        control
            .tick(&mut input, &config, &mut renderer, &mut audio)
            .expect("tick succeeds");

        assert_eq!(control.active(), StateId::Game);
        assert_eq!(
            *log.borrow(),
            vec!["menu startup", "menu cleanup", "game startup", "game update"]
        );
        assert_eq!(renderer.frames_submitted, 1);
        assert_eq!(control.now_us(), 16_666);
    }

    #[test]
    fn press_reaches_only_the_first_tick_of_a_frame() {
        let log: Log = Rc::default();
        let config = GameConfig::default();
        let mut audio = RecordingAudio::default();
        let mut renderer = NullRenderer::default();
        let mut control = control(&log);
        let mut input = InputState::new();

        control
            .start(&config, &input, &mut audio)
            .expect("menu starts");
        input.key_down(Key::J);
        for _ in 0..2 {
            control
                .tick(&mut input, &config, &mut renderer, &mut audio)
                .expect("tick succeeds");
        }

        let jumps = log.borrow().iter().filter(|l| *l == "menu jump").count();
        assert_eq!(jumps, 1);
        assert!(input.is_held(Key::J));
        assert_eq!(renderer.frames_submitted, 2);
    }

    #[test]
    fn quit_stops_before_update() {
        let log: Log = Rc::default();
        let config = GameConfig::default();
        let mut audio = RecordingAudio::default();
        let mut renderer = NullRenderer::default();
        let mut control = control(&log);
        let mut input = InputState::new();

        control
            .start(&config, &input, &mut audio)
            .expect("menu starts");
        input.key_down(Key::Escape);
        control
            .tick(&mut input, &config, &mut renderer, &mut audio)
            .expect("tick succeeds");

        assert!(!control.is_playing());
        assert_eq!(renderer.frames_submitted, 0);
    }

    #[test]
    fn window_close_ends_the_loop() {
        let log: Log = Rc::default();
        let config = GameConfig::default();
        let mut audio = RecordingAudio::default();
        let mut renderer = NullRenderer::default();
        let mut control = control(&log);
        let mut input = InputState::new();

        control
            .start(&config, &input, &mut audio)
            .expect("menu starts");
        input.request_quit();
        control
            .tick(&mut input, &config, &mut renderer, &mut audio)
            .expect("tick succeeds");
        assert!(!control.is_playing());

        input.end_frame();
        control
            .tick(&mut input, &config, &mut renderer, &mut audio)
            .expect("stopped loop ignores ticks");
        assert_eq!(renderer.frames_submitted, 1);
    }

    #[test]
    fn failed_entry_is_reported_and_stops_the_loop() {
        let log: Log = Rc::default();
        let config = GameConfig::default();
        let mut audio = RecordingAudio::default();
        let mut renderer = NullRenderer::default();
        let mut failing = Scripted {
            name: "game",
            flow: StateFlow::new(StateId::Menu),
            log: Rc::clone(&log),
            fail_startup: false,
        };
        failing.fail_startup = true;
        let mut control = Control::new(&config, SimRng::seeded(1, 2), StateId::Menu)
            .with_state(StateId::Menu, Scripted::boxed("menu", StateId::Game, &log))
            .with_state(StateId::Game, Box::new(failing));
        let mut input = InputState::new();

        control
            .start(&config, &input, &mut audio)
            .expect("menu starts");
        input.key_down(Key::Return);
        let err = control
            .tick(&mut input, &config, &mut renderer, &mut audio)
            .expect_err("game entry fails");

        assert!(matches!(
            err,
            ControlError::StartupFailed {
                state: StateId::Game,
                ..
            }
        ));
        assert!(!control.is_playing());
        assert_eq!(control.active(), StateId::Menu);
    }

    #[test]
    fn missing_state_is_an_error() {
        let config = GameConfig::default();
        let mut audio = RecordingAudio::default();
        let input = InputState::new();
        let mut control = Control::new(&config, SimRng::seeded(1, 2), StateId::Game);
        let err = control
            .start(&config, &input, &mut audio)
            .expect_err("nothing registered");
        assert!(matches!(err, ControlError::MissingState(StateId::Game)));
    }
}
