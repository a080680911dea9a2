//! Keyboard and pointer tracking for the fixed-tick loop.
//!
//! Two views of the same key set: `is_held` is true every tick a key is down
//! (walking, jump-cut, continuous fire) and `is_just_pressed` only on the tick
//! it went down. Edges survive until a tick takes them with
//! [`InputState::take_events`], so a press landing on a frame that runs no
//! tick is still seen, and a frame that runs several ticks delivers it once.
//!
//! States never see raw platform events. Each tick the control loop turns the
//! edge set into an ordered list of [`InputEvent`]s.

use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    A,
    D,
    W,
    S,
    J,
    K,
    Space,
    Return,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MouseBtn {
    Left,
    Right,
}

/// Discrete events dispatched to the active state once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    ButtonDown(MouseBtn),
    Quit,
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    mouse_held: HashSet<MouseBtn>,
    mouse_just_pressed: HashSet<MouseBtn>,

    quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            mouse_held: HashSet::new(),
            mouse_just_pressed: HashSet::new(),
            quit_requested: false,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        if self.mouse_held.insert(btn) {
            self.mouse_just_pressed.insert(btn);
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        self.mouse_held.remove(&btn);
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse_held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse_just_pressed.contains(&btn)
    }

    /// Edge events for this tick in a stable order (quit, keys, buttons).
    /// Hash iteration order must not leak into the simulation, so both edge
    /// sets are sorted before dispatch.
    pub fn events(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if self.quit_requested {
            events.push(InputEvent::Quit);
        }

        let mut keys: Vec<Key> = self.just_pressed.iter().copied().collect();
        keys.sort();
        events.extend(keys.into_iter().map(InputEvent::KeyDown));

        let mut buttons: Vec<MouseBtn> = self.mouse_just_pressed.iter().copied().collect();
        buttons.sort();
        events.extend(buttons.into_iter().map(InputEvent::ButtonDown));
        events
    }

    /// This tick's events. Clears every edge; held state is kept.
    pub fn take_events(&mut self) -> Vec<InputEvent> {
        let events = self.events();
        self.end_frame();
        events
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
        self.quit_requested = false;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
