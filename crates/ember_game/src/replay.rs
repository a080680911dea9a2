//! Scripted input for headless runs.
//!
//! A replay is a list of input frames, each covering `repeat` ticks. Keys in
//! `held` stay down for the whole frame; keys in `pressed` get a fresh press
//! on every tick the frame covers and are released afterwards unless also
//! held. `pointer` holds the left mouse button.

use ember_core::audio::LogAudio;
use ember_core::draw::{DrawList, RecordingRenderer, Visual};
use ember_core::geometry::Rect;
use ember_core::input::{InputState, Key, MouseBtn};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::config::GameConfig;
use crate::game::{Game, GameContent};
use crate::menu::Menu;
use crate::rng::SimRng;
use crate::states::{Control, ControlError, StateId};

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    /// Overrides the configured gameplay seed.
    #[serde(default)]
    pub seed: Option<u64>,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReplayFrame {
    #[serde(default)]
    pub held: Vec<Key>,
    #[serde(default)]
    pub pressed: Vec<Key>,
    #[serde(default)]
    pub pointer: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One entry per tick.
    pub fn expanded_frames(&self) -> Vec<&ReplayFrame> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(frame);
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

/// Feeds replay frames into an [`InputState`] the way a keyboard would.
#[derive(Debug, Default)]
pub struct ReplayDriver {
    down: BTreeSet<Key>,
    pointer: bool,
}

impl ReplayDriver {
    pub fn apply(&mut self, frame: &ReplayFrame, input: &mut InputState) {
        let target: BTreeSet<Key> = frame.held.iter().chain(&frame.pressed).copied().collect();

        for key in self.down.difference(&target) {
            input.key_up(*key);
        }
        for key in &frame.pressed {
            // Re-press so the edge fires even if the key was already down.
            input.key_up(*key);
            input.key_down(*key);
        }
        for key in &frame.held {
            input.key_down(*key);
        }

        if frame.pointer && !self.pointer {
            input.mouse_down(MouseBtn::Left);
        } else if !frame.pointer && self.pointer {
            input.mouse_up(MouseBtn::Left);
        }

        self.down = target;
        self.pointer = frame.pointer;
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessReport {
    pub ticks: u64,
    pub stopped_early: bool,
    pub final_frame: Option<DrawList>,
}

impl HeadlessReport {
    /// Player bounds in world coordinates, read from the last frame.
    pub fn player_rect(&self) -> Option<Rect> {
        self.final_frame.as_ref().and_then(|frame| {
            frame
                .layers
                .iter()
                .flat_map(|layer| layer.items.iter())
                .find(|item| matches!(item.visual, Visual::Player { .. }))
                .map(|item| item.rect)
        })
    }
}

/// Run the control loop without a window, starting directly in the game.
pub fn run_headless(
    replay: &ReplaySequence,
    config: &GameConfig,
    content: Rc<GameContent>,
) -> Result<HeadlessReport, ControlError> {
    let seed = replay.seed.unwrap_or(config.gameplay_seed);
    let rng = SimRng::seeded(seed, config.cosmetic_seed);
    let mut control = Control::new(config, rng, StateId::Game)
        .with_state(StateId::Menu, Box::new(Menu::new()))
        .with_state(StateId::Game, Box::new(Game::new(content)));

    let mut input = InputState::new();
    let mut audio = LogAudio;
    let mut renderer = RecordingRenderer::default();
    let mut driver = ReplayDriver::default();

    control.start(config, &input, &mut audio)?;

    let mut ticks = 0;
    for frame in replay.expanded_frames() {
        if !control.is_playing() {
            break;
        }
        driver.apply(frame, &mut input);
        control.tick(&mut input, config, &mut renderer, &mut audio)?;
        ticks += 1;
    }

    let stopped_early = !control.is_playing();
    log::info!(
        "Headless replay finished after {} ticks (seed {}){}",
        ticks,
        seed,
        if stopped_early { ", stopped by quit" } else { "" }
    );
    Ok(HeadlessReport {
        ticks,
        stopped_early,
        final_frame: renderer.last,
    })
}
