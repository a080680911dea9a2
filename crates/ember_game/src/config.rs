//! Tuning values for the whole simulation.
//!
//! One `GameConfig` is built at launch (JSON overrides on top of the defaults
//! below) and shared by reference with every system. Nothing mutates it
//! afterwards. The defaults are the values the game was tuned with; the
//! tolerances and odds in particular are feel-critical and should only change
//! deliberately.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub display_width: u32,
    pub display_height: u32,
    pub tile_size: f32,
    /// Columns visible at once; the camera clamp keeps this many in view.
    pub visible_columns: u32,
    /// Grids with at most this many rows sit flush with the viewport bottom.
    pub visible_rows: u32,
    pub tick_rate: u32,

    pub player_size: [f32; 2],
    pub player_start: [f32; 2],
    pub player_acceleration: f32,
    pub gravity: f32,
    pub x_top_speed: f32,
    pub y_top_speed: f32,
    pub jump_impulse: f32,
    pub jump_cut_speed: f32,
    pub jump_probe_height: f32,
    pub landing_tolerance: f32,
    pub roll_fall_speed: f32,
    pub knockback_push: f32,
    pub landing_dust_ticks: u8,

    pub fireball_size: [f32; 2],
    pub fireball_speed: f32,
    pub fireball_wall_tolerance: f32,
    pub fire_cooldown_ms: u64,

    pub shake_on_fire: f32,
    pub shake_on_start: f32,
    pub shake_decay: f32,

    /// Player top edge below this y resets the level.
    pub respawn_y: f32,
    /// One cloud per `cloud_odds` ticks on average.
    pub cloud_odds: u32,
    /// One ambient dust puff per `move_dust_odds` grounded moving ticks.
    pub move_dust_odds: u32,

    pub gameplay_seed: u64,
    pub cosmetic_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Emberfall".to_string(),
            display_width: 800,
            display_height: 640,
            tile_size: 32.0,
            visible_columns: 25,
            visible_rows: 20,
            tick_rate: 60,

            player_size: [51.0, 112.0],
            player_start: [64.0, 300.0],
            player_acceleration: 0.5,
            gravity: 1.0,
            x_top_speed: 6.0,
            y_top_speed: 30.0,
            jump_impulse: -15.0,
            jump_cut_speed: -5.0,
            jump_probe_height: 35.0,
            landing_tolerance: 5.0,
            roll_fall_speed: 18.0,
            knockback_push: 5.0,
            landing_dust_ticks: 5,

            fireball_size: [32.0, 16.0],
            fireball_speed: 15.0,
            fireball_wall_tolerance: 10.0,
            fire_cooldown_ms: 250,

            shake_on_fire: 4.0,
            shake_on_start: 10.0,
            shake_decay: 0.5,

            respawn_y: 644.0,
            cloud_odds: 701,
            move_dust_odds: 41,

            gameplay_seed: 0x00C0_FFEE,
            cosmetic_seed: 0x0BAD_F00D,
        }
    }
}

impl GameConfig {
    pub fn fire_cooldown_us(&self) -> u64 {
        self.fire_cooldown_ms * 1_000
    }

    /// Largest legal camera offset for a level `columns` tiles wide.
    pub fn max_camera_x(&self, columns: usize) -> f32 {
        (columns as f32 - self.visible_columns as f32) * self.tile_size
    }
}

/// Load overrides from `path`, or fall back to defaults when the file is absent.
pub fn load_config_or_default(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::info!(
            "No config at '{}', using built-in tuning values",
            path.display()
        );
        return Ok(GameConfig::default());
    }
    load_config_from_path(path)
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.tile_size <= 0.0 {
        return Err("Config validation failed: tile_size must be > 0".to_string());
    }
    if config.tick_rate == 0 {
        return Err("Config validation failed: tick_rate must be > 0".to_string());
    }
    if config.display_width == 0 || config.display_height == 0 {
        return Err("Config validation failed: display size must be > 0".to_string());
    }
    if config.x_top_speed <= 0.0 || config.y_top_speed <= 0.0 {
        return Err("Config validation failed: top speeds must be > 0".to_string());
    }
    if config.cloud_odds == 0 || config.move_dust_odds == 0 {
        return Err("Config validation failed: spawn odds must be >= 1".to_string());
    }
    Ok(())
}
