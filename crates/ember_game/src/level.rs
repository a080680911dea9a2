//! Level content and the level builder.
//!
//! A level is three parallel tile-id grids plus spawn lists. Only the solid
//! grid takes part in collision; the other two are visual layers drawn behind
//! and in front of the player. Building turns every non-empty cell into a
//! [`Wall`] whose solidity comes from the tile id.

use ember_core::geometry::Rect;
use glam::Vec2;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::GameConfig;
use crate::entity::Wall;
use crate::tileset::{Solidity, TilesetRegistry, EMPTY_TILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelLayer {
    BackgroundDetail,
    Solid,
    ForegroundDetail,
}

impl fmt::Display for LevelLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BackgroundDetail => "background detail",
            Self::Solid => "solid",
            Self::ForegroundDetail => "foreground detail",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("unknown tile id {id} in {layer} layer at row {row}, column {col}")]
    UnknownTile {
        layer: LevelLayer,
        row: usize,
        col: usize,
        id: u32,
    },
    #[error("{layer} layer has no rows")]
    EmptyGrid { layer: LevelLayer },
}

#[derive(Debug, Deserialize, Clone)]
pub struct LevelContent {
    pub version: String,
    pub level_id: String,
    pub background_details: Vec<Vec<u32>>,
    pub solid: Vec<Vec<u32>>,
    pub details: Vec<Vec<u32>>,
    #[serde(default = "default_birds")]
    pub birds: Vec<[f32; 2]>,
    #[serde(default = "default_butterflies")]
    pub butterflies: Vec<[f32; 2]>,
    /// Player center; falls back to the configured start when absent.
    #[serde(default)]
    pub player_start: Option<[f32; 2]>,
}

fn default_birds() -> Vec<[f32; 2]> {
    vec![[120.0, 400.0], [550.0, 200.0], [900.0, 200.0]]
}

fn default_butterflies() -> Vec<[f32; 2]> {
    vec![[120.0, 120.0], [650.0, 350.0], [1450.0, 280.0]]
}

impl LevelContent {
    pub fn grid(&self, layer: LevelLayer) -> &[Vec<u32>] {
        match layer {
            LevelLayer::BackgroundDetail => &self.background_details,
            LevelLayer::Solid => &self.solid,
            LevelLayer::ForegroundDetail => &self.details,
        }
    }

    /// Width of the playable area in tiles.
    pub fn columns(&self) -> usize {
        self.solid.first().map_or(0, Vec::len)
    }

    /// Every layer, built against `registry`. Fails on the first unknown tile.
    pub fn preflight(&self, registry: &TilesetRegistry) -> Result<(), LevelError> {
        for layer in [
            LevelLayer::BackgroundDetail,
            LevelLayer::Solid,
            LevelLayer::ForegroundDetail,
        ] {
            check_tiles(self.grid(layer), registry, layer)?;
        }
        Ok(())
    }
}

pub fn load_level_from_path(path: &Path) -> Result<LevelContent, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let level: LevelContent = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level(&level)?;
    Ok(level)
}

fn validate_level(level: &LevelContent) -> Result<(), String> {
    let width = level.columns();
    if width == 0 {
        return Err(format!(
            "Level validation failed: '{}' solid layer is empty",
            level.level_id
        ));
    }
    for layer in [
        LevelLayer::BackgroundDetail,
        LevelLayer::Solid,
        LevelLayer::ForegroundDetail,
    ] {
        let grid = level.grid(layer);
        if grid.is_empty() {
            return Err(format!(
                "Level validation failed: '{}' {layer} layer is empty",
                level.level_id
            ));
        }
        if let Some(row) = grid.iter().position(|row| row.len() != width) {
            return Err(format!(
                "Level validation failed: '{}' {layer} layer row {row} has {} columns, expected {width}",
                level.level_id,
                grid[row].len()
            ));
        }
    }
    if level.birds.is_empty() && level.butterflies.is_empty() {
        log::warn!("Level '{}' spawns no animals.", level.level_id);
    }
    Ok(())
}

fn check_tiles(
    grid: &[Vec<u32>],
    registry: &TilesetRegistry,
    layer: LevelLayer,
) -> Result<(), LevelError> {
    for (row, cells) in grid.iter().enumerate() {
        for (col, &id) in cells.iter().enumerate() {
            if id != EMPTY_TILE && !registry.contains(id) {
                return Err(LevelError::UnknownTile { layer, row, col, id });
            }
        }
    }
    Ok(())
}

/// Top edge of row 0. Short grids sit flush with the viewport bottom; tall
/// grids extend upward past the top of the screen.
pub fn grid_origin_y(rows: usize, config: &GameConfig) -> f32 {
    (config.visible_rows as f32 - rows as f32) * config.tile_size
}

/// Place every non-empty cell of `grid` as a wall.
pub fn build_layer(
    grid: &[Vec<u32>],
    registry: &TilesetRegistry,
    layer: LevelLayer,
    config: &GameConfig,
) -> Result<Vec<Wall>, LevelError> {
    if grid.is_empty() {
        return Err(LevelError::EmptyGrid { layer });
    }
    let tile = config.tile_size;
    let origin_y = grid_origin_y(grid.len(), config);
    let mut walls = Vec::new();
    for (row, cells) in grid.iter().enumerate() {
        for (col, &id) in cells.iter().enumerate() {
            if id == EMPTY_TILE {
                continue;
            }
            let info = registry
                .get(id)
                .ok_or(LevelError::UnknownTile { layer, row, col, id })?;
            let rect = Rect::new(col as f32 * tile, origin_y + row as f32 * tile, tile, tile);
            walls.push(Wall::new(
                rect,
                info.solidity == Solidity::TopOnly,
                Some(info.visual),
            ));
        }
    }
    Ok(walls)
}

/// Invisible full-height walls just outside both ends of the level.
pub fn level_borders(columns: usize, config: &GameConfig) -> [Wall; 2] {
    let height = config.display_height as f32;
    let right = columns as f32 * config.tile_size;
    [
        Wall::solid(Rect::new(-1.0, 0.0, 1.0, height)),
        Wall::solid(Rect::new(right, 0.0, 1.0, height)),
    ]
}

/// The three built layers plus resolved spawn points.
#[derive(Debug, Clone)]
pub struct BuiltLevel {
    pub background_details: Vec<Wall>,
    pub walls: Vec<Wall>,
    pub details: Vec<Wall>,
    pub columns: usize,
    pub player_start: Vec2,
    pub birds: Vec<Vec2>,
    pub butterflies: Vec<Vec2>,
}

pub fn build_level(
    level: &LevelContent,
    registry: &TilesetRegistry,
    config: &GameConfig,
) -> Result<BuiltLevel, LevelError> {
    let background_details = build_layer(
        &level.background_details,
        registry,
        LevelLayer::BackgroundDetail,
        config,
    )?;
    let mut walls = build_layer(&level.solid, registry, LevelLayer::Solid, config)?;
    let details = build_layer(
        &level.details,
        registry,
        LevelLayer::ForegroundDetail,
        config,
    )?;
    let columns = level.columns();
    walls.extend(level_borders(columns, config));

    log::info!(
        "Built level '{}': {} walls, {} background details, {} details, {} columns",
        level.level_id,
        walls.len(),
        background_details.len(),
        details.len(),
        columns
    );

    Ok(BuiltLevel {
        background_details,
        walls,
        details,
        columns,
        player_start: Vec2::from(level.player_start.unwrap_or(config.player_start)),
        birds: level.birds.iter().copied().map(Vec2::from).collect(),
        butterflies: level.butterflies.iter().copied().map(Vec2::from).collect(),
    })
}
