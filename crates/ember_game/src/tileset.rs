//! Tileset registry: maps tile ids to their visual and solidity rule.
//!
//! Several tilesets can be declared in one file; ids must be unique across
//! all of them because level grids store bare ids. Id 0 is reserved for
//! "no tile" and may not be declared.

use ember_core::draw::Visual;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const EMPTY_TILE: u32 = 0;

#[derive(Debug, Deserialize, Clone)]
pub struct TilesetFile {
    pub version: String,
    pub tilesets: Vec<Tileset>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Tileset {
    pub id: u32,
    pub name: String,
    pub tiles: Vec<TileDef>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileDef {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub color: [u8; 4],
}

/// Solidity is a property of the id itself: every fifth id is a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solidity {
    Full,
    TopOnly,
}

impl Solidity {
    pub fn for_tile(id: u32) -> Self {
        if id % 5 == 0 {
            Self::TopOnly
        } else {
            Self::Full
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileInfo {
    pub visual: Visual,
    pub solidity: Solidity,
}

#[derive(Debug, Clone, Default)]
pub struct TilesetRegistry {
    tiles: HashMap<u32, TileInfo>,
}

impl TilesetRegistry {
    pub fn from_file(file: TilesetFile) -> Self {
        let mut tiles = HashMap::new();
        for tileset in file.tilesets {
            for tile in tileset.tiles {
                tiles.insert(
                    tile.id,
                    TileInfo {
                        visual: Visual::Tile {
                            id: tile.id,
                            color: tile.color,
                        },
                        solidity: Solidity::for_tile(tile.id),
                    },
                );
            }
        }
        Self { tiles }
    }

    pub fn get(&self, id: u32) -> Option<&TileInfo> {
        self.tiles.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.tiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

pub fn load_tilesets_from_path(path: &Path) -> Result<TilesetRegistry, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let file: TilesetFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse tileset JSON {}: {e}", path.display()))?;
    validate_tileset_file(&file)?;
    Ok(TilesetRegistry::from_file(file))
}

fn validate_tileset_file(file: &TilesetFile) -> Result<(), String> {
    if file.tilesets.is_empty() {
        return Err("Tileset validation failed: tilesets array is empty".to_string());
    }

    let mut owners: HashMap<u32, &str> = HashMap::new();
    for tileset in &file.tilesets {
        if tileset.tiles.is_empty() {
            log::warn!(
                "Tileset '{}' ({}) declares no tiles.",
                tileset.name,
                tileset.id
            );
        }
        for tile in &tileset.tiles {
            if tile.id == EMPTY_TILE {
                return Err(format!(
                    "Tileset validation failed: tileset '{}' declares reserved empty id 0",
                    tileset.name
                ));
            }
            if let Some(previous) = owners.insert(tile.id, &tileset.name) {
                return Err(format!(
                    "Tileset validation failed: duplicate tile id {} (in '{}' and '{}')",
                    tile.id, previous, tileset.name
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "ember_tileset_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn every_fifth_id_is_top_solid() {
        assert_eq!(Solidity::for_tile(5), Solidity::TopOnly);
        assert_eq!(Solidity::for_tile(15), Solidity::TopOnly);
        assert_eq!(Solidity::for_tile(11), Solidity::Full);
        assert_eq!(Solidity::for_tile(14), Solidity::Full);
    }

    #[test]
    fn load_tilesets_valid_file_parses() {
        let path = temp_file_path("valid");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "tilesets": [
                { "id": 1, "name": "dirt", "tiles": [
                  { "id": 11, "name": "dirt_top", "color": [120, 80, 40, 255] },
                  { "id": 15, "name": "plank", "color": [150, 100, 50, 255] }
                ]},
                { "id": 2, "name": "flora", "tiles": [
                  { "id": 21, "color": [40, 160, 40, 255] }
                ]}
              ]
            }"#,
        )
        .expect("write temp file");

        let registry = load_tilesets_from_path(&path).expect("valid tileset should load");
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get(15).expect("plank registered").solidity,
            Solidity::TopOnly
        );
        assert!(registry.contains(21));
        assert!(!registry.contains(99));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_tilesets_rejects_duplicate_ids_across_sets() {
        let path = temp_file_path("dup");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "tilesets": [
                { "id": 1, "name": "a", "tiles": [ { "id": 11, "color": [0,0,0,255] } ] },
                { "id": 2, "name": "b", "tiles": [ { "id": 11, "color": [0,0,0,255] } ] }
              ]
            }"#,
        )
        .expect("write temp file");

        let err = load_tilesets_from_path(&path).expect_err("duplicate ids should fail");
        assert!(err.contains("duplicate tile id 11"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_tilesets_rejects_reserved_empty_id() {
        let path = temp_file_path("empty_id");
        fs::write(
            &path,
            r#"{ "version": "0.1", "tilesets": [
                { "id": 1, "name": "a", "tiles": [ { "id": 0, "color": [0,0,0,255] } ] }
            ]}"#,
        )
        .expect("write temp file");

        let err = load_tilesets_from_path(&path).expect_err("id 0 should fail");
        assert!(err.contains("reserved empty id"));
        let _ = fs::remove_file(path);
    }
}
