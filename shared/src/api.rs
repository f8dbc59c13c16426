//! Catalog response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A game in the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Catalog identifier.
    pub id: u64,
    /// Display title shown in the library.
    #[serde(alias = "name")]
    pub title: String,
    /// Path of the ROM relative to the library root (e.g. "snes/Chrono Trigger.sfc").
    pub full_path: String,
    /// Platform slug (e.g. "snes", "gbc").
    #[serde(alias = "platform_slug")]
    pub platform: String,
    /// Total size of the game's files in bytes.
    #[serde(default, alias = "fs_size_bytes")]
    pub size_bytes: u64,
}

/// Which kind of asset a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// In-game battery save (`.srm` and friends).
    Save,
    /// Emulator save state.
    State,
}

impl AssetKind {
    /// Name of the per-game directory holding this kind of asset.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Save => "saves",
            Self::State => "states",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::State => "state",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A save or state stored on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAsset {
    /// Server-side identifier.
    pub id: u64,
    /// Stored filename. May carry a ` [YYYY-MM-DD_HH-MM-SS]` suffix.
    pub file_name: String,
    /// Opaque handle used to download the file.
    pub download_path: String,
    /// Core / emulator label the asset was uploaded under.
    #[serde(default)]
    pub emulator: Option<String>,
    /// Last modification time reported by the server.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_dir_names() {
        assert_eq!(AssetKind::Save.dir_name(), "saves");
        assert_eq!(AssetKind::State.dir_name(), "states");
    }

    #[test]
    fn test_game_accepts_catalog_field_names() {
        let json = r#"{
            "id": 42,
            "name": "Chrono Trigger",
            "full_path": "snes/Chrono Trigger.sfc",
            "platform_slug": "snes",
            "fs_size_bytes": 4194304
        }"#;
        let game: Game = serde_json::from_str(json).unwrap();
        assert_eq!(game.id, 42);
        assert_eq!(game.title, "Chrono Trigger");
        assert_eq!(game.platform, "snes");
        assert_eq!(game.size_bytes, 4_194_304);
    }

    #[test]
    fn test_server_asset_parses_timestamp() {
        let json = r#"{
            "id": 7,
            "file_name": "Chrono Trigger [2024-01-01_00-00-00].srm",
            "download_path": "/api/saves/7/content",
            "emulator": "snes9x",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let asset: ServerAsset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.emulator.as_deref(), Some("snes9x"));
        assert_eq!(asset.updated_at.timestamp(), 1_704_067_200);
    }
}
