//! Shared test utilities for unit tests

use std::io::Cursor;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use romvault_shared::{AssetKind, Game, ServerAsset};

use crate::catalog::{CatalogApi, DownloadedAsset};
use crate::error::NetworkError;

/// Game record used by most tests: a SNES ROM with id 1.
pub fn test_game() -> Game {
    Game {
        id: 1,
        title: "Test Game".to_string(),
        full_path: "snes/Test Game.sfc".to_string(),
        platform: "snes".to_string(),
        size_bytes: 4,
    }
}

struct StoredAsset {
    kind: AssetKind,
    record: ServerAsset,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct CatalogState {
    assets: Vec<StoredAsset>,
    next_id: u64,
    uploads: usize,
    downloads: usize,
    failing_downloads: Vec<String>,
}

/// In-memory catalog holding a single game.
///
/// Uploads are stamped with a fixed server clock and a bracketed timestamp
/// suffix, the way the real server renames them.
pub struct FakeCatalog {
    game: Game,
    server_now: DateTime<Utc>,
    state: Mutex<CatalogState>,
}

impl FakeCatalog {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            server_now: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            state: Mutex::new(CatalogState::default()),
        }
    }

    pub fn add_server_asset(
        &self,
        kind: AssetKind,
        file_name: &str,
        emulator: Option<&str>,
        updated_at: DateTime<Utc>,
        bytes: &[u8],
    ) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.assets.push(StoredAsset {
            kind,
            record: ServerAsset {
                id,
                file_name: file_name.to_string(),
                download_path: format!("/assets/{id}/{file_name}"),
                emulator: emulator.map(str::to_string),
                updated_at,
            },
            bytes: bytes.to_vec(),
        });
    }

    /// Make downloads of the named server file fail.
    pub fn fail_download_of(&self, file_name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_downloads
            .push(file_name.to_string());
    }

    pub fn upload_count(&self) -> usize {
        self.state.lock().unwrap().uploads
    }

    pub fn download_count(&self) -> usize {
        self.state.lock().unwrap().downloads
    }
}

impl CatalogApi for FakeCatalog {
    fn get_game(&self, game_id: u64) -> Result<Game, NetworkError> {
        if game_id == self.game.id {
            Ok(self.game.clone())
        } else {
            Err(NetworkError(format!("404 Not Found: game {game_id}")))
        }
    }

    fn list_server_assets(
        &self,
        game_id: u64,
        kind: AssetKind,
    ) -> Result<Vec<ServerAsset>, NetworkError> {
        self.get_game(game_id)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .assets
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.record.clone())
            .collect())
    }

    fn upload_asset(
        &self,
        game_id: u64,
        kind: AssetKind,
        core: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ServerAsset, NetworkError> {
        self.get_game(game_id)?;
        let stamped = match file_name.rsplit_once('.') {
            Some((stem, ext)) => format!(
                "{stem} [{}].{ext}",
                self.server_now.format("%Y-%m-%d_%H-%M-%S")
            ),
            None => format!("{file_name} [{}]", self.server_now.format("%Y-%m-%d_%H-%M-%S")),
        };
        self.add_server_asset(kind, &stamped, Some(core), self.server_now, &bytes);

        let mut state = self.state.lock().unwrap();
        state.uploads += 1;
        state
            .assets
            .last()
            .map(|a| a.record.clone())
            .ok_or_else(|| NetworkError("upload lost".to_string()))
    }

    fn download_asset(&self, download_path: &str) -> Result<DownloadedAsset, NetworkError> {
        let mut state = self.state.lock().unwrap();
        let Some(asset) = state
            .assets
            .iter()
            .find(|a| a.record.download_path == download_path)
        else {
            return Err(NetworkError(format!("404 Not Found: {download_path}")));
        };
        if state.failing_downloads.contains(&asset.record.file_name) {
            return Err(NetworkError("503 Service Unavailable".to_string()));
        }
        let file_name = asset.record.file_name.clone();
        let bytes = asset.bytes.clone();
        state.downloads += 1;
        Ok(DownloadedAsset {
            reader: Box::new(Cursor::new(bytes)),
            file_name,
        })
    }
}
