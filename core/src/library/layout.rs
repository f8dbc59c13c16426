//! On-disk library layout
//!
//! ```text
//! <root>/<platform>/<game id>/<rom files>
//! <root>/<platform>/<game id>/saves/<core>/<file>
//! <root>/<platform>/<game id>/states/<core>/<file>
//! ```

use std::path::{Path, PathBuf};

use romvault_shared::{AssetKind, Game, is_safe_path_component};

use crate::error::PathTraversalError;

/// Resolves per-game directories under a library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    root: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a game's ROM files and its save/state trees.
    ///
    /// The platform slug comes from the catalog and is rejected unless it is
    /// a single safe path component.
    pub fn game_dir(&self, game: &Game) -> Result<PathBuf, PathTraversalError> {
        if !is_safe_path_component(&game.platform) {
            return Err(PathTraversalError {
                core: game.platform.clone(),
                filename: game.id.to_string(),
            });
        }
        Ok(self.root.join(&game.platform).join(game.id.to_string()))
    }
}

/// Base directory for one kind of asset next to a ROM directory.
pub fn asset_base_dir(rom_dir: &Path, kind: AssetKind) -> PathBuf {
    rom_dir.join(kind.dir_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(platform: &str) -> Game {
        Game {
            id: 17,
            title: "Tetris".to_string(),
            full_path: "gb/Tetris.gb".to_string(),
            platform: platform.to_string(),
            size_bytes: 32768,
        }
    }

    #[test]
    fn test_game_dir() {
        let layout = LibraryLayout::new("/library");
        assert_eq!(
            layout.game_dir(&game("gb")).unwrap(),
            PathBuf::from("/library/gb/17")
        );
    }

    #[test]
    fn test_game_dir_rejects_traversal_platform() {
        let layout = LibraryLayout::new("/library");
        assert!(layout.game_dir(&game("..")).is_err());
        assert!(layout.game_dir(&game("../etc")).is_err());
        assert!(layout.game_dir(&game("")).is_err());
    }

    #[test]
    fn test_asset_base_dir() {
        let dir = Path::new("/library/gb/17");
        assert_eq!(asset_base_dir(dir, AssetKind::Save), dir.join("saves"));
        assert_eq!(asset_base_dir(dir, AssetKind::State), dir.join("states"));
    }
}
