//! Local save and state files
//!
//! Assets live two levels below their base directory (`<base>/<core>/<file>`),
//! except for cores whose saves the emulator nests one level deeper. Those
//! cores are listed in [`NESTED_CORE_DIRS`].

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use romvault_shared::AssetKind;
use walkdir::WalkDir;

use super::layout::asset_base_dir;
use super::sanitize::validate_asset_path;
use crate::error::{PathTraversalError, SyncError};

/// Server core labels stored under a nested local directory, and the label
/// files found there are uploaded under.
///
/// `reicast` and `redream` are historical labels for Dreamcast saves; the
/// emulator now keeps VMU images under `flycast/dc`.
pub const NESTED_CORE_DIRS: &[(&str, &str, &str)] = &[
    ("reicast", "flycast/dc", "flycast"),
    ("redream", "flycast/dc", "flycast"),
];

/// Relative directory (using `/`) for a sanitized core label.
fn local_core_dir(core: &str) -> &str {
    NESTED_CORE_DIRS
        .iter()
        .find(|(label, _, _)| label.eq_ignore_ascii_case(core))
        .map_or(core, |(_, dir, _)| *dir)
}

/// Upload label for files found under a relative core directory.
fn label_for_core_dir(dir: &str) -> Option<&'static str> {
    NESTED_CORE_DIRS
        .iter()
        .find(|(_, nested, _)| *nested == dir)
        .map(|(_, _, label)| *label)
}

/// A save or state file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    pub kind: AssetKind,
    /// Core label the asset belongs to.
    pub core: String,
    /// Filename inside the core directory.
    pub name: String,
    pub modified: DateTime<Utc>,
    pub path: PathBuf,
}

/// Saves and states of one game.
#[derive(Debug, Clone)]
pub struct AssetStore {
    rom_dir: PathBuf,
}

impl AssetStore {
    /// Store rooted at the directory holding the game's ROM.
    pub fn new(rom_dir: impl Into<PathBuf>) -> Self {
        Self {
            rom_dir: rom_dir.into(),
        }
    }

    pub fn base_dir(&self, kind: AssetKind) -> PathBuf {
        asset_base_dir(&self.rom_dir, kind)
    }

    /// Filesystem path for an asset, after sanitization.
    pub fn path_for(
        &self,
        kind: AssetKind,
        core: &str,
        file_name: &str,
    ) -> Result<PathBuf, PathTraversalError> {
        let (core, file_name) = validate_asset_path(core, file_name)?;
        let mut path = self.base_dir(kind);
        for segment in local_core_dir(&core).split('/') {
            path.push(segment);
        }
        path.push(file_name);
        Ok(path)
    }

    /// All assets of one kind. A missing base directory yields an empty list.
    pub fn list(&self, kind: AssetKind) -> io::Result<Vec<LocalAsset>> {
        let base = self.base_dir(kind);
        if !base.is_dir() {
            return Ok(vec![]);
        }

        let mut assets = Vec::new();
        for entry in WalkDir::new(&base).min_depth(2).max_depth(3) {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&base) else {
                continue;
            };
            let Some(parent) = relative.parent() else {
                continue;
            };
            let segments: Vec<&str> = parent
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect();
            let core = match segments.as_slice() {
                [core] => (*core).to_string(),
                [_, _] => match label_for_core_dir(&segments.join("/")) {
                    Some(label) => label.to_string(),
                    None => continue,
                },
                _ => continue,
            };

            // Listed paths still have to pass the sanitizer unchanged.
            let (clean_core, clean_name) = match validate_asset_path(&core, name) {
                Ok(clean) => clean,
                Err(e) => {
                    tracing::warn!("Skipping local asset: {}", e);
                    continue;
                }
            };

            let modified = entry.metadata().map_err(io::Error::other)?.modified()?;
            assets.push(LocalAsset {
                kind,
                core: clean_core,
                name: clean_name,
                modified: DateTime::<Utc>::from(modified),
                path: entry.path().to_path_buf(),
            });
        }

        assets.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.core.cmp(&b.core)));
        Ok(assets)
    }

    /// Read an asset's bytes.
    pub fn read(&self, asset: &LocalAsset) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        fs::File::open(&asset.path)?.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Write an asset from a reader, creating its core directory.
    ///
    /// Returns the path written.
    pub fn write(
        &self,
        kind: AssetKind,
        core: &str,
        file_name: &str,
        mut contents: impl Read,
    ) -> Result<PathBuf, SyncError> {
        let path = self.path_for(kind, core, file_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&path)?;
        io::copy(&mut contents, &mut file)?;
        file.flush()?;
        Ok(path)
    }

    /// Delete an asset. Missing files are not an error.
    pub fn delete(
        &self,
        kind: AssetKind,
        core: &str,
        file_name: &str,
    ) -> Result<(), SyncError> {
        let path = self.path_for(kind, core, file_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Set a file's modification time.
pub fn set_modified(path: &Path, time: DateTime<Utc>) -> io::Result<()> {
    let file = fs::File::options().write(true).open(path)?;
    file.set_modified(SystemTime::from(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn store() -> (TempDir, AssetStore) {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_path_for_plain_core() {
        let (dir, store) = store();
        assert_eq!(
            store.path_for(AssetKind::Save, "snes9x", "a.srm").unwrap(),
            dir.path().join("saves").join("snes9x").join("a.srm")
        );
    }

    #[test]
    fn test_path_for_sanitizes() {
        let (dir, store) = store();
        assert_eq!(
            store
                .path_for(AssetKind::State, "../../etc", "passwd")
                .unwrap(),
            dir.path().join("states").join("etc").join("passwd")
        );
        assert!(store.path_for(AssetKind::State, "..", "x").is_err());
    }

    #[test]
    fn test_historical_labels_map_to_nested_dir() {
        let (dir, store) = store();
        let expected = dir
            .path()
            .join("saves")
            .join("flycast")
            .join("dc")
            .join("vmu_save_A1.bin");
        assert_eq!(
            store
                .path_for(AssetKind::Save, "reicast", "vmu_save_A1.bin")
                .unwrap(),
            expected
        );
        assert_eq!(
            store
                .path_for(AssetKind::Save, "Redream", "vmu_save_A1.bin")
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let (_dir, store) = store();
        assert!(store.list(AssetKind::Save).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_list() {
        let (_dir, store) = store();
        store
            .write(AssetKind::Save, "snes9x", "a.srm", &b"save data"[..])
            .unwrap();
        store
            .write(AssetKind::Save, "reicast", "vmu.bin", &b"vmu"[..])
            .unwrap();

        let assets = store.list(AssetKind::Save).unwrap();
        let names: Vec<(&str, &str)> = assets
            .iter()
            .map(|a| (a.core.as_str(), a.name.as_str()))
            .collect();
        assert_eq!(names, vec![("snes9x", "a.srm"), ("flycast", "vmu.bin")]);
        assert_eq!(store.read(&assets[0]).unwrap(), b"save data");
    }

    #[test]
    fn test_list_skips_hidden_loose_and_unknown_nested_files() {
        let (dir, store) = store();
        let saves = dir.path().join("saves");
        fs::create_dir_all(saves.join("mgba")).unwrap();
        fs::create_dir_all(saves.join("other").join("deep")).unwrap();
        fs::write(saves.join("loose.srm"), b"x").unwrap();
        fs::write(saves.join("mgba").join(".DS_Store"), b"x").unwrap();
        fs::write(saves.join("other").join("deep").join("x.srm"), b"x").unwrap();
        fs::write(saves.join("mgba").join("game.sav"), b"x").unwrap();

        let assets = store.list(AssetKind::Save).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].core, "mgba");
        assert_eq!(assets[0].name, "game.sav");
    }

    #[test]
    fn test_set_modified_round_trips_through_listing() {
        let (_dir, store) = store();
        let path = store
            .write(AssetKind::State, "gambatte", "a.state", &b"s"[..])
            .unwrap();
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        set_modified(&path, when).unwrap();

        let assets = store.list(AssetKind::State).unwrap();
        assert_eq!(assets[0].modified, when);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = store();
        let path = store
            .write(AssetKind::Save, "mgba", "a.sav", &b"s"[..])
            .unwrap();
        store.delete(AssetKind::Save, "mgba", "a.sav").unwrap();
        assert!(!path.exists());
        store.delete(AssetKind::Save, "mgba", "a.sav").unwrap();
        assert!(store.delete(AssetKind::Save, "..", "a.sav").is_err());
    }
}
