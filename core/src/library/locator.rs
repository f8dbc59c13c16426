//! Locating the playable ROM inside a game directory.

use std::fs;
use std::path::{Path, PathBuf};

use romvault_shared::Game;

use crate::cores::{
    cores_for_extension, cores_for_platform_label, is_archive_extension, rom_match_rank,
};

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Last component of the catalog's `full_path`, accepting either separator.
fn catalog_file_name(full_path: &str) -> Option<&str> {
    full_path
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Regular, non-hidden files directly inside `dir`, sorted by name.
fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return vec![];
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name();
            if is_hidden(name.to_str()?) {
                return None;
            }
            let file_type = entry.file_type().ok()?;
            file_type.is_file().then(|| entry.path())
        })
        .collect();
    files.sort();
    files
}

/// Find the playable ROM for `game` inside `dir`.
///
/// First match wins:
/// 1. The file named by the catalog's `full_path`.
/// 2. A file whose extension maps to a core the game's platform also lists.
/// 3. The first file with any known ROM extension, or an archive. Cartridge
///    images are only taken when nothing else qualifies.
pub fn locate_rom(dir: &Path, game: &Game) -> Option<PathBuf> {
    if let Some(name) = catalog_file_name(&game.full_path)
        && !is_hidden(name)
    {
        let exact = dir.join(name);
        if fs::metadata(&exact).is_ok_and(|m| m.is_file()) {
            tracing::debug!("Located ROM by catalog name: {}", exact.display());
            return Some(exact);
        }
    }

    let files = candidate_files(dir);

    let platform_cores = cores_for_platform_label(&game.platform);
    if !platform_cores.is_empty()
        && let Some(path) = files.iter().find(|path| {
            extension_of(path).is_some_and(|ext| {
                cores_for_extension(ext)
                    .iter()
                    .any(|core| platform_cores.contains(core))
            })
        })
    {
        tracing::debug!("Located ROM by platform core match: {}", path.display());
        return Some(path.clone());
    }

    // Cartridge images rank last so box art never shadows a ROM.
    let fallback = files
        .into_iter()
        .filter_map(|path| {
            let ext = extension_of(&path)?;
            let rank = if is_archive_extension(ext) {
                1
            } else {
                rom_match_rank(ext, platform_cores)?
            };
            Some((rank, path))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, path)| path);
    if let Some(path) = &fallback {
        tracing::debug!("Located ROM by extension fallback: {}", path.display());
    }
    fallback
}
