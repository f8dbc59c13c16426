//! ROM reference passed to the emulator.
//!
//! RetroArch loads a member of a zip archive when given `archive.zip#member`.
//! Cartridge images stored as PNG are the exception: RetroArch would treat
//! them as pictures, so they are materialized as `.p8` files in a temporary
//! directory owned by the launch session.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use romvault_core::LaunchError;
use romvault_core::cores::{
    CARTRIDGE_IMAGE_CORE, CARTRIDGE_IMAGE_TARGET_EXT, is_archive_extension,
    is_cartridge_image_extension,
};
use romvault_core::library::{extract_member, first_recognized_member};
use tempfile::TempDir;

fn lowercase_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Where the playable ROM data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RomSource {
    /// A plain file.
    File { path: PathBuf, extension: String },
    /// A member of a zip archive.
    ArchiveMember {
        archive: PathBuf,
        member: String,
        extension: String,
    },
}

impl RomSource {
    /// Inspect a ROM path. For archives the member best matching the
    /// platform is picked, see [`first_recognized_member`].
    pub fn inspect(rom: &Path, platform_hint: Option<&str>) -> Result<Self, LaunchError> {
        if !rom.is_file() {
            return Err(LaunchError::NotFound(rom.display().to_string()));
        }

        let extension = lowercase_extension(&rom.to_string_lossy());
        if !is_archive_extension(&extension) {
            return Ok(Self::File {
                path: rom.to_path_buf(),
                extension,
            });
        }

        let member = first_recognized_member(rom, platform_hint)
            .map_err(|e| LaunchError::Archive(format!("{}: {}", rom.display(), e)))?
            .ok_or_else(|| LaunchError::Archive(rom.display().to_string()))?;
        tracing::debug!("Using archive member {} of {}", member, rom.display());

        Ok(Self::ArchiveMember {
            archive: rom.to_path_buf(),
            extension: lowercase_extension(&member),
            member,
        })
    }

    /// Extension used for core resolution.
    pub fn extension(&self) -> &str {
        match self {
            Self::File { extension, .. } | Self::ArchiveMember { extension, .. } => extension,
        }
    }

    fn needs_materializing(&self, core: &str) -> bool {
        is_cartridge_image_extension(self.extension())
            && core.eq_ignore_ascii_case(CARTRIDGE_IMAGE_CORE)
    }

    /// Build the emulator argument for running this ROM with `core`.
    ///
    /// Materialized cartridges go into a fresh directory under `temp_root`.
    pub fn prepare(&self, core: &str, temp_root: &Path) -> Result<PreparedRom, LaunchError> {
        if self.needs_materializing(core) {
            return self.materialize(temp_root);
        }

        let argument = match self {
            Self::File { path, .. } => path.clone().into_os_string(),
            Self::ArchiveMember {
                archive, member, ..
            } => {
                let mut argument = archive.clone().into_os_string();
                argument.push("#");
                argument.push(member);
                argument
            }
        };
        Ok(PreparedRom {
            argument,
            temp_dir: None,
        })
    }

    fn materialize(&self, temp_root: &Path) -> Result<PreparedRom, LaunchError> {
        let temp_dir = tempfile::Builder::new()
            .prefix("romvault-rom-")
            .tempdir_in(temp_root)?;

        let source_name = match self {
            Self::File { path, .. } => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            Self::ArchiveMember { member, .. } => member.rsplit('/').next().map(str::to_string),
        };
        let stem = source_name
            .as_deref()
            .and_then(|n| Path::new(n).file_stem())
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("cart");
        let dest = temp_dir
            .path()
            .join(format!("{stem}.{CARTRIDGE_IMAGE_TARGET_EXT}"));

        match self {
            Self::File { path, .. } => {
                if let Err(e) = fs::hard_link(path, &dest) {
                    tracing::debug!("Hard link failed ({}), copying cartridge instead", e);
                    fs::copy(path, &dest)?;
                }
            }
            Self::ArchiveMember {
                archive, member, ..
            } => extract_member(archive, member, &dest)
                .map_err(|e| LaunchError::Archive(format!("{}: {}", archive.display(), e)))?,
        }
        tracing::debug!("Materialized cartridge at {}", dest.display());

        Ok(PreparedRom {
            argument: dest.into_os_string(),
            temp_dir: Some(temp_dir),
        })
    }
}

/// Final ROM argument and any temporary files backing it.
#[derive(Debug)]
pub struct PreparedRom {
    pub argument: OsString,
    pub temp_dir: Option<TempDir>,
}
