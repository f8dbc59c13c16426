//! Emulator launching
//!
//! Pre-flight runs on the caller's thread and reports every failure before
//! anything is spawned. The emulator is then waited on by a background
//! thread, which removes the session's temporary files and emits
//! [`LauncherEvent::GameExited`].

mod download;
mod executable;
mod platform;
mod retroarch_cfg;
mod session;
mod target;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::thread::JoinHandle;

use romvault_core::LaunchError;
use romvault_core::cores::core_for_rom;
use romvault_core::library::asset_base_dir;
use romvault_shared::{AssetKind, is_safe_path_component};

use crate::events::{EventSink, LauncherEvent};

pub use download::{BUILDBOT_URL, core_download_url, download_core, install_core_archive};
pub use executable::{emulator_root, resolve_executable};
pub use platform::{
    Arch, HostOs, binary_arch, cores_dir, emulator_arch, library_file_name,
    permanent_config_path,
};
pub use retroarch_cfg::clear_achievement_token;
pub use session::{Credentials, LaunchSession, ThrowawayConfig};
pub use target::{PreparedRom, RomSource};

/// One launch of one ROM.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    /// RetroArch binary, install directory, app bundle or program name.
    pub executable: PathBuf,
    pub rom: PathBuf,
    pub credentials: Option<Credentials>,
    pub core_override: Option<String>,
    pub platform_hint: Option<String>,
    /// Catalog id, passed through to events.
    pub game_id: Option<u64>,
}

/// A running emulator.
#[derive(Debug)]
pub struct LaunchHandle {
    pub core: String,
    pub pid: u32,
    waiter: JoinHandle<Option<ExitStatus>>,
}

impl LaunchHandle {
    /// Block until the emulator exited and its session was cleaned up.
    ///
    /// Returns `None` if the exit status could not be collected.
    pub fn wait(self) -> Option<ExitStatus> {
        self.waiter.join().ok().flatten()
    }
}

/// Build the emulator command line.
pub fn build_command(
    executable: &Path,
    working_dir: &Path,
    core_library: &Path,
    config: &Path,
    rom: &OsStr,
) -> Command {
    let mut cmd = Command::new(executable);
    cmd.arg("-L")
        .arg(core_library)
        .arg("-f")
        .arg("-v")
        .arg("--appendconfig")
        .arg(config)
        .arg(rom)
        .current_dir(working_dir);
    cmd
}

/// Launches ROMs through RetroArch.
pub struct Launcher {
    events: Arc<dyn EventSink>,
    cores_dir: Option<PathBuf>,
    download_cores: bool,
    buildbot_url: String,
    temp_dir: PathBuf,
}

impl Launcher {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            events,
            cores_dir: None,
            download_cores: true,
            buildbot_url: BUILDBOT_URL.to_string(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Use a fixed core directory instead of RetroArch's per-OS default.
    pub fn with_cores_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cores_dir = Some(dir.into());
        self
    }

    pub fn with_core_downloads(mut self, enabled: bool) -> Self {
        self.download_cores = enabled;
        self
    }

    pub fn with_buildbot_url(mut self, url: impl Into<String>) -> Self {
        self.buildbot_url = url.into();
        self
    }

    /// Directory for session configs and materialized ROMs (default: the
    /// system temp dir).
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    fn resolve_core(
        &self,
        request: &LaunchRequest,
        source: &RomSource,
    ) -> Result<String, LaunchError> {
        if let Some(core) = request
            .core_override
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            if !is_safe_path_component(core) {
                return Err(LaunchError::CoreResolution(format!(
                    "invalid core name {:?}",
                    core
                )));
            }
            return Ok(core.to_string());
        }

        core_for_rom(source.extension(), request.platform_hint.as_deref())
            .map(str::to_string)
            .ok_or_else(|| LaunchError::CoreResolution(request.rom.display().to_string()))
    }

    /// Path of the core library, downloading it when missing.
    fn ensure_core(
        &self,
        core: &str,
        executable: &Path,
        root: &Path,
        game_id: Option<u64>,
    ) -> Result<PathBuf, LaunchError> {
        let dir = match &self.cores_dir {
            Some(dir) => dir.clone(),
            None => cores_dir(root).ok_or_else(|| {
                LaunchError::Configuration("cannot determine RetroArch cores directory".to_string())
            })?,
        };

        let os = HostOs::current();
        let file_name = library_file_name(core, os);
        let path = dir.join(&file_name);
        if path.is_file() {
            return Ok(path);
        }

        if !self.download_cores {
            return Err(LaunchError::CoreDownload {
                core: core.to_string(),
                reason: format!("{} is not installed", path.display()),
            });
        }

        let arch = emulator_arch(executable);
        let url = core_download_url(&self.buildbot_url, os, arch, &file_name);
        let events = Arc::clone(&self.events);
        download_core(core, &url, &dir, &file_name, &mut |percentage| {
            events.emit(LauncherEvent::DownloadProgress {
                game_id,
                percentage,
            });
        })
    }

    /// Launch a ROM. Returns once the emulator has been spawned.
    pub fn launch(&self, request: LaunchRequest) -> Result<LaunchHandle, LaunchError> {
        let executable = resolve_executable(&request.executable)?;
        let root = emulator_root(&executable);

        let hint = request.platform_hint.as_deref();
        let source = RomSource::inspect(&request.rom, hint)?;
        let core = self.resolve_core(&request, &source)?;
        let core_library = self.ensure_core(&core, &executable, &root, request.game_id)?;

        let rom_dir = request.rom.parent().unwrap_or_else(|| Path::new("."));
        let save_dir = asset_base_dir(rom_dir, AssetKind::Save);
        let state_dir = asset_base_dir(rom_dir, AssetKind::State);
        std::fs::create_dir_all(&save_dir)?;
        std::fs::create_dir_all(&state_dir)?;

        let prepared = source.prepare(&core, &self.temp_dir)?;
        let session = LaunchSession::create(
            &ThrowawayConfig {
                save_dir,
                state_dir,
                credentials: request.credentials.clone(),
            },
            prepared.temp_dir,
            &self.temp_dir,
        )?;

        let mut cmd = build_command(
            &executable,
            &root,
            &core_library,
            session.config_path(),
            &prepared.argument,
        );
        tracing::info!("Launching emulator: {:?}", cmd);

        let game_id = request.game_id;
        self.events.emit(LauncherEvent::GameStarted { game_id });

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                session.cleanup();
                self.events.emit(LauncherEvent::GameExited { game_id });
                return Err(LaunchError::Launch(format!(
                    "failed to spawn {}: {}",
                    executable.display(),
                    e
                )));
            }
        };

        let pid = child.id();
        let events = Arc::clone(&self.events);
        let waiter = std::thread::spawn(move || {
            let status = match child.wait() {
                Ok(status) => {
                    if status.success() {
                        tracing::info!("Emulator exited normally");
                    } else {
                        tracing::error!("Emulator exited with {}", status);
                    }
                    Some(status)
                }
                Err(e) => {
                    tracing::error!("Failed to wait for emulator: {}", e);
                    None
                }
            };
            session.cleanup();
            events.emit(LauncherEvent::GameExited { game_id });
            status
        });

        Ok(LaunchHandle { core, pid, waiter })
    }
}
