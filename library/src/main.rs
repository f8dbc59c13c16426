//! RomVault launcher CLI
//!
//! # Commands
//!
//! - `romvault launch <rom>` - Run a ROM through RetroArch and wait for it to exit
//! - `romvault cores <path>` - List candidate cores for a ROM or archive
//! - `romvault locate [dir]` - Find the playable ROM in a game directory
//! - `romvault clear-token` - Clear the stale achievement token in retroarch.cfg
//!
//! Settings are read from `config.toml` in the platform config directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use romvault_core::app::config;
use romvault_core::cores::{cores_for_extension, is_archive_extension};
use romvault_core::library::{cores_in_archive, locate_rom};
use romvault_library::launch::{
    clear_achievement_token, emulator_root, permanent_config_path, resolve_executable,
};
use romvault_library::{Credentials, LaunchRequest, Launcher, LogSink};
use romvault_shared::Game;

/// RomVault - launch library ROMs through RetroArch
#[derive(Parser)]
#[command(name = "romvault")]
#[command(about = "Launch library ROMs through RetroArch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a ROM and wait for the emulator to exit
    Launch(LaunchArgs),

    /// List candidate cores for a ROM file or zip archive
    Cores {
        path: PathBuf,
    },

    /// Find the playable ROM inside a game directory
    Locate(LocateArgs),

    /// Clear the achievement token stored in the permanent retroarch.cfg
    ClearToken {
        /// RetroArch executable or install directory (default: from config)
        #[arg(long)]
        exe: Option<PathBuf>,
    },
}

#[derive(Args)]
struct LaunchArgs {
    /// ROM file or zip archive
    rom: PathBuf,

    /// Core to use instead of the default for the ROM's extension
    #[arg(long)]
    core: Option<String>,

    /// Platform label used to pick between cores (e.g. "Sega Saturn")
    #[arg(long)]
    platform: Option<String>,

    /// RetroArch executable or install directory (default: from config)
    #[arg(long)]
    exe: Option<PathBuf>,

    /// Catalog id reported in launcher events
    #[arg(long)]
    game_id: Option<u64>,
}

#[derive(Args)]
struct LocateArgs {
    /// Game directory (default: `<library>/<platform>/<id>`)
    dir: Option<PathBuf>,

    /// ROM path as recorded in the catalog
    #[arg(long, default_value = "")]
    full_path: String,

    /// Platform slug or label
    #[arg(long, default_value = "")]
    platform: String,

    /// Catalog id, used to find the game directory in the library
    #[arg(long, default_value_t = 0)]
    id: u64,
}

fn configured_executable(exe: Option<PathBuf>, config: &config::Config) -> Result<PathBuf> {
    match exe {
        Some(exe) => Ok(exe),
        None => Ok(config.executable()?.to_path_buf()),
    }
}

fn launch(args: LaunchArgs) -> Result<()> {
    let config = config::load();
    let executable = configured_executable(args.exe, &config)?;
    let credentials = config
        .achievements
        .credentials()
        .map(|(username, password)| Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });

    let launcher = Launcher::new(Arc::new(LogSink))
        .with_core_downloads(config.emulator.download_cores);
    let handle = launcher
        .launch(LaunchRequest {
            executable,
            rom: args.rom.clone(),
            credentials,
            core_override: args.core,
            platform_hint: args.platform,
            game_id: args.game_id,
        })
        .with_context(|| format!("Failed to launch {}", args.rom.display()))?;

    tracing::info!("Running {} with core {} (pid {})", args.rom.display(), handle.core, handle.pid);

    match handle.wait() {
        Some(status) if !status.success() => {
            tracing::debug!("Emulator exit status: {}", status)
        }
        Some(_) => {}
        None => tracing::warn!("Emulator exit status unavailable"),
    }
    Ok(())
}

fn list_cores(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let cores: Vec<&str> = if is_archive_extension(ext) {
        cores_in_archive(path)
            .with_context(|| format!("Failed to read archive {}", path.display()))?
            .into_iter()
            .collect()
    } else {
        cores_for_extension(ext).to_vec()
    };

    if cores.is_empty() {
        anyhow::bail!("No core mapped for {}", path.display());
    }
    for core in cores {
        println!("{}", core);
    }
    Ok(())
}

fn locate(args: LocateArgs) -> Result<()> {
    let game = Game {
        id: args.id,
        title: String::new(),
        full_path: args.full_path,
        platform: args.platform,
        size_bytes: 0,
    };
    let dir = match args.dir {
        Some(dir) => dir,
        None => config::load()
            .layout()?
            .game_dir(&game)
            .context("Cannot place the game in the library")?,
    };
    let rom = locate_rom(&dir, &game)
        .with_context(|| format!("No playable ROM found in {}", dir.display()))?;
    println!("{}", rom.display());
    Ok(())
}

fn clear_token(exe: Option<PathBuf>) -> Result<()> {
    let config = config::load();
    let executable = resolve_executable(&configured_executable(exe, &config)?)?;
    let cfg = permanent_config_path(&emulator_root(&executable))
        .context("Cannot determine the RetroArch config location")?;

    if clear_achievement_token(&cfg)
        .with_context(|| format!("Failed to update {}", cfg.display()))?
    {
        println!("Cleared achievement token in {}", cfg.display());
    } else {
        println!("No achievement token stored in {}", cfg.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Launch(args) => launch(args),
        Commands::Cores { path } => list_cores(&path),
        Commands::Locate(args) => locate(args),
        Commands::ClearToken { exe } => clear_token(exe),
    }
}
