//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for launcher settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::LaunchError;
use crate::library::LibraryLayout;

/// Launcher configuration.
///
/// Serialized to/from TOML format for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Local ROM library settings
    #[serde(default)]
    pub library: LibraryConfig,
    /// Emulator frontend settings
    #[serde(default)]
    pub emulator: EmulatorConfig,
    /// RetroAchievements credentials
    #[serde(default)]
    pub achievements: AchievementsConfig,
}

/// Where downloaded games live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LibraryConfig {
    /// Library root (default: `<data dir>/library`)
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Emulator frontend location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// RetroArch executable, install directory, app bundle, or program name on PATH
    #[serde(default)]
    pub executable: Option<PathBuf>,
    /// Download missing cores from the buildbot (default: true)
    #[serde(default = "default_true")]
    pub download_cores: bool,
}

/// Achievement login passed to the emulator for a single session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AchievementsConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            executable: None,
            download_cores: default_true(),
        }
    }
}

impl AchievementsConfig {
    /// Username and password, when both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl Config {
    /// Configured library root, falling back to the platform data directory.
    pub fn library_root(&self) -> Result<PathBuf, LaunchError> {
        self.library
            .root
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("library")))
            .ok_or_else(|| LaunchError::Configuration("library path not configured".to_string()))
    }

    /// Layout of the configured library.
    pub fn layout(&self) -> Result<LibraryLayout, LaunchError> {
        self.library_root().map(LibraryLayout::new)
    }

    /// Configured emulator executable.
    pub fn executable(&self) -> Result<&Path, LaunchError> {
        self.emulator
            .executable
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| {
                LaunchError::Configuration("emulator executable not configured".to_string())
            })
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\RomVault\config`
/// On macOS: `~/Library/Application Support/io.romvault.RomVault`
/// On Linux: `~/.config/RomVault`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.romvault", "", "RomVault")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory.
///
/// This is where the default library root lives.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.romvault", "", "RomVault")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_dir()
        .map(|dir| load_from(&dir.join("config.toml")))
        .unwrap_or_default()
}

/// Loads a configuration file, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file
/// cannot be written.
pub fn save(config: &Config) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        save_to(config, &dir.join("config.toml"))?;
    }
    Ok(())
}

/// Saves a configuration to a specific file.
pub fn save_to(config: &Config, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.library.root.is_none());
        assert!(config.emulator.executable.is_none());
        assert!(config.emulator.download_cores);
        assert!(config.achievements.credentials().is_none());
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml_str = r#"
[emulator]
executable = "/opt/retroarch"

[achievements]
username = "player"
password = "hunter2"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.executable().unwrap(), Path::new("/opt/retroarch"));
        assert!(config.emulator.download_cores);
        assert_eq!(config.achievements.credentials(), Some(("player", "hunter2")));
    }

    #[test]
    fn test_missing_executable_is_configuration_error() {
        let config = Config::default();
        assert!(matches!(
            config.executable(),
            Err(LaunchError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_password_means_no_credentials() {
        let achievements = AchievementsConfig {
            username: Some("player".to_string()),
            password: Some(String::new()),
        };
        assert!(achievements.credentials().is_none());
    }

    #[test]
    fn test_explicit_library_root_wins() {
        let config = Config {
            library: LibraryConfig {
                root: Some(PathBuf::from("/games")),
            },
            ..Config::default()
        };
        assert_eq!(config.library_root().unwrap(), PathBuf::from("/games"));
        assert_eq!(config.layout().unwrap().root(), Path::new("/games"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.emulator.executable = Some(PathBuf::from("retroarch"));
        config.emulator.download_cores = false;

        save_to(&config, &path).unwrap();
        assert_eq!(load_from(&path), config);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[emulator\nexecutable = 3").unwrap();
        assert_eq!(load_from(&path), Config::default());
        assert_eq!(load_from(&dir.path().join("missing.toml")), Config::default());
    }
}
