//! Per-launch temporary files.
//!
//! Each launch writes a throwaway RetroArch config that is passed with
//! `--appendconfig`. It redirects saves and states into the game's directory
//! and tells RetroArch not to write its settings back on exit, so the user's
//! permanent configuration is untouched by a single run.

use std::io::Write;
use std::path::{Path, PathBuf};

use romvault_core::LaunchError;
use tempfile::{TempDir, TempPath};

/// Achievement login for one session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Settings written to the throwaway config.
#[derive(Debug, Clone)]
pub struct ThrowawayConfig {
    pub save_dir: PathBuf,
    pub state_dir: PathBuf,
    pub credentials: Option<Credentials>,
}

/// Format one `key = "value"` line.
///
/// RetroArch copies a quoted value verbatim up to the next `"`, so values are
/// written unescaped and must not contain a quote or a line break.
fn config_line(key: &str, value: &str) -> Result<String, LaunchError> {
    if value.contains(['"', '\n', '\r']) {
        return Err(LaunchError::Configuration(format!(
            "{} contains a quote or line break, which RetroArch configs cannot hold",
            key
        )));
    }
    Ok(format!("{} = \"{}\"\n", key, value))
}

impl ThrowawayConfig {
    /// Render the config file contents.
    pub fn render(&self) -> Result<String, LaunchError> {
        let mut entries: Vec<(&str, String)> = vec![
            ("savefile_directory", self.save_dir.display().to_string()),
            ("savestate_directory", self.state_dir.display().to_string()),
            ("sort_savefiles_enable", "true".to_string()),
            ("sort_savestates_enable", "true".to_string()),
        ];
        if let Some(credentials) = &self.credentials {
            entries.push(("cheevos_enable", "true".to_string()));
            entries.push(("cheevos_username", credentials.username.clone()));
            entries.push(("cheevos_password", credentials.password.clone()));
        }
        entries.push(("config_save_on_exit", "false".to_string()));

        let mut out = String::new();
        for (key, value) in entries {
            out.push_str(&config_line(key, &value)?);
        }
        Ok(out)
    }
}

/// Temporary files owned by one running emulator.
///
/// Dropping the session removes them. [`LaunchSession::cleanup`] does the
/// same but logs failures.
#[derive(Debug)]
pub struct LaunchSession {
    config: TempPath,
    temp_rom: Option<TempDir>,
}

impl LaunchSession {
    /// Write the throwaway config into `temp_root` and take ownership of a
    /// materialized ROM.
    pub fn create(
        config: &ThrowawayConfig,
        temp_rom: Option<TempDir>,
        temp_root: &Path,
    ) -> Result<Self, LaunchError> {
        let contents = config.render()?;
        let mut file = tempfile::Builder::new()
            .prefix("romvault-")
            .suffix(".cfg")
            .tempfile_in(temp_root)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        Ok(Self {
            config: file.into_temp_path(),
            temp_rom,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config
    }

    /// Remove the session's temporary files.
    pub fn cleanup(self) {
        let config_path = self.config.to_path_buf();
        if let Err(e) = self.config.close() {
            tracing::warn!(
                "Failed to remove temporary config {}: {}",
                config_path.display(),
                e
            );
        }
        if let Some(dir) = self.temp_rom {
            let dir_path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(
                    "Failed to remove temporary ROM {}: {}",
                    dir_path.display(),
                    e
                );
            }
        }
        tracing::debug!("Cleaned up launch session files");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config(credentials: Option<Credentials>) -> ThrowawayConfig {
        ThrowawayConfig {
            save_dir: PathBuf::from("/games/snes/1/saves"),
            state_dir: PathBuf::from("/games/snes/1/states"),
            credentials,
        }
    }

    #[test]
    fn test_render_without_credentials() {
        let rendered = config(None).render().unwrap();
        assert_eq!(
            rendered,
            "savefile_directory = \"/games/snes/1/saves\"\n\
             savestate_directory = \"/games/snes/1/states\"\n\
             sort_savefiles_enable = \"true\"\n\
             sort_savestates_enable = \"true\"\n\
             config_save_on_exit = \"false\"\n"
        );
    }

    #[test]
    fn test_render_with_credentials() {
        let rendered = config(Some(Credentials {
            username: "player".to_string(),
            password: r"pa\ss'word".to_string(),
        }))
        .render()
        .unwrap();

        assert!(rendered.contains("cheevos_enable = \"true\"\n"));
        assert!(rendered.contains("cheevos_username = \"player\"\n"));
        assert!(rendered.contains(r#"cheevos_password = "pa\ss'word""#));
        assert!(rendered.ends_with("config_save_on_exit = \"false\"\n"));
    }

    #[test]
    fn test_windows_paths_are_written_verbatim() {
        let config = ThrowawayConfig {
            save_dir: PathBuf::from(r"C:\Games\saves"),
            state_dir: PathBuf::from(r"C:\Games\states"),
            credentials: None,
        };
        let rendered = config.render().unwrap();
        assert!(rendered.starts_with(r#"savefile_directory = "C:\Games\saves""#));
        assert!(rendered.contains(r#"savestate_directory = "C:\Games\states""#));
    }

    #[test]
    fn test_unrepresentable_values_are_rejected() {
        for password in ["p\"ss", "line\nbreak", "cr\r"] {
            let result = config(Some(Credentials {
                username: "player".to_string(),
                password: password.to_string(),
            }))
            .render();
            assert!(matches!(result, Err(LaunchError::Configuration(_))));
        }

        let dir = tempfile::tempdir().unwrap();
        let bad = ThrowawayConfig {
            save_dir: PathBuf::from("/games/\"quoted\"/saves"),
            ..config(None)
        };
        assert!(LaunchSession::create(&bad, None, dir.path()).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_debug_hides_password() {
        let credentials = Credentials {
            username: "player".to_string(),
            password: "secret".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("secret"));
    }

    #[test]
    fn test_cleanup_removes_files() {
        let temp_root = tempfile::tempdir().unwrap();
        let rom_dir = tempfile::tempdir_in(temp_root.path()).unwrap();
        let rom = rom_dir.path().join("cart.p8");
        fs::write(&rom, b"cart").unwrap();

        let session =
            LaunchSession::create(&config(None), Some(rom_dir), temp_root.path()).unwrap();
        let config_path = session.config_path().to_path_buf();
        assert!(fs::read_to_string(&config_path)
            .unwrap()
            .contains("config_save_on_exit"));

        assert!(config_path.starts_with(temp_root.path()));

        session.cleanup();
        assert!(!config_path.exists());
        assert!(!rom.exists());
        assert_eq!(fs::read_dir(temp_root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_drop_removes_files() {
        let temp_root = tempfile::tempdir().unwrap();
        let session = LaunchSession::create(&config(None), None, temp_root.path()).unwrap();
        let config_path = session.config_path().to_path_buf();
        drop(session);
        assert!(!config_path.exists());
    }
}
