//! Maintenance of the permanent `retroarch.cfg`.
//!
//! Normal launches never write this file. The only edit is clearing a stale
//! achievement token, which otherwise makes RetroArch ignore the credentials
//! passed in the throwaway config.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

const TOKEN_KEY: &str = "cheevos_token";

/// Key of a `key = "value"` line, if the line is one.
fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    trimmed.split_once('=').map(|(key, _)| key.trim())
}

/// Blank `cheevos_token` in a RetroArch config, leaving every other line as is.
///
/// Returns whether the file changed. A missing file is not an error.
pub fn clear_achievement_token(config_path: &Path) -> io::Result<bool> {
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let mut changed = false;
    let mut out = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        if line_key(line) == Some(TOKEN_KEY) {
            let cleared = format!("{TOKEN_KEY} = \"\"");
            let body = line.trim_end_matches(['\r', '\n']);
            if body.trim() != cleared {
                changed = true;
            }
            out.push_str(&cleared);
            out.push_str(&line[body.len()..]);
        } else {
            out.push_str(line);
        }
    }

    if !changed {
        return Ok(false);
    }

    let dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(out.as_bytes())?;
    file.persist(config_path).map_err(|e| e.error)?;
    tracing::info!("Cleared achievement token in {}", config_path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clears_only_the_token() {
        let dir = TempDir::new().unwrap();
        let cfg = dir.path().join("retroarch.cfg");
        fs::write(
            &cfg,
            "video_fullscreen = \"true\"\r\ncheevos_token = \"abc123\"\r\n# cheevos_token = \"old\"\r\ncheevos_username = \"player\"\r\n",
        )
        .unwrap();

        assert!(clear_achievement_token(&cfg).unwrap());
        assert_eq!(
            fs::read_to_string(&cfg).unwrap(),
            "video_fullscreen = \"true\"\r\ncheevos_token = \"\"\r\n# cheevos_token = \"old\"\r\ncheevos_username = \"player\"\r\n"
        );
    }

    #[test]
    fn test_already_clear_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let cfg = dir.path().join("retroarch.cfg");
        fs::write(&cfg, "cheevos_token = \"\"\nmenu_driver = \"ozone\"").unwrap();

        assert!(!clear_achievement_token(&cfg).unwrap());
    }

    #[test]
    fn test_last_line_without_newline() {
        let dir = TempDir::new().unwrap();
        let cfg = dir.path().join("retroarch.cfg");
        fs::write(&cfg, "menu_driver = \"ozone\"\ncheevos_token=\"xyz\"").unwrap();

        assert!(clear_achievement_token(&cfg).unwrap());
        assert_eq!(
            fs::read_to_string(&cfg).unwrap(),
            "menu_driver = \"ozone\"\ncheevos_token = \"\""
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(!clear_achievement_token(&dir.path().join("retroarch.cfg")).unwrap());
    }
}
