//! Save/state path sanitization
//!
//! Every filesystem access to a save or state file goes through
//! [`validate_asset_path`]. Core names and filenames arrive from the server or
//! from user input and may carry directory components, drive prefixes or
//! traversal segments; only their base names are ever used.

use crate::error::PathTraversalError;

/// Reduce a raw path string to the base name of its lexically cleaned form.
///
/// Both `/` and `\` separate components. Empty and `.` components are dropped,
/// `..` consumes the previous component, and `X:` drive prefixes are stripped.
/// Returns `"."` when nothing is left and `".."` when the path climbs above
/// its start without naming anything.
fn clean_base_name(raw: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();

    for segment in raw.split(['/', '\\']) {
        let segment = strip_drive_prefix(segment);
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                Some(&last) if last != ".." => {
                    stack.pop();
                }
                _ => stack.push(".."),
            },
            other => stack.push(other),
        }
    }

    stack.last().map_or_else(|| ".".to_string(), |s| s.to_string())
}

fn strip_drive_prefix(mut segment: &str) -> &str {
    while let [letter, b':', ..] = segment.as_bytes()
        && letter.is_ascii_alphabetic()
    {
        segment = &segment[2..];
    }
    segment
}

fn is_rejected(name: &str) -> bool {
    name.is_empty() || name == "." || name == ".."
}

/// Validate and normalize a `(core, filename)` pair.
///
/// Returns the base names of both inputs. Fails when either reduces to an
/// empty string, `.` or `..`.
///
/// ```
/// use romvault_core::library::validate_asset_path;
///
/// assert_eq!(
///     validate_asset_path("../../etc", "passwd").unwrap(),
///     ("etc".to_string(), "passwd".to_string())
/// );
/// assert!(validate_asset_path("..", "x").is_err());
/// ```
pub fn validate_asset_path(
    core: &str,
    filename: &str,
) -> Result<(String, String), PathTraversalError> {
    let clean_core = clean_base_name(core);
    let clean_filename = clean_base_name(filename);

    if is_rejected(&clean_core) || is_rejected(&clean_filename) {
        return Err(PathTraversalError {
            core: core.to_string(),
            filename: filename.to_string(),
        });
    }

    Ok((clean_core, clean_filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::{Component, Path};

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(
            validate_asset_path("snes9x", "Chrono Trigger.srm").unwrap(),
            ("snes9x".to_string(), "Chrono Trigger.srm".to_string())
        );
    }

    #[test]
    fn test_traversal_is_reduced_to_base_name() {
        assert_eq!(
            validate_asset_path("../../etc", "passwd").unwrap(),
            ("etc".to_string(), "passwd".to_string())
        );
        assert_eq!(
            validate_asset_path("snes9x", "../../../home/user/.bashrc").unwrap(),
            ("snes9x".to_string(), ".bashrc".to_string())
        );
    }

    #[test]
    fn test_windows_paths_are_reduced() {
        assert_eq!(
            validate_asset_path("C:\\cores\\mgba", "D:save.srm").unwrap(),
            ("mgba".to_string(), "save.srm".to_string())
        );
    }

    #[test]
    fn test_absolute_paths_are_reduced() {
        assert_eq!(
            validate_asset_path("/usr/lib/gambatte", "/tmp/a.srm").unwrap(),
            ("gambatte".to_string(), "a.srm".to_string())
        );
    }

    #[test]
    fn test_degenerate_inputs_are_rejected() {
        for bad in ["", ".", "..", "/", "a/..", "x/../..", "\\", "C:"] {
            assert!(validate_asset_path(bad, "ok.srm").is_err(), "core {bad:?}");
            assert!(validate_asset_path("ok", bad).is_err(), "filename {bad:?}");
        }
    }

    #[test]
    fn test_error_reports_raw_inputs() {
        let err = validate_asset_path("..", "x").unwrap_err();
        assert_eq!(err.core, "..");
        assert_eq!(err.filename, "x");
    }

    fn stays_inside(base: &Path, core: &str, filename: &str) -> bool {
        let joined = base.join(core).join(filename);
        let relative = match joined.strip_prefix(base) {
            Ok(rel) => rel,
            Err(_) => return false,
        };
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            && relative.components().count() == 2
    }

    proptest! {
        #[test]
        fn prop_valid_outputs_stay_under_base(
            core in "[a-zA-Z0-9./\\\\:_ -]{0,24}",
            filename in "[a-zA-Z0-9./\\\\:_ -]{0,24}",
        ) {
            if let Ok((c, f)) = validate_asset_path(&core, &filename) {
                let base = Path::new("/library/snes/1/saves");
                prop_assert!(stays_inside(base, &c, &f), "{c:?} / {f:?}");
            }
        }

        #[test]
        fn prop_degenerate_base_names_are_rejected(
            prefix in "[a-z/]{0,8}",
            tail in prop::sample::select(vec!["", ".", "..", "/", "/.", "/.."]),
        ) {
            let raw = format!("{prefix}{tail}");
            let base = clean_base_name(&raw);
            if is_rejected(&base) {
                prop_assert!(validate_asset_path(&raw, "f.srm").is_err());
                prop_assert!(validate_asset_path("core", &raw).is_err());
            }
        }
    }
}
