//! Helpers for validating identifiers used in filesystem paths.

/// Returns true if `name` is safe to use as a single path component on all platforms.
///
/// Rules:
/// - Must be non-empty and not "." or ".."
/// - Must not contain path separators ('/' or '\\')
/// - Must not contain control characters or NUL
/// - Must not contain Windows-reserved filename characters
/// - Must not end with '.' or space (Windows restriction)
pub fn is_safe_path_component(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }

    if name.ends_with('.') || name.ends_with(' ') {
        return false;
    }

    name.chars().all(|c| {
        !(c == '/'
            || c == '\\'
            || c.is_control()
            || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|'))
    })
}

#[cfg(test)]
mod tests {
    use super::is_safe_path_component;

    #[test]
    fn accepts_platform_slugs() {
        assert!(is_safe_path_component("snes"));
        assert!(is_safe_path_component("game-boy-color"));
        assert!(is_safe_path_component("1234"));
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(!is_safe_path_component(""));
        assert!(!is_safe_path_component("."));
        assert!(!is_safe_path_component(".."));
        assert!(!is_safe_path_component("a/b"));
        assert!(!is_safe_path_component("a\\b"));
        assert!(!is_safe_path_component("C:"));
    }

    #[test]
    fn rejects_windows_trailing_chars() {
        assert!(!is_safe_path_component("name."));
        assert!(!is_safe_path_component("name "));
        assert!(!is_safe_path_component("nul\0"));
    }
}
