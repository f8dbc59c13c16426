//! Emulator executable resolution.

use std::path::{Component, Path, PathBuf};

use romvault_core::LaunchError;

/// Binary names looked for inside an install directory, in order.
const EXECUTABLE_NAMES: &[&str] = &["retroarch", "retroarch.exe", "RetroArch.app"];

/// Binary inside a macOS application bundle.
fn bundle_binary(bundle: &Path) -> PathBuf {
    bundle.join("Contents").join("MacOS").join("RetroArch")
}

fn is_app_bundle(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("app"))
}

/// A bare program name such as `retroarch`, to be looked up on `PATH`.
fn is_bare_name(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn bundle_or_file(path: &Path) -> Option<PathBuf> {
    if is_app_bundle(path) && path.is_dir() {
        let binary = bundle_binary(path);
        return binary.is_file().then_some(binary);
    }
    path.is_file().then(|| path.to_path_buf())
}

/// Resolve the configured emulator path to the binary to spawn.
///
/// Accepts the binary itself, an install directory containing it, a
/// `RetroArch.app` bundle, or a bare program name found on `PATH`.
pub fn resolve_executable(path: &Path) -> Result<PathBuf, LaunchError> {
    if path.as_os_str().is_empty() {
        return Err(LaunchError::Configuration(
            "emulator executable not configured".to_string(),
        ));
    }

    if path.is_dir() && !is_app_bundle(path) {
        return EXECUTABLE_NAMES
            .iter()
            .find_map(|name| bundle_or_file(&path.join(name)))
            .ok_or_else(|| {
                LaunchError::Launch(format!("no RetroArch executable in {}", path.display()))
            });
    }

    if let Some(found) = bundle_or_file(path) {
        return Ok(found);
    }

    if is_bare_name(path) && !path.exists() {
        return which::which(path).map_err(|e| {
            LaunchError::Launch(format!("{} not found on PATH: {}", path.display(), e))
        });
    }

    Err(LaunchError::Launch(format!(
        "emulator executable not found: {}",
        path.display()
    )))
}

/// Install root of a resolved executable. The emulator runs from here.
///
/// For a binary inside `RetroArch.app/Contents/MacOS`, this is the directory
/// holding the bundle.
pub fn emulator_root(executable: &Path) -> PathBuf {
    let parent = executable.parent().unwrap_or_else(|| Path::new("."));
    let bundle = parent
        .ancestors()
        .take(3)
        .find(|dir| is_app_bundle(dir));
    match bundle.and_then(Path::parent) {
        Some(root) => root.to_path_buf(),
        None if parent.as_os_str().is_empty() => PathBuf::from("."),
        None => parent.to_path_buf(),
    }
}
