//! Core downloads from the libretro buildbot.
//!
//! Cores are published as `<os>/<arch>/latest/<core>_libretro.<ext>.zip`,
//! each archive holding the single library file.

use std::io::{self, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Duration;

use romvault_core::LaunchError;
use zip::ZipArchive;

use super::platform::{Arch, HostOs};

/// Nightly builds root.
pub const BUILDBOT_URL: &str = "https://buildbot.libretro.com/nightly";

/// Timeout for core downloads
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Download URL of a core library archive.
pub fn core_download_url(base_url: &str, os: HostOs, arch: Arch, library_file: &str) -> String {
    format!(
        "{}/{}/{}/latest/{}.zip",
        base_url.trim_end_matches('/'),
        os.buildbot_dir(),
        arch.buildbot_dir(os),
        library_file
    )
}

/// Unpack `library_file` from a core archive into `cores_dir`.
///
/// The library is written to a temporary file first and renamed into place,
/// so an interrupted install never leaves a truncated core behind.
pub fn install_core_archive<R: Read + Seek>(
    reader: R,
    cores_dir: &Path,
    library_file: &str,
) -> Result<PathBuf, String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| format!("invalid archive: {}", e))?;

    let mut found = None;
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| format!("invalid archive: {}", e))?;
        if !entry.is_dir() && entry.name().rsplit('/').next() == Some(library_file) {
            found = Some(i);
            break;
        }
    }
    let index = found.ok_or_else(|| format!("archive does not contain {}", library_file))?;

    std::fs::create_dir_all(cores_dir)
        .map_err(|e| format!("failed to create {}: {}", cores_dir.display(), e))?;

    let mut entry = archive
        .by_index(index)
        .map_err(|e| format!("failed to read {}: {}", library_file, e))?;
    let mut temp = tempfile::NamedTempFile::new_in(cores_dir).map_err(|e| e.to_string())?;
    io::copy(&mut entry, &mut temp).map_err(|e| format!("failed to unpack: {}", e))?;

    let dest = cores_dir.join(library_file);
    temp.persist(&dest)
        .map_err(|e| format!("failed to install {}: {}", dest.display(), e.error))?;
    Ok(dest)
}

/// Download and install a core library.
///
/// `on_progress` receives whole percentages as they change. Servers that
/// don't report a length only get a final 100.
pub fn download_core(
    core: &str,
    url: &str,
    cores_dir: &Path,
    library_file: &str,
    on_progress: &mut dyn FnMut(u8),
) -> Result<PathBuf, LaunchError> {
    let failed = |reason: String| LaunchError::CoreDownload {
        core: core.to_string(),
        reason,
    };

    tracing::info!("Downloading core {} from {}", core, url);

    // Create a runtime for this single async operation
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| failed(format!("failed to create runtime: {}", e)))?;

    let bytes = rt
        .block_on(async { fetch(url, on_progress).await })
        .map_err(failed)?;

    let path = install_core_archive(Cursor::new(bytes), cores_dir, library_file).map_err(failed)?;
    tracing::info!("Installed core {} at {}", core, path.display());
    Ok(path)
}

async fn fetch(url: &str, on_progress: &mut dyn FnMut(u8)) -> Result<Vec<u8>, String> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| format!("failed to create HTTP client: {}", e))?;

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("network error: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    let total = response.content_length().filter(|&len| len > 0);
    let mut bytes = Vec::with_capacity(total.unwrap_or(0).min(64 << 20) as usize);
    let mut last_reported = None;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| format!("download interrupted: {}", e))?
    {
        bytes.extend_from_slice(&chunk);
        if let Some(total) = total {
            let percentage = (bytes.len() as u64 * 100 / total).min(100) as u8;
            if last_reported != Some(percentage) {
                on_progress(percentage);
                last_reported = Some(percentage);
            }
        }
    }

    if last_reported != Some(100) {
        on_progress(100);
    }
    Ok(bytes)
}
