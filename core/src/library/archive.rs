//! Zip archive introspection
//!
//! Archives are inspected by entry name only. Member data is read solely when
//! a single member has to be materialized as a standalone file.

use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipResult;

use crate::cores::{cores_for_extension, cores_for_platform_label, rom_match_rank};

fn open_archive(path: &Path) -> ZipResult<ZipArchive<File>> {
    ZipArchive::new(File::open(path)?)
}

/// Extension of an archive member name, if any.
fn member_extension(name: &str) -> Option<&str> {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    if file_name.starts_with('.') {
        return None;
    }
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Union of the cores implied by every recognized member of an archive.
///
/// Does not assume a single ROM inside: multi-disc sets and archives holding
/// several regions all contribute. Directory entries are ignored.
pub fn cores_in_archive(path: &Path) -> ZipResult<BTreeSet<&'static str>> {
    let archive = open_archive(path)?;

    let mut cores = BTreeSet::new();
    for name in archive.file_names() {
        if name.ends_with('/') {
            continue;
        }
        if let Some(ext) = member_extension(name) {
            cores.extend(cores_for_extension(ext).iter().copied());
        }
    }
    Ok(cores)
}

/// Name of the member to launch from an archive.
///
/// Members whose cores the platform also lists come first, then any other
/// recognized ROM, then cartridge images. Ties keep archive order.
pub fn first_recognized_member(
    path: &Path,
    platform_hint: Option<&str>,
) -> ZipResult<Option<String>> {
    let mut archive = open_archive(path)?;
    let platform_cores = platform_hint.map(cores_for_platform_label).unwrap_or_default();

    let mut best: Option<(u8, String)> = None;
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name();
        let Some(rank) = member_extension(name).and_then(|ext| rom_match_rank(ext, platform_cores))
        else {
            continue;
        };
        if best.as_ref().is_none_or(|(best_rank, _)| rank < *best_rank) {
            best = Some((rank, name.to_string()));
        }
        if rank == 0 {
            break;
        }
    }
    Ok(best.map(|(_, name)| name))
}

/// Copy one archive member to `dest`.
pub fn extract_member(path: &Path, member: &str, dest: &Path) -> ZipResult<()> {
    let mut archive = open_archive(path)?;
    let mut entry = archive.by_name(member)?;
    let mut out = File::create(dest)?;
    io::copy(&mut entry, &mut out)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;

    /// Write a zip containing the given `(name, contents)` members.
    pub fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, contents) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
}
