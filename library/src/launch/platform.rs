//! Host OS and CPU architecture as RetroArch sees them.
//!
//! Core libraries are native code, so the architecture that matters is the
//! one the emulator binary was built for. An x86_64 RetroArch running under a
//! translation layer on an arm64 Mac can only load x86_64 cores.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Operating systems with a RetroArch build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Shared library extension for cores.
    pub const fn library_extension(self) -> &'static str {
        match self {
            Self::Windows => "dll",
            Self::MacOs => "dylib",
            Self::Linux => "so",
        }
    }

    /// Path segment used by the buildbot for this OS.
    pub const fn buildbot_dir(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "apple/osx",
            Self::Linux => "linux",
        }
    }
}

/// CPU architectures cores are published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    X86,
    Arm64,
    Armv7,
}

impl Arch {
    /// Architecture of this process.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => Self::Arm64,
            "x86" => Self::X86,
            "arm" => Self::Armv7,
            _ => Self::X86_64,
        }
    }

    /// Path segment used by the buildbot for this architecture on `os`.
    pub const fn buildbot_dir(self, os: HostOs) -> &'static str {
        match (self, os) {
            (Self::X86_64, _) => "x86_64",
            (Self::X86, _) => "x86",
            (Self::Arm64, HostOs::Linux) => "aarch64",
            (Self::Arm64, _) => "arm64",
            (Self::Armv7, _) => "armv7-neon-hf",
        }
    }
}

/// File name of a core library, e.g. `snes9x_libretro.so`.
pub fn library_file_name(core: &str, os: HostOs) -> String {
    format!("{}_libretro.{}", core, os.library_extension())
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Where RetroArch looks for cores, given the emulator root and home directory.
pub fn cores_dir_for(os: HostOs, emulator_root: &Path, home: &Path) -> PathBuf {
    match os {
        HostOs::Windows => emulator_root.join("cores"),
        HostOs::MacOs => home
            .join("Library")
            .join("Application Support")
            .join("RetroArch")
            .join("cores"),
        HostOs::Linux => home.join(".config").join("retroarch").join("cores"),
    }
}

/// Core directory on this host.
pub fn cores_dir(emulator_root: &Path) -> Option<PathBuf> {
    let home = home_dir()?;
    Some(cores_dir_for(HostOs::current(), emulator_root, &home))
}

/// Location of the user's permanent `retroarch.cfg`.
pub fn permanent_config_path_for(os: HostOs, emulator_root: &Path, home: &Path) -> PathBuf {
    match os {
        HostOs::Windows => emulator_root.join("retroarch.cfg"),
        HostOs::MacOs => home
            .join("Library")
            .join("Application Support")
            .join("RetroArch")
            .join("config")
            .join("retroarch.cfg"),
        HostOs::Linux => home.join(".config").join("retroarch").join("retroarch.cfg"),
    }
}

/// Permanent `retroarch.cfg` on this host.
pub fn permanent_config_path(emulator_root: &Path) -> Option<PathBuf> {
    let home = home_dir()?;
    Some(permanent_config_path_for(
        HostOs::current(),
        emulator_root,
        &home,
    ))
}

const HEADER_LEN: usize = 4096;

fn read_header(path: &Path) -> Option<Vec<u8>> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    File::open(path)
        .ok()?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .ok()?;
    Some(header)
}

fn u16_at(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u16> {
    let raw: [u8; 2] = bytes.get(offset..offset + 2)?.try_into().ok()?;
    Some(if little_endian {
        u16::from_le_bytes(raw)
    } else {
        u16::from_be_bytes(raw)
    })
}

fn u32_at(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(if little_endian {
        u32::from_le_bytes(raw)
    } else {
        u32::from_be_bytes(raw)
    })
}

fn elf_arch(header: &[u8]) -> Option<Arch> {
    let little_endian = *header.get(5)? == 1;
    match u16_at(header, 18, little_endian)? {
        0x3e => Some(Arch::X86_64),
        0xb7 => Some(Arch::Arm64),
        0x03 => Some(Arch::X86),
        0x28 => Some(Arch::Armv7),
        _ => None,
    }
}

const MACHO_CPU_X86_64: u32 = 0x0100_0007;
const MACHO_CPU_ARM64: u32 = 0x0100_000c;
const MACHO_CPU_X86: u32 = 0x0000_0007;

fn macho_cpu(cpu: u32) -> Option<Arch> {
    match cpu {
        MACHO_CPU_X86_64 => Some(Arch::X86_64),
        MACHO_CPU_ARM64 => Some(Arch::Arm64),
        MACHO_CPU_X86 => Some(Arch::X86),
        _ => None,
    }
}

/// Universal binaries run natively when they contain the host slice.
fn fat_macho_arch(header: &[u8], host: Arch) -> Option<Arch> {
    let count = u32_at(header, 4, false)? as usize;
    let slices: Vec<Arch> = (0..count.min(16))
        .filter_map(|i| u32_at(header, 8 + i * 20, false).and_then(macho_cpu))
        .collect();
    if slices.contains(&host) {
        Some(host)
    } else {
        slices.first().copied()
    }
}

fn pe_arch(header: &[u8]) -> Option<Arch> {
    let pe_offset = u32_at(header, 0x3c, true)? as usize;
    if header.get(pe_offset..pe_offset + 4)? != b"PE\0\0" {
        return None;
    }
    match u16_at(header, pe_offset + 4, true)? {
        0x8664 => Some(Arch::X86_64),
        0xaa64 => Some(Arch::Arm64),
        0x014c => Some(Arch::X86),
        0x01c4 => Some(Arch::Armv7),
        _ => None,
    }
}

/// Architecture an executable image was built for, from its header bytes.
pub fn binary_arch(header: &[u8], host: Arch) -> Option<Arch> {
    match header.get(..4)? {
        [0x7f, b'E', b'L', b'F'] => elf_arch(header),
        [0xcf, 0xfa, 0xed, 0xfe] | [0xce, 0xfa, 0xed, 0xfe] => {
            u32_at(header, 4, true).and_then(macho_cpu)
        }
        [0xca, 0xfe, 0xba, 0xbe] => fat_macho_arch(header, host),
        [b'M', b'Z', ..] => pe_arch(header),
        _ => None,
    }
}

/// Architecture to fetch cores for: the emulator's, falling back to the host's.
pub fn emulator_arch(executable: &Path) -> Arch {
    let host = Arch::host();
    match read_header(executable).and_then(|header| binary_arch(&header, host)) {
        Some(arch) => {
            if arch != host {
                tracing::info!(
                    "Emulator is built for {:?} on a {:?} host; using {:?} cores",
                    arch,
                    host,
                    arch
                );
            }
            arch
        }
        None => {
            tracing::debug!(
                "Could not read architecture of {}, assuming host",
                executable.display()
            );
            host
        }
    }
}
