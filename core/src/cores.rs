//! Core and platform resolution
//!
//! Static lookup tables mapping ROM file extensions and platform identifiers
//! to ordered lists of libretro core names. The first entry of each list is
//! the default core.
//!
//! Lookups never guess: an unknown extension or platform yields an empty
//! list and callers must surface that as "no mapping".
//!
//! # Ambiguous extensions
//!
//! The disc image family (`cue`, `iso`, `bin`, `chd`) is shared by
//! PlayStation, Saturn and Sega CD. The extension table maps it to the
//! PlayStation core set. Callers that know the platform should use
//! [`core_for_rom`], which prefers a core the platform also lists.

/// Extension used for archive containers the launcher can look inside.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Extension of cartridges stored as PNG images.
pub const CARTRIDGE_IMAGE_EXTENSION: &str = "png";

/// Core that runs cartridges stored as PNG images.
pub const CARTRIDGE_IMAGE_CORE: &str = "fake08";

/// Extension a cartridge image must carry on disk for [`CARTRIDGE_IMAGE_CORE`].
pub const CARTRIDGE_IMAGE_TARGET_EXT: &str = "p8";

const SNES: &[&str] = &["snes9x", "bsnes", "mesen-s"];
const NES: &[&str] = &["fceumm", "nestopia", "mesen"];
const GB: &[&str] = &["gambatte", "sameboy", "mgba"];
const GBA: &[&str] = &["mgba", "vbam", "gpsp"];
const N64: &[&str] = &["mupen64plus_next", "parallel_n64"];
const NDS: &[&str] = &["melonds", "desmume"];
const MEGADRIVE: &[&str] = &["genesis_plus_gx", "picodrive"];
const MASTER_SYSTEM: &[&str] = &["genesis_plus_gx", "gearsystem", "picodrive"];
const SEGA_32X: &[&str] = &["picodrive"];
const SEGA_CD: &[&str] = &["genesis_plus_gx", "picodrive"];
const SATURN: &[&str] = &["mednafen_saturn", "yabause"];
const DREAMCAST: &[&str] = &["flycast"];
const PSX: &[&str] = &["swanstation", "pcsx_rearmed", "mednafen_psx"];
const PSP: &[&str] = &["ppsspp"];
const PCE: &[&str] = &["mednafen_pce_fast", "mednafen_pce"];
const ATARI_2600: &[&str] = &["stella"];
const ATARI_7800: &[&str] = &["prosystem"];
const LYNX: &[&str] = &["handy", "mednafen_lynx"];
const WONDERSWAN: &[&str] = &["mednafen_wswan"];
const NEOGEO_POCKET: &[&str] = &["mednafen_ngp"];
const VIRTUAL_BOY: &[&str] = &["mednafen_vb"];
const PICO8: &[&str] = &["fake08", "retro8"];

/// Normalize an extension for lookup: strip a leading dot, lowercase.
fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Ordered candidate cores for a file extension.
///
/// Case-insensitive; a leading dot is optional. Returns an empty slice for
/// unknown extensions (including the archive extension, which has no core
/// of its own).
pub fn cores_for_extension(ext: &str) -> &'static [&'static str] {
    match normalize_extension(ext).as_str() {
        "sfc" | "smc" | "fig" | "swc" => SNES,
        "nes" | "fds" | "unf" | "unif" => NES,
        "gb" | "gbc" | "sgb" => GB,
        "gba" => GBA,
        "n64" | "z64" | "v64" => N64,
        "nds" => NDS,
        "md" | "gen" | "smd" => MEGADRIVE,
        "sms" | "gg" => MASTER_SYSTEM,
        "32x" => SEGA_32X,
        "cdi" | "gdi" => DREAMCAST,
        "cue" | "iso" | "bin" | "chd" | "pbp" => PSX,
        "cso" => PSP,
        "pce" => PCE,
        "a26" => ATARI_2600,
        "a78" => ATARI_7800,
        "lnx" => LYNX,
        "ws" | "wsc" => WONDERSWAN,
        "ngp" | "ngc" => NEOGEO_POCKET,
        "vb" => VIRTUAL_BOY,
        "p8" | "png" => PICO8,
        _ => &[],
    }
}

/// Ordered candidate cores for a canonical platform identifier.
///
/// Case-insensitive. Free-text labels should go through
/// [`platform_id_from_label`] first.
pub fn cores_for_platform(platform: &str) -> &'static [&'static str] {
    match platform.trim().to_ascii_lowercase().as_str() {
        "snes" => SNES,
        "nes" | "famicom" => NES,
        "gb" | "gbc" => GB,
        "gba" => GBA,
        "n64" => N64,
        "nds" => NDS,
        "genesis" => MEGADRIVE,
        "sms" | "gamegear" => MASTER_SYSTEM,
        "sega32x" => SEGA_32X,
        "segacd" => SEGA_CD,
        "saturn" => SATURN,
        "dc" => DREAMCAST,
        "psx" => PSX,
        "psp" => PSP,
        "pce" => PCE,
        "atari2600" => ATARI_2600,
        "atari7800" => ATARI_7800,
        "lynx" => LYNX,
        "wonderswan" => WONDERSWAN,
        "ngp" => NEOGEO_POCKET,
        "virtualboy" => VIRTUAL_BOY,
        "pico8" => PICO8,
        _ => &[],
    }
}

/// Aliases recognised by [`platform_id_from_label`], compared after
/// normalization (lowercase, alphanumerics only).
const PLATFORM_ALIASES: &[(&str, &str)] = &[
    ("supernintendoentertainmentsystem", "snes"),
    ("supernintendo", "snes"),
    ("superfamicom", "snes"),
    ("supernes", "snes"),
    ("snes", "snes"),
    ("sfc", "snes"),
    ("nintendoentertainmentsystem", "nes"),
    ("famicomdisksystem", "nes"),
    ("famicom", "nes"),
    ("nes", "nes"),
    ("gameboycolor", "gbc"),
    ("gbc", "gbc"),
    ("gameboyadvance", "gba"),
    ("gba", "gba"),
    ("gameboy", "gb"),
    ("gb", "gb"),
    ("nintendo64", "n64"),
    ("n64", "n64"),
    ("nintendods", "nds"),
    ("nds", "nds"),
    ("megadrive", "genesis"),
    ("genesis", "genesis"),
    ("mastersystem", "sms"),
    ("sms", "sms"),
    ("gamegear", "gamegear"),
    ("gg", "gamegear"),
    ("sega32x", "sega32x"),
    ("32x", "sega32x"),
    ("segacd", "segacd"),
    ("megacd", "segacd"),
    ("saturn", "saturn"),
    ("dreamcast", "dc"),
    ("dc", "dc"),
    ("playstationportable", "psp"),
    ("psp", "psp"),
    ("playstation", "psx"),
    ("psx", "psx"),
    ("ps1", "psx"),
    ("pcengine", "pce"),
    ("turbografx16", "pce"),
    ("pce", "pce"),
    ("atari2600", "atari2600"),
    ("atari7800", "atari7800"),
    ("lynx", "lynx"),
    ("wonderswancolor", "wonderswan"),
    ("wonderswan", "wonderswan"),
    ("neogeopocketcolor", "ngp"),
    ("neogeopocket", "ngp"),
    ("ngp", "ngp"),
    ("virtualboy", "virtualboy"),
    ("pico8", "pico8"),
];

/// Shortest alias allowed to match as a substring. Shorter aliases ("gb",
/// "dc") only match a whole label.
const MIN_SUBSTRING_ALIAS_LEN: usize = 4;

/// Normalize a free-text platform label to a canonical identifier.
///
/// Tries an exact alias match first, then the longest alias contained in the
/// label. Returns `None` when nothing matches.
///
/// ```
/// use romvault_core::cores::platform_id_from_label;
///
/// assert_eq!(platform_id_from_label("Game Boy Color"), Some("gbc"));
/// assert_eq!(platform_id_from_label("GBC"), Some("gbc"));
/// assert_eq!(platform_id_from_label("Sega Mega Drive / Genesis"), Some("genesis"));
/// assert_eq!(platform_id_from_label("Commodore 64"), None);
/// ```
pub fn platform_id_from_label(label: &str) -> Option<&'static str> {
    let normalized: String = label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if normalized.is_empty() {
        return None;
    }

    if let Some((_, id)) = PLATFORM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
    {
        return Some(*id);
    }

    PLATFORM_ALIASES
        .iter()
        .filter(|(alias, _)| alias.len() >= MIN_SUBSTRING_ALIAS_LEN && normalized.contains(alias))
        .max_by_key(|(alias, _)| alias.len())
        .map(|(_, id)| *id)
}

/// Default core for an extension, if any.
pub fn default_core_for_extension(ext: &str) -> Option<&'static str> {
    cores_for_extension(ext).first().copied()
}

/// Whether the extension has at least one mapped core.
pub fn is_known_extension(ext: &str) -> bool {
    !cores_for_extension(ext).is_empty()
}

/// Whether the extension names an archive container.
pub fn is_archive_extension(ext: &str) -> bool {
    normalize_extension(ext) == ARCHIVE_EXTENSION
}

/// Whether the extension is the cartridge-image extension.
pub fn is_cartridge_image_extension(ext: &str) -> bool {
    normalize_extension(ext) == CARTRIDGE_IMAGE_EXTENSION
}

/// Candidate cores for a platform slug or free-text label.
pub fn cores_for_platform_label(label: &str) -> &'static [&'static str] {
    cores_for_platform(platform_id_from_label(label).unwrap_or(label))
}

/// How well a file with `ext` fits as the ROM of a platform, lower is better.
///
/// `0` when one of its cores is in `platform_cores`, `1` for any other known
/// ROM extension, `2` for a cartridge image the platform does not run. A
/// `.png` next to a ROM is usually box art. `None` when no core maps to `ext`.
pub fn rom_match_rank(ext: &str, platform_cores: &[&str]) -> Option<u8> {
    let candidates = cores_for_extension(ext);
    if candidates.is_empty() {
        return None;
    }
    if candidates.iter().any(|core| platform_cores.contains(core)) {
        Some(0)
    } else if is_cartridge_image_extension(ext) {
        Some(2)
    } else {
        Some(1)
    }
}

/// Extensions shared by several disc-based platforms.
const SHARED_DISC_EXTENSIONS: &[&str] = &["cue", "iso", "bin", "chd"];

/// Platforms whose games ship as [`SHARED_DISC_EXTENSIONS`] images.
const DISC_PLATFORMS: &[&str] = &["psx", "saturn", "segacd"];

/// Pick a core for a ROM extension, using the platform to disambiguate.
///
/// With a platform hint whose candidates overlap the extension's, the first
/// extension candidate the platform also lists wins. For the shared disc
/// family a known disc platform selects its own default core. Otherwise the
/// extension default is used. The hint alone never produces a core for an
/// unknown extension.
pub fn core_for_rom(ext: &str, platform_hint: Option<&str>) -> Option<&'static str> {
    let candidates = cores_for_extension(ext);
    if candidates.is_empty() {
        return None;
    }

    if let Some(hint) = platform_hint {
        let platform = platform_id_from_label(hint).unwrap_or(hint);
        let platform_cores = cores_for_platform_label(hint);
        if let Some(core) = candidates.iter().find(|c| platform_cores.contains(*c)) {
            return Some(*core);
        }

        let ext = normalize_extension(ext);
        if SHARED_DISC_EXTENSIONS.contains(&ext.as_str())
            && DISC_PLATFORMS.contains(&platform.to_ascii_lowercase().as_str())
            && let Some(core) = platform_cores.first()
        {
            return Some(*core);
        }
    }

    candidates.first().copied()
}
