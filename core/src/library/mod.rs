//! Local game library
//!
//! Directory layout, ROM discovery, archive introspection and the save/state
//! files kept next to each game.

mod archive;
mod assets;
mod layout;
mod locator;
mod sanitize;

pub use archive::{cores_in_archive, extract_member, first_recognized_member};
pub use assets::{AssetStore, LocalAsset, NESTED_CORE_DIRS, set_modified};
pub use layout::{LibraryLayout, asset_base_dir};
pub use locator::locate_rom;
pub use sanitize::validate_asset_path;
