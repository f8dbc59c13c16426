//! RomVault Core - core resolution, ROM discovery and save synchronization
//!
//! This crate holds everything the launcher needs that does not spawn
//! processes or talk HTTP.
//!
//! # Architecture
//!
//! - [`cores`] - Static extension and platform tables mapping ROMs to libretro cores
//! - [`library`] - On-disk layout, path sanitization, ROM location and archive introspection
//! - [`sync`] - Timestamp-based reconciliation of saves and states
//! - [`CatalogApi`] - Seam to the remote catalog service

pub mod app;
pub mod catalog;
pub mod cores;
pub mod error;
pub mod library;
pub mod sync;
#[cfg(test)]
pub mod test_utils;

pub use app::Config;
pub use catalog::{CatalogApi, DownloadedAsset};
pub use error::{LaunchError, NetworkError, PathTraversalError, SyncError};
pub use library::{AssetStore, LibraryLayout, LocalAsset, locate_rom, validate_asset_path};
pub use sync::{Reconciler, SyncReport};
