//! Shared types for the RomVault launcher.
//!
//! These mirror the records owned by the remote catalog service. The launcher
//! treats them as read-only input.

pub mod api;
pub mod ids;

pub use api::{AssetKind, Game, ServerAsset};
pub use ids::is_safe_path_component;
