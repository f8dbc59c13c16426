//! Remote catalog abstraction
//!
//! The reconciler talks to the catalog service only through this trait, so
//! the transport (HTTP client, auth, pagination) stays outside the core and
//! tests can substitute an in-memory catalog.

use std::io::Read;

use romvault_shared::{AssetKind, Game, ServerAsset};

use crate::error::NetworkError;

/// A downloaded asset body together with the server's filename for it.
pub struct DownloadedAsset {
    pub reader: Box<dyn Read + Send>,
    pub file_name: String,
}

impl std::fmt::Debug for DownloadedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadedAsset")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Narrow view of the catalog API used by the launcher core.
///
/// Calls are blocking. Implementations own whatever runtime they need.
pub trait CatalogApi: Send + Sync {
    /// Fetch a game record.
    fn get_game(&self, game_id: u64) -> Result<Game, NetworkError>;

    /// List the saves or states stored on the server for a game.
    fn list_server_assets(
        &self,
        game_id: u64,
        kind: AssetKind,
    ) -> Result<Vec<ServerAsset>, NetworkError>;

    /// Upload an asset and return the record the server created.
    fn upload_asset(
        &self,
        game_id: u64,
        kind: AssetKind,
        core: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ServerAsset, NetworkError>;

    /// Download an asset by its remote path handle.
    fn download_asset(&self, download_path: &str) -> Result<DownloadedAsset, NetworkError>;
}
