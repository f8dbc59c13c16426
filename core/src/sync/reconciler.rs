//! Bidirectional save/state reconciliation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use romvault_shared::{AssetKind, Game, ServerAsset};

use super::names::logical_name;
use crate::catalog::CatalogApi;
use crate::cores::core_for_rom;
use crate::error::SyncError;
use crate::library::{AssetStore, LibraryLayout, LocalAsset, set_modified};

/// Timestamps closer than this are considered the same version.
pub const SYNC_TOLERANCE: TimeDelta = TimeDelta::seconds(5);

/// What to do with one logical asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Upload,
    Download,
    InSync,
}

/// Decide the transfer direction for an asset present on both sides.
pub fn decide(local: DateTime<Utc>, server: DateTime<Utc>) -> SyncAction {
    let diff = local - server;
    if diff.abs() <= SYNC_TOLERANCE {
        SyncAction::InSync
    } else if diff > TimeDelta::zero() {
        SyncAction::Upload
    } else {
        SyncAction::Download
    }
}

/// Outcome of one reconciliation pass, by logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub uploaded: Vec<String>,
    pub downloaded: Vec<String>,
    pub unchanged: Vec<String>,
    /// Names whose transfer failed, with the error message.
    pub failed: Vec<(String, String)>,
    /// Local files left out because a newer file with the same name exists
    /// under another core directory.
    pub shadowed: Vec<PathBuf>,
}

impl SyncReport {
    /// Number of uploads and downloads performed.
    pub fn transfers(&self) -> usize {
        self.uploaded.len() + self.downloaded.len()
    }
}

/// Keep the newest entry per key, returning the entry that lost.
fn insert_newest<T>(
    map: &mut BTreeMap<String, T>,
    key: String,
    item: T,
    time: impl Fn(&T) -> DateTime<Utc>,
) -> Option<T> {
    match map.get(&key) {
        Some(existing) if time(existing) >= time(&item) => Some(item),
        _ => map.insert(key, item),
    }
}

/// Reconciles one game's saves or states with the catalog.
///
/// Passes over different games touch disjoint directories and may run
/// concurrently. Passes over the same game must be serialized by the caller.
pub struct Reconciler<'a> {
    catalog: &'a dyn CatalogApi,
    layout: &'a LibraryLayout,
}

impl<'a> Reconciler<'a> {
    pub fn new(catalog: &'a dyn CatalogApi, layout: &'a LibraryLayout) -> Self {
        Self { catalog, layout }
    }

    pub fn reconcile_saves(&self, game_id: u64) -> Result<SyncReport, SyncError> {
        self.reconcile(game_id, AssetKind::Save)
    }

    pub fn reconcile_states(&self, game_id: u64) -> Result<SyncReport, SyncError> {
        self.reconcile(game_id, AssetKind::State)
    }

    /// Reconcile one kind of asset for a game.
    ///
    /// Fails only when the game or either asset list cannot be fetched.
    /// Individual transfer failures are logged and reported in
    /// [`SyncReport::failed`].
    pub fn reconcile(&self, game_id: u64, kind: AssetKind) -> Result<SyncReport, SyncError> {
        let game = self.catalog.get_game(game_id)?;
        let store = AssetStore::new(self.layout.game_dir(&game)?);
        self.reconcile_store(&game, &store, kind)
    }

    fn reconcile_store(
        &self,
        game: &Game,
        store: &AssetStore,
        kind: AssetKind,
    ) -> Result<SyncReport, SyncError> {
        let mut local: BTreeMap<String, LocalAsset> = BTreeMap::new();
        let mut shadowed = Vec::new();
        for asset in store.list(kind)? {
            if let Some(older) = insert_newest(&mut local, asset.name.clone(), asset, |a| a.modified)
            {
                tracing::debug!(
                    "Skipping {} for game {}: a newer copy of '{}' exists under another core",
                    older.path.display(),
                    game.id,
                    older.name
                );
                shadowed.push(older.path);
            }
        }

        let mut server: BTreeMap<String, ServerAsset> = BTreeMap::new();
        for asset in self.catalog.list_server_assets(game.id, kind)? {
            insert_newest(&mut server, logical_name(&asset.file_name), asset, |a| {
                a.updated_at
            });
        }

        let names: BTreeSet<&String> = local.keys().chain(server.keys()).collect();
        tracing::debug!(
            "Reconciling {} {}s for game {} ({} local, {} server)",
            names.len(),
            kind,
            game.id,
            local.len(),
            server.len()
        );

        let mut report = SyncReport {
            shadowed,
            ..SyncReport::default()
        };
        for name in names {
            let action = match (local.get(name), server.get(name)) {
                (Some(_), None) => SyncAction::Upload,
                (None, Some(_)) => SyncAction::Download,
                (Some(l), Some(s)) => decide(l.modified, s.updated_at),
                (None, None) => continue,
            };

            let result = match action {
                SyncAction::InSync => {
                    report.unchanged.push(name.clone());
                    continue;
                }
                SyncAction::Upload => local
                    .get(name)
                    .map(|asset| self.upload(game, store, asset)),
                SyncAction::Download => server
                    .get(name)
                    .map(|asset| self.download(game, store, kind, name, asset)),
            };

            match result {
                Some(Ok(())) if action == SyncAction::Upload => {
                    report.uploaded.push(name.clone())
                }
                Some(Ok(())) => report.downloaded.push(name.clone()),
                Some(Err(e)) => {
                    tracing::warn!(
                        "Failed to sync {} '{}' for game {}: {}",
                        kind,
                        name,
                        game.id,
                        e
                    );
                    report.failed.push((name.clone(), e.to_string()));
                }
                None => {}
            }
        }

        tracing::info!(
            "Synced {}s for game {}: {} up, {} down, {} unchanged, {} failed",
            kind,
            game.id,
            report.uploaded.len(),
            report.downloaded.len(),
            report.unchanged.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn upload(&self, game: &Game, store: &AssetStore, asset: &LocalAsset) -> Result<(), SyncError> {
        let bytes = store.read(asset)?;
        let created =
            self.catalog
                .upload_asset(game.id, asset.kind, &asset.core, &asset.name, bytes)?;
        // Align with the server's clock so the next pass sees equal times.
        set_modified(&asset.path, created.updated_at)?;
        tracing::debug!("Uploaded {} as {}", asset.path.display(), created.file_name);
        Ok(())
    }

    fn download(
        &self,
        game: &Game,
        store: &AssetStore,
        kind: AssetKind,
        name: &str,
        asset: &ServerAsset,
    ) -> Result<(), SyncError> {
        let core = match asset.emulator.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(core) => core,
            None => default_core(game).ok_or_else(|| {
                std::io::Error::other(format!("no core known for {}", game.full_path))
            })?,
        };

        // Validate before touching the network.
        store.path_for(kind, core, name)?;

        let downloaded = self.catalog.download_asset(&asset.download_path)?;
        let path = store.write(kind, core, name, downloaded.reader)?;
        set_modified(&path, asset.updated_at)?;
        tracing::debug!("Downloaded {} to {}", downloaded.file_name, path.display());
        Ok(())
    }
}

/// Core a game's ROM would launch with, for server assets without a label.
fn default_core(game: &Game) -> Option<&'static str> {
    let ext = Path::new(&game.full_path).extension()?.to_str()?;
    core_for_rom(ext, Some(game.platform.as_str()))
}
