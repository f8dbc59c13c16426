//! Error types shared by launching and synchronization.

use thiserror::Error;

/// An asset path was rejected by the sanitizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsafe asset path: core {core:?}, file {filename:?}")]
pub struct PathTraversalError {
    pub core: String,
    pub filename: String,
}

/// A call to the remote catalog failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("network error: {0}")]
pub struct NetworkError(pub String);

/// Pre-flight and spawn failures of a launch.
///
/// Everything here is returned to the caller before the emulator runs.
/// Failures after the process has started are only logged.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// Library path or emulator executable not configured
    #[error("configuration error: {0}")]
    Configuration(String),
    /// No playable ROM file located
    #[error("no playable ROM found in {0}")]
    NotFound(String),
    /// Archive has no member with a recognized extension
    #[error("no recognizable ROM inside archive {0}")]
    Archive(String),
    /// No core mapped for the ROM and none supplied
    #[error("no core available for {0}")]
    CoreResolution(String),
    /// Fetching or unpacking a core failed
    #[error("failed to download core {core}: {reason}")]
    CoreDownload { core: String, reason: String },
    /// Executable missing or the process could not be spawned
    #[error("failed to launch emulator: {0}")]
    Launch(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a reconciliation pass as a whole, or of a single asset.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    PathTraversal(#[from] PathTraversalError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
