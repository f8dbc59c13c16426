//! Launcher lifecycle signals for the UI.
//!
//! Events are fire-and-forget. A sink must never block the launcher; the
//! channel sink drops events once its receiver is gone.

use std::sync::Mutex;
use std::sync::mpsc::Sender;

/// A signal emitted by the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherEvent {
    /// Emitted right before the emulator process is spawned.
    GameStarted { game_id: Option<u64> },
    /// Emitted once per launch, after the process ended and its temp files were removed.
    GameExited { game_id: Option<u64> },
    /// Core download progress, 0-100.
    DownloadProgress { game_id: Option<u64>, percentage: u8 },
}

/// Receives launcher events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LauncherEvent);
}

/// Forwards events over a std channel.
pub struct ChannelSink {
    tx: Mutex<Sender<LauncherEvent>>,
}

impl ChannelSink {
    pub fn new(tx: Sender<LauncherEvent>) -> Self {
        Self { tx: Mutex::new(tx) }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: LauncherEvent) {
        if let Ok(tx) = self.tx.lock() {
            // Receiver gone means nobody is listening anymore
            let _ = tx.send(event);
        }
    }
}

/// Writes events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: LauncherEvent) {
        match event {
            LauncherEvent::GameStarted { game_id } => {
                tracing::info!("Game started (id: {:?})", game_id)
            }
            LauncherEvent::GameExited { game_id } => {
                tracing::info!("Game exited (id: {:?})", game_id)
            }
            LauncherEvent::DownloadProgress {
                game_id,
                percentage,
            } => tracing::debug!("Download progress (id: {:?}): {}%", game_id, percentage),
        }
    }
}
