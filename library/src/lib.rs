//! RomVault Library
//!
//! Launches ROMs from the local library through RetroArch. Games run as
//! separate emulator processes, so a crashing core never takes the library
//! down with it.

pub mod events;
pub mod launch;

pub use events::{ChannelSink, EventSink, LauncherEvent, LogSink};
pub use launch::{Credentials, LaunchHandle, LaunchRequest, Launcher};
