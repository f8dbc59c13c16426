//! Save and state synchronization with the catalog server.

mod names;
mod reconciler;

pub use names::logical_name;
pub use reconciler::{Reconciler, SYNC_TOLERANCE, SyncAction, SyncReport, decide};
