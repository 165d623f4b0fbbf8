//! Catalog synchronization with the saved-articles server

pub mod merge;
pub mod reconciler;

pub use merge::{MergeStats, apply_remote, merge_remote_items};
pub use reconciler::{ReconciliationEngine, SyncError, SyncOutcome, SyncReport};
