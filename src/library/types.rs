//! Result types for two-phase library operations

use crate::store::SnapshotRecord;

/// What happened to the remote half of an operation
///
/// The local half has always been committed by the time this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// The server accepted the change
    Applied,
    /// Nothing to send: the record is unknown to the server, or no one is signed in
    Skipped,
    /// The session is gone; log in and sync to push the change
    SessionExpired,
    Failed(String),
}

impl RemoteStatus {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Result of saving a page
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The record as stored after both phases
    pub record: SnapshotRecord,
    pub asset_count: usize,
    pub remote: RemoteStatus,
}
