//! Event type definitions for library activity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sync::SyncReport;

/// Remote half of a two-phase library operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteOperation {
    Create,
    Archive,
    Unarchive,
    Delete,
}

impl std::fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::Delete => "delete",
        })
    }
}

/// Events emitted while the library saves, mutates and syncs pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LibraryEvent {
    /// A page was captured and recorded locally
    PageSaved {
        local_id: Uuid,
        title: String,
        asset_count: usize,
        timestamp: DateTime<Utc>,
    },
    /// The server accepted the remote half of an operation
    RemoteApplied {
        local_id: Uuid,
        operation: RemoteOperation,
        timestamp: DateTime<Utc>,
    },
    /// The remote half failed; local state is kept as is
    RemoteFailed {
        local_id: Uuid,
        operation: RemoteOperation,
        message: String,
        timestamp: DateTime<Utc>,
    },
    /// No usable session; the user has to log in again
    SessionExpired { timestamp: DateTime<Utc> },
    SyncStarted { timestamp: DateTime<Utc> },
    /// A record was (re)captured during sync
    PageCaptured {
        local_id: Uuid,
        cache_dir: String,
        asset_count: usize,
        timestamp: DateTime<Utc>,
    },
    CaptureFailed {
        local_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },
    SyncCompleted {
        report: SyncReport,
        timestamp: DateTime<Utc>,
    },
}
