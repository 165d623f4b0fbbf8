//! Two-way reconciliation of the local catalog with the server.
//!
//! A sync pulls the remote article list, merges it into the catalog and saves
//! it, then captures every active record that has no usable snapshot yet. One
//! sync at a time: a second call while one is running returns
//! [`SyncOutcome::AlreadyRunning`] straight away.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use uuid::Uuid;

use super::merge::merge_remote_items;
use crate::api::{ApiError, ArticlesApi, AuthApi};
use crate::auth::{AuthenticatedCaller, CallError, CredentialStore};
use crate::events::{LibraryEvent, LibraryEventBus};
use crate::snapshot::{CaptureError, CaptureResult, SnapshotEngine};
use crate::store::{Catalog, SnapshotRecord, SnapshotStore, StoreError};

/// Counters for one completed sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Items in the server's list
    pub remote_items: usize,
    /// Records created from remote items
    pub added: usize,
    /// Existing records whose remote fields changed
    pub updated: usize,
    /// Records given a fresh snapshot
    pub captured: usize,
    /// Captures that failed; those records stay uncached
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// Another sync was in progress; nothing was done
    AlreadyRunning,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Session expired, log in again")]
    SessionExpired,

    #[error("Failed to fetch remote articles: {0}")]
    Remote(#[source] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Data directory unavailable: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CallError> for SyncError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::MustReauthenticate => Self::SessionExpired,
            CallError::Api(e) => Self::Remote(e),
        }
    }
}

/// Resets the in-progress flag when a sync ends, however it ends
struct InProgress<'a>(&'a AtomicBool);

impl<'a> InProgress<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ReconciliationEngine<A, S> {
    caller: AuthenticatedCaller<A, S>,
    engine: SnapshotEngine,
    store: SnapshotStore,
    events: LibraryEventBus,
    max_concurrent_captures: usize,
    in_progress: AtomicBool,
}

impl<A, S> ReconciliationEngine<A, S>
where
    A: AuthApi + ArticlesApi,
    S: CredentialStore,
{
    pub fn new(
        caller: AuthenticatedCaller<A, S>,
        engine: SnapshotEngine,
        store: SnapshotStore,
        events: LibraryEventBus,
        max_concurrent_captures: usize,
    ) -> Self {
        Self {
            caller,
            engine,
            store,
            events,
            max_concurrent_captures: max_concurrent_captures.max(1),
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Pull, merge, save, then backfill missing snapshots
    pub async fn sync(&self, catalog: &Mutex<Catalog>) -> Result<SyncOutcome, SyncError> {
        let Some(_running) = InProgress::acquire(&self.in_progress) else {
            log::info!("Sync already in progress");
            return Ok(SyncOutcome::AlreadyRunning);
        };
        self.events.publish(LibraryEvent::SyncStarted {
            timestamp: Utc::now(),
        });

        let api = self.caller.api();
        let items = self
            .caller
            .call(|token| async move { api.list_articles(&token).await })
            .await?;
        log::info!("Fetched {} remote articles", items.len());

        let (stats, merged) = {
            let mut catalog = catalog.lock();
            let stats = merge_remote_items(&mut catalog, &items, Utc::now());
            (stats, catalog.clone())
        };
        self.store.save(&merged).await?;

        self.store.ensure_root().await?;
        let mut pending: Vec<SnapshotRecord> = Vec::new();
        for record in merged.active() {
            if !self.store.cache_exists(record).await {
                pending.push(record.clone());
            }
        }
        log::info!("{} records need a snapshot", pending.len());

        let results = self.capture_all(&pending).await;

        let mut report = SyncReport {
            remote_items: items.len(),
            added: stats.added,
            updated: stats.updated,
            ..SyncReport::default()
        };
        let mut obsolete_dirs = Vec::new();
        let updated = {
            let mut catalog = catalog.lock();
            for (local_id, result) in results {
                match result {
                    Ok(capture) => {
                        report.captured += 1;
                        self.events.publish(LibraryEvent::PageCaptured {
                            local_id,
                            cache_dir: capture.cache_dir.clone(),
                            asset_count: capture.asset_count,
                            timestamp: Utc::now(),
                        });
                        match catalog.get_mut(local_id) {
                            Some(record) => obsolete_dirs.extend(attach_capture(record, capture)),
                            // Deleted while capturing
                            None => obsolete_dirs.push(capture.cache_dir),
                        }
                    }
                    Err(e) => {
                        report.failed += 1;
                        log::warn!("Capture of {local_id} failed: {e}");
                        self.events.publish(LibraryEvent::CaptureFailed {
                            local_id,
                            message: e.to_string(),
                            timestamp: Utc::now(),
                        });
                    }
                }
            }
            catalog.clone()
        };

        for dir in &obsolete_dirs {
            self.store.remove_cache(dir).await;
        }
        self.store.save(&updated).await?;

        log::info!(
            "Sync complete: {} remote, {} added, {} updated, {} captured, {} failed",
            report.remote_items,
            report.added,
            report.updated,
            report.captured,
            report.failed
        );
        self.events.publish(LibraryEvent::SyncCompleted {
            report,
            timestamp: Utc::now(),
        });
        Ok(SyncOutcome::Completed(report))
    }

    async fn capture_all(
        &self,
        pending: &[SnapshotRecord],
    ) -> Vec<(Uuid, Result<CaptureResult, CaptureError>)> {
        let semaphore = Semaphore::new(self.max_concurrent_captures);
        let captures = pending.iter().map(|record| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                Some((record.local_id, self.engine.capture(&record.source_url).await))
            }
        });
        join_all(captures).await.into_iter().flatten().collect()
    }
}

/// Point `record` at a new snapshot; returns the directory it replaced
fn attach_capture(record: &mut SnapshotRecord, capture: CaptureResult) -> Option<String> {
    if record.has_placeholder_title() {
        record.title = capture.title;
    }
    record
        .cache_dir
        .replace(capture.cache_dir)
        .filter(|old| Some(old) != record.cache_dir.as_ref())
}
