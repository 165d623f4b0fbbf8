//! Catalog of saved pages.
//!
//! The catalog is the single persisted document listing every snapshot the
//! stash knows about, cached or not. It is always mutated in memory and then
//! written back whole by [`SnapshotStore::save`](super::SnapshotStore::save).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::utils::{fallback_title, host_of};

/// One saved page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    /// Stable local identifier, generated once and never reused
    pub local_id: Uuid,
    /// Server identifier, present once the server knows about this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<i64>,
    pub title: String,
    pub source_url: Url,
    /// Snapshot directory name under the data dir; `None` until cached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub favorited: bool,
}

impl SnapshotRecord {
    /// Record for a page that was just captured locally
    #[must_use]
    pub fn captured(source_url: Url, title: String, cache_dir: String, favorited: bool) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            remote_id: None,
            title,
            source_url,
            cache_dir: Some(cache_dir),
            added_at: Utc::now(),
            archived: false,
            favorited,
        }
    }

    /// Record for a page known from the server but not yet cached
    #[must_use]
    pub fn uncached(
        remote_id: i64,
        source_url: Url,
        added_at: DateTime<Utc>,
        archived: bool,
        favorited: bool,
    ) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            remote_id: Some(remote_id),
            title: fallback_title(&source_url),
            source_url,
            cache_dir: None,
            added_at,
            archived,
            favorited,
        }
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        host_of(&self.source_url)
    }

    /// Title has not been derived from page content yet
    #[must_use]
    pub fn has_placeholder_title(&self) -> bool {
        self.title.is_empty() || self.host() == Some(self.title.as_str())
    }
}

/// All snapshot records, persisted as one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pages: Vec<SnapshotRecord>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records, sorted newest first
    #[must_use]
    pub fn from_records(pages: Vec<SnapshotRecord>) -> Self {
        let mut catalog = Self { pages };
        catalog.sort();
        catalog
    }

    /// Records sorted by `added_at`, newest first
    #[must_use]
    pub fn records(&self) -> &[SnapshotRecord] {
        &self.pages
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<SnapshotRecord> {
        &mut self.pages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Stable sort by `added_at` descending; ties keep their relative order
    pub fn sort(&mut self) {
        self.pages.sort_by(|a, b| b.added_at.cmp(&a.added_at));
    }

    pub fn insert(&mut self, record: SnapshotRecord) {
        self.pages.push(record);
        self.sort();
    }

    #[must_use]
    pub fn get(&self, local_id: Uuid) -> Option<&SnapshotRecord> {
        self.pages.iter().find(|p| p.local_id == local_id)
    }

    pub fn get_mut(&mut self, local_id: Uuid) -> Option<&mut SnapshotRecord> {
        self.pages.iter_mut().find(|p| p.local_id == local_id)
    }

    #[must_use]
    pub fn find_by_remote_id(&self, remote_id: i64) -> Option<&SnapshotRecord> {
        self.pages.iter().find(|p| p.remote_id == Some(remote_id))
    }

    pub fn remove(&mut self, local_id: Uuid) -> Option<SnapshotRecord> {
        let idx = self.pages.iter().position(|p| p.local_id == local_id)?;
        Some(self.pages.remove(idx))
    }

    /// Non-archived records, newest first
    pub fn active(&self) -> impl Iterator<Item = &SnapshotRecord> {
        self.pages.iter().filter(|p| !p.archived)
    }

    pub fn archived(&self) -> impl Iterator<Item = &SnapshotRecord> {
        self.pages.iter().filter(|p| p.archived)
    }
}
