//! Durable home of the catalog document and of every snapshot directory.
//!
//! The catalog is written with the temp-file-then-rename pattern so a crash
//! mid-write leaves the previous document intact. A missing or unreadable
//! document loads as an empty catalog.

use std::path::{Path, PathBuf};

use super::catalog::{Catalog, SnapshotRecord};
use super::errors::StoreError;
use crate::utils::{CATALOG_FILENAME, SNAPSHOT_INDEX_FILENAME, write_atomic};

/// Where a renderer finds a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLocation {
    /// The captured `index.html`
    pub index_html: PathBuf,
    /// The only directory the renderer may read from
    pub read_root: PathBuf,
}

/// Catalog document plus snapshot directories under one root
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILENAME)
    }

    #[must_use]
    pub fn snapshot_dir(&self, dir_name: &str) -> PathBuf {
        self.root.join(dir_name)
    }

    /// Create the root directory if it does not exist yet
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Load the catalog; absence or corruption yields an empty catalog
    pub async fn load(&self) -> Catalog {
        if let Err(e) = self.ensure_root().await {
            log::warn!("Failed to create data dir {}: {e}", self.root.display());
        }

        let path = self.catalog_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Catalog::new(),
            Err(e) => {
                log::warn!("Failed to read catalog {}: {e}; starting empty", path.display());
                return Catalog::new();
            }
        };

        match serde_json::from_slice::<Catalog>(&bytes) {
            Ok(mut catalog) => {
                catalog.sort();
                catalog
            }
            Err(e) => {
                log::warn!("Catalog {} is unreadable ({e}); starting empty", path.display());
                Catalog::new()
            }
        }
    }

    /// Replace the catalog document atomically
    pub async fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(catalog)?;
        write_atomic(&self.catalog_path(), json)
            .await
            .map_err(|e| StoreError::Write(format!("{e:#}")))?;
        log::debug!("Saved catalog with {} records", catalog.len());
        Ok(())
    }

    /// True iff the record names a cache dir and its `index.html` exists
    #[must_use]
    pub fn has_cache(&self, record: &SnapshotRecord) -> bool {
        self.index_path(record).is_some_and(|p| p.is_file())
    }

    /// Async form of [`has_cache`](Self::has_cache) for use on the runtime
    pub async fn cache_exists(&self, record: &SnapshotRecord) -> bool {
        let Some(path) = self.index_path(record) else {
            return false;
        };
        tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_file())
    }

    #[must_use]
    pub fn index_path(&self, record: &SnapshotRecord) -> Option<PathBuf> {
        let dir = record.cache_dir.as_deref()?;
        is_safe_dir_name(dir).then(|| self.snapshot_dir(dir).join(SNAPSHOT_INDEX_FILENAME))
    }

    /// Paths a renderer needs, when the snapshot exists on disk
    #[must_use]
    pub fn locate(&self, record: &SnapshotRecord) -> Option<SnapshotLocation> {
        if !self.has_cache(record) {
            return None;
        }
        let dir = record.cache_dir.as_deref()?;
        Some(SnapshotLocation {
            index_html: self.snapshot_dir(dir).join(SNAPSHOT_INDEX_FILENAME),
            read_root: self.snapshot_dir(dir),
        })
    }

    /// Best-effort recursive delete of a snapshot directory; no-op if absent
    pub async fn remove_cache(&self, dir_name: &str) {
        if !is_safe_dir_name(dir_name) {
            log::warn!("Refusing to remove suspicious snapshot dir name: {dir_name:?}");
            return;
        }
        let dir = self.snapshot_dir(dir_name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => log::debug!("Removed snapshot dir {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove snapshot dir {}: {e}", dir.display()),
        }
    }
}

/// A single path component that cannot escape the root
fn is_safe_dir_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && name != CATALOG_FILENAME
}
