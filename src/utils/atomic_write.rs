//! Atomic file writes (temp file in the target directory, then rename).
//!
//! Readers never observe a half-written file: either the previous contents or
//! the new ones. All file I/O runs on the blocking pool.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `content` to `path` atomically, creating parent directories.
pub async fn write_atomic(path: &Path, content: Vec<u8>) -> Result<()> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let parent_dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Path has no parent directory: {}", path.display()))?;

        std::fs::create_dir_all(parent_dir)
            .with_context(|| format!("Failed to create directory {}", parent_dir.display()))?;

        // Temp file must live on the same filesystem as the target for rename to be atomic
        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .with_context(|| format!("Failed to create temp file in {}", parent_dir.display()))?;
        temp_file.write_all(&content)?;
        temp_file.as_file().sync_all()?;

        temp_file
            .persist(&path)
            .with_context(|| format!("Failed to persist {}", path.display()))?;
        Ok(())
    })
    .await
    .map_err(|e| anyhow::anyhow!("Blocking write task panicked: {e}"))?
}
