//! Merging the server's article list into the local catalog
//!
//! A remote item matches the record with the same remote id; failing that, a
//! record with no remote id yet and the same source URL (a page saved locally
//! before the server acknowledged it). Matched records take the server's id,
//! flags and date but keep their local cache. Everything else becomes a new
//! uncached record. Applying the same list twice changes nothing.

use chrono::{DateTime, Utc};
use url::Url;

use crate::api::RemoteArticle;
use crate::store::{Catalog, SnapshotRecord};

/// What a merge did to the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub updated: usize,
    /// Items whose URL did not parse
    pub skipped: usize,
}

/// Merge `items` into `catalog` and re-sort it
///
/// `now` is the `addedAt` of new records whose server date is unusable.
pub fn merge_remote_items(
    catalog: &mut Catalog,
    items: &[RemoteArticle],
    now: DateTime<Utc>,
) -> MergeStats {
    let mut stats = MergeStats::default();

    for item in items {
        let Ok(url) = Url::parse(&item.url) else {
            log::warn!("Skipping remote article {} with invalid URL {:?}", item.id, item.url);
            stats.skipped += 1;
            continue;
        };

        let records = catalog.records_mut();
        let matched = records
            .iter()
            .position(|r| r.remote_id == Some(item.id))
            .or_else(|| {
                records
                    .iter()
                    .position(|r| r.remote_id.is_none() && r.source_url == url)
            });

        match matched {
            Some(idx) => {
                if apply_remote(&mut records[idx], item) {
                    stats.updated += 1;
                }
            }
            None => {
                records.push(SnapshotRecord::uncached(
                    item.id,
                    url,
                    item.added_at().unwrap_or(now),
                    item.archived,
                    item.favorited,
                ));
                stats.added += 1;
            }
        }
    }

    catalog.sort();
    stats
}

/// Copy the server's view of `item` onto `record`; returns whether anything changed
///
/// `cache_dir`, `title` and `local_id` are local state and never touched. An
/// unparseable server date keeps the existing `added_at`.
pub fn apply_remote(record: &mut SnapshotRecord, item: &RemoteArticle) -> bool {
    let added_at = item.added_at().unwrap_or(record.added_at);
    let changed = record.remote_id != Some(item.id)
        || record.archived != item.archived
        || record.favorited != item.favorited
        || record.added_at != added_at;

    record.remote_id = Some(item.id);
    record.archived = item.archived;
    record.favorited = item.favorited;
    record.added_at = added_at;
    changed
}
