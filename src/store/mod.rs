//! Local persistence: the catalog document and snapshot directories

pub mod catalog;
mod errors;
pub mod snapshot_store;

pub use catalog::{Catalog, SnapshotRecord};
pub use errors::StoreError;
pub use snapshot_store::{SnapshotLocation, SnapshotStore};
