//! Offline page capture
//!
//! A capture downloads one page, discovers the assets it references directly,
//! downloads those concurrently, rewrites the references to local relative
//! paths and persists everything under a fresh snapshot directory.

mod downloaders;
pub mod engine;
pub mod path_mapper;
pub mod rewriter;
pub mod scanner;
pub mod types;

pub use engine::{CaptureSettings, SnapshotEngine, extract_title, snapshot_dir_name};
pub use path_mapper::{asset_local_path, asset_relative_path};
pub use rewriter::rewrite_references;
pub use scanner::scan_asset_references;
pub use types::{AssetReplacement, CaptureError, CaptureResult, DiscoveredAsset};
