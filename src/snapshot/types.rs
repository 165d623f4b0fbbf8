//! Type definitions for page capture

use thiserror::Error;
use url::Url;

/// An asset URL found in a page, with every raw spelling that referenced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredAsset {
    /// Absolute, fragment-free URL
    pub url: Url,
    /// The attribute / `url()` values exactly as they appeared in the page
    pub spellings: Vec<String>,
}

/// A fetched asset: the string to look for and the local path replacing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReplacement {
    /// Serialized absolute URL
    pub original: String,
    /// Path relative to the snapshot directory, `/`-separated
    pub local_path: String,
    /// Raw spellings (relative forms etc.) that also refer to this asset
    pub spellings: Vec<String>,
}

/// Outcome of one successful capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    /// Snapshot directory name under the data dir
    pub cache_dir: String,
    /// Number of assets fetched and stored
    pub asset_count: usize,
    pub title: String,
}

/// Errors that abort a capture
///
/// Asset failures never show up here; they only lower `asset_count`.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Bad response from {url}: HTTP {status}")]
    BadResponse { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Page at {url} exceeds size limit of {limit} bytes")]
    TooLarge { url: String, limit: usize },

    #[error("Page at {0} is not decodable text")]
    InvalidContent(String),

    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write snapshot: {0}")]
    Write(String),
}
