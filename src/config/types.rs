//! Core configuration types
//!
//! `StashConfig` carries every tunable of the capture pipeline, the local
//! store and the remote API client.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_MAX_ASSET_SIZE_BYTES, DEFAULT_MAX_CONCURRENT_ASSETS,
    DEFAULT_MAX_CONCURRENT_CAPTURES, DEFAULT_MAX_PAGE_SIZE_BYTES, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Main configuration struct for the stash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StashConfig {
    /// Root directory holding the catalog document and one directory per snapshot.
    ///
    /// **INVARIANT:** Always an absolute path (normalized in builder).
    pub(crate) data_dir: PathBuf,

    /// Base URL of the saved-articles API.
    ///
    /// **INVARIANT:** Always ends with `/` so relative endpoint joins append
    /// instead of replacing the last segment.
    pub(crate) api_base_url: Url,

    /// Timeout in seconds applied to every HTTP request
    ///
    /// Default: 30 seconds
    pub(crate) request_timeout_secs: u64,

    /// Maximum assets fetched concurrently within one capture
    ///
    /// Default: 8, Range: 1-64
    pub(crate) max_concurrent_assets: usize,

    /// Maximum pages captured concurrently during a sync
    ///
    /// Default: 4, Range: 1-32
    pub(crate) max_concurrent_captures: usize,

    /// Pages larger than this fail the capture
    pub(crate) max_page_size_bytes: usize,

    /// Assets larger than this are dropped from the capture
    pub(crate) max_asset_size_bytes: usize,

    pub(crate) user_agent: String,
}

impl StashConfig {
    pub(crate) fn with_required(data_dir: PathBuf, api_base_url: Url) -> Self {
        Self {
            data_dir,
            api_base_url,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrent_assets: DEFAULT_MAX_CONCURRENT_ASSETS,
            max_concurrent_captures: DEFAULT_MAX_CONCURRENT_CAPTURES,
            max_page_size_bytes: DEFAULT_MAX_PAGE_SIZE_BYTES,
            max_asset_size_bytes: DEFAULT_MAX_ASSET_SIZE_BYTES,
            user_agent: CHROME_USER_AGENT.to_string(),
        }
    }
}
