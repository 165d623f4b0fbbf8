//! Type-safe builder for `StashConfig` using the typestate pattern
//!
//! `build()` only exists once both required fields (data dir and API base
//! URL) have been provided, so a half-configured stash cannot be constructed.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use std::path::PathBuf;
use url::Url;

use super::types::StashConfig;
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_DATA_DIR_NAME, DEFAULT_MAX_ASSET_SIZE_BYTES,
    DEFAULT_MAX_CONCURRENT_ASSETS, DEFAULT_MAX_CONCURRENT_CAPTURES, DEFAULT_MAX_PAGE_SIZE_BYTES,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

// Type states for the builder
pub struct WithDataDir;
pub struct Complete;

pub struct StashConfigBuilder<State = ()> {
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) api_base_url: Option<String>,
    pub(crate) request_timeout_secs: u64,
    pub(crate) max_concurrent_assets: usize,
    pub(crate) max_concurrent_captures: usize,
    pub(crate) max_page_size_bytes: usize,
    pub(crate) max_asset_size_bytes: usize,
    pub(crate) user_agent: String,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for StashConfigBuilder<()> {
    fn default() -> Self {
        Self {
            data_dir: None,
            api_base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrent_assets: DEFAULT_MAX_CONCURRENT_ASSETS,
            max_concurrent_captures: DEFAULT_MAX_CONCURRENT_CAPTURES,
            max_page_size_bytes: DEFAULT_MAX_PAGE_SIZE_BYTES,
            max_asset_size_bytes: DEFAULT_MAX_ASSET_SIZE_BYTES,
            user_agent: CHROME_USER_AGENT.to_string(),
            _phantom: PhantomData,
        }
    }
}

impl StashConfig {
    /// Create a builder for configuring a `StashConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> StashConfigBuilder<()> {
        StashConfigBuilder::default()
    }
}

/// Platform data directory for the stash (`~/.local/share/kodegen-stash` on Linux)
///
/// # Errors
///
/// Returns an error when the platform exposes no data directory.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(DEFAULT_DATA_DIR_NAME))
        .ok_or_else(|| anyhow!("No platform data directory available; pass a data dir explicitly"))
}

impl<State> StashConfigBuilder<State> {
    fn transition<Next>(self) -> StashConfigBuilder<Next> {
        StashConfigBuilder {
            data_dir: self.data_dir,
            api_base_url: self.api_base_url,
            request_timeout_secs: self.request_timeout_secs,
            max_concurrent_assets: self.max_concurrent_assets,
            max_concurrent_captures: self.max_concurrent_captures,
            max_page_size_bytes: self.max_page_size_bytes,
            max_asset_size_bytes: self.max_asset_size_bytes,
            user_agent: self.user_agent,
            _phantom: PhantomData,
        }
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_concurrent_assets(mut self, limit: usize) -> Self {
        self.max_concurrent_assets = limit;
        self
    }

    #[must_use]
    pub fn max_concurrent_captures(mut self, limit: usize) -> Self {
        self.max_concurrent_captures = limit;
        self
    }

    #[must_use]
    pub fn max_page_size_bytes(mut self, bytes: usize) -> Self {
        self.max_page_size_bytes = bytes;
        self
    }

    /// Set the per-asset size limit
    ///
    /// Assets exceeding it are dropped like any other failed asset; the page
    /// keeps pointing at the remote URL.
    #[must_use]
    pub fn max_asset_size_bytes(mut self, bytes: usize) -> Self {
        self.max_asset_size_bytes = bytes;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl StashConfigBuilder<()> {
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> StashConfigBuilder<WithDataDir> {
        self.data_dir = Some(dir.into());
        self.transition()
    }
}

impl StashConfigBuilder<WithDataDir> {
    pub fn api_base_url(mut self, url: impl Into<String>) -> StashConfigBuilder<Complete> {
        self.api_base_url = Some(url.into());
        self.transition()
    }
}

// Build method only available when all required fields are set
impl StashConfigBuilder<Complete> {
    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL does not parse or is not
    /// `http(s)`, if the data dir cannot be made absolute, or if a
    /// concurrency limit is zero.
    pub fn build(self) -> Result<StashConfig> {
        let data_dir = self
            .data_dir
            .ok_or_else(|| anyhow!("data_dir is required"))?;
        let data_dir = if data_dir.is_absolute() {
            data_dir
        } else {
            std::env::current_dir()
                .map_err(|e| anyhow!("Failed to get current directory: {e}"))?
                .join(data_dir)
        };

        let raw_url = self
            .api_base_url
            .ok_or_else(|| anyhow!("api_base_url is required"))?;
        let api_base_url = normalize_base_url(&raw_url)?;

        if self.max_concurrent_assets == 0 || self.max_concurrent_captures == 0 {
            return Err(anyhow!("Concurrency limits must be at least 1"));
        }

        let mut config = StashConfig::with_required(data_dir, api_base_url);
        config.request_timeout_secs = self.request_timeout_secs;
        config.max_concurrent_assets = self.max_concurrent_assets.min(64);
        config.max_concurrent_captures = self.max_concurrent_captures.min(32);
        config.max_page_size_bytes = self.max_page_size_bytes;
        config.max_asset_size_bytes = self.max_asset_size_bytes;
        config.user_agent = self.user_agent;
        Ok(config)
    }
}

/// Parse the API base URL and make sure it ends with `/`
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| anyhow!("Invalid API base URL '{raw}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("API base URL must be http or https: {raw}"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
