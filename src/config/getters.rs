//! Getter methods for `StashConfig`

use std::path::Path;
use std::time::Duration;
use url::Url;

use super::types::StashConfig;

impl StashConfig {
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn max_concurrent_assets(&self) -> usize {
        self.max_concurrent_assets
    }

    #[must_use]
    pub fn max_concurrent_captures(&self) -> usize {
        self.max_concurrent_captures
    }

    #[must_use]
    pub fn max_page_size_bytes(&self) -> usize {
        self.max_page_size_bytes
    }

    #[must_use]
    pub fn max_asset_size_bytes(&self) -> usize {
        self.max_asset_size_bytes
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
