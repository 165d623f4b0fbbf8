//! One full page capture: fetch, scan, fetch assets, rewrite, persist.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use regex::Regex;
use reqwest::Client;
use tokio::sync::Semaphore;
use url::Url;

use super::downloaders::{DownloadError, DownloadLimits, download_asset, download_bytes};
use super::rewriter::rewrite_references;
use super::scanner::scan_asset_references;
use super::types::{AssetReplacement, CaptureError, CaptureResult, DiscoveredAsset};
use crate::config::StashConfig;
use crate::utils::{SNAPSHOT_INDEX_FILENAME, fallback_title, hash_hex, host_of, sanitize_host, write_atomic};

static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern is valid")
});

const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Capture tunables, copied out of `StashConfig`
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub request_timeout: Duration,
    pub max_concurrent_assets: usize,
    pub max_page_size_bytes: usize,
    pub max_asset_size_bytes: usize,
    pub user_agent: String,
}

impl CaptureSettings {
    #[must_use]
    pub fn from_config(config: &StashConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            max_concurrent_assets: config.max_concurrent_assets(),
            max_page_size_bytes: config.max_page_size_bytes(),
            max_asset_size_bytes: config.max_asset_size_bytes(),
            user_agent: config.user_agent().to_string(),
        }
    }

    fn page_limits(&self) -> DownloadLimits {
        DownloadLimits {
            timeout: self.request_timeout,
            max_size: self.max_page_size_bytes,
        }
    }

    fn asset_limits(&self) -> DownloadLimits {
        DownloadLimits {
            timeout: self.request_timeout,
            max_size: self.max_asset_size_bytes,
        }
    }
}

/// Captures pages into snapshot directories under `root`
#[derive(Debug, Clone)]
pub struct SnapshotEngine {
    client: Client,
    root: PathBuf,
    settings: CaptureSettings,
}

impl SnapshotEngine {
    #[must_use]
    pub fn new(client: Client, root: impl Into<PathBuf>, settings: CaptureSettings) -> Self {
        Self {
            client,
            root: root.into(),
            settings,
        }
    }

    #[must_use]
    pub fn from_config(client: Client, config: &StashConfig) -> Self {
        Self::new(client, config.data_dir(), CaptureSettings::from_config(config))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Capture `url` and its first-order assets into a fresh directory
    ///
    /// On any error after the directory was created, the partial directory
    /// is removed before returning.
    pub async fn capture(&self, url: &Url) -> Result<CaptureResult, CaptureError> {
        if !crate::utils::is_http_url(url) {
            return Err(CaptureError::UnsupportedScheme(url.scheme().to_string()));
        }

        let cache_dir = snapshot_dir_name(url, Utc::now());
        let site_dir = self.root.join(&cache_dir);

        match tokio::fs::remove_dir_all(&site_dir).await {
            Ok(()) => log::debug!("Replaced existing snapshot directory {}", site_dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&site_dir).await?;

        match self.capture_into(url, &site_dir, cache_dir).await {
            Ok(result) => {
                log::info!(
                    "Captured {} into {} ({} assets)",
                    url,
                    result.cache_dir,
                    result.asset_count
                );
                Ok(result)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_dir_all(&site_dir).await {
                    log::warn!(
                        "Failed to remove partial snapshot {}: {cleanup}",
                        site_dir.display()
                    );
                }
                Err(e)
            }
        }
    }

    async fn capture_into(
        &self,
        url: &Url,
        site_dir: &Path,
        cache_dir: String,
    ) -> Result<CaptureResult, CaptureError> {
        let body = self.fetch_page(url).await?;
        let html = decode_page(body).ok_or_else(|| CaptureError::InvalidContent(url.to_string()))?;
        let title = extract_title(&html).unwrap_or_else(|| fallback_title(url));

        let assets = scan_asset_references(&html, url);
        log::debug!("Found {} asset references in {}", assets.len(), url);

        let replacements = self.fetch_assets(assets, site_dir).await;
        let rewritten = rewrite_references(&html, &replacements);

        write_atomic(&site_dir.join(SNAPSHOT_INDEX_FILENAME), rewritten.into_bytes())
            .await
            .map_err(|e| CaptureError::Write(format!("{e:#}")))?;

        Ok(CaptureResult {
            cache_dir,
            asset_count: replacements.len(),
            title,
        })
    }

    async fn fetch_page(&self, url: &Url) -> Result<Vec<u8>, CaptureError> {
        download_bytes(
            &self.client,
            url.as_str(),
            &self.settings.user_agent,
            PAGE_ACCEPT,
            &self.settings.page_limits(),
        )
        .await
        .map_err(|e| match e {
            DownloadError::Status(status) => CaptureError::BadResponse {
                url: url.to_string(),
                status,
            },
            DownloadError::Transport(source) => CaptureError::Transport {
                url: url.to_string(),
                source,
            },
            DownloadError::TooLarge { limit } => CaptureError::TooLarge {
                url: url.to_string(),
                limit,
            },
        })
    }

    /// Fetch every asset with bounded concurrency; failures are dropped
    async fn fetch_assets(
        &self,
        assets: Vec<DiscoveredAsset>,
        site_dir: &Path,
    ) -> Vec<AssetReplacement> {
        let semaphore = Semaphore::new(self.settings.max_concurrent_assets.max(1));
        let limits = self.settings.asset_limits();

        let downloads = assets.iter().map(|asset| {
            let semaphore = &semaphore;
            let limits = &limits;
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                match download_asset(&self.client, asset, site_dir, &self.settings.user_agent, limits)
                    .await
                {
                    Ok(replacement) => Some(replacement),
                    Err(e) => {
                        log::debug!("Dropping asset {}: {e:#}", asset.url);
                        None
                    }
                }
            }
        });

        join_all(downloads).await.into_iter().flatten().collect()
    }
}

/// `<sanitizedHost>__<urlHash>__<UTC timestamp>`, safe as a single path component
#[must_use]
pub fn snapshot_dir_name(url: &Url, now: DateTime<Utc>) -> String {
    let host = host_of(url).map_or_else(|| "site".to_string(), sanitize_host);
    format!(
        "{host}__{}__{}",
        hash_hex(url.as_str()),
        now.format("%Y-%m-%dT%H-%M-%S%.3fZ")
    )
}

/// First `<title>` content, trimmed and entity-decoded; `None` when absent or blank
#[must_use]
pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_PATTERN.captures(html)?.get(1)?.as_str();
    let title = html_escape::decode_html_entities(raw.trim()).trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// UTF-8, else Latin-1 as long as the bytes do not look binary
fn decode_page(bytes: Vec<u8>) -> Option<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            let bytes = e.into_bytes();
            if bytes.contains(&0) {
                None
            } else {
                Some(bytes.iter().map(|&b| char::from(b)).collect())
            }
        }
    }
}
