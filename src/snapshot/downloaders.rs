//! Bounded HTTP downloads for pages and assets
//!
//! Every download streams the body with a hard size cap: the
//! `Content-Length` header is checked before reading, and the running total
//! is checked again per chunk since the header can lie or be missing.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;

use super::path_mapper::{asset_local_path, asset_relative_path};
use super::types::{AssetReplacement, DiscoveredAsset};
use crate::utils::write_atomic;

/// Per-request limits
#[derive(Debug, Clone)]
pub struct DownloadLimits {
    pub timeout: Duration,
    pub max_size: usize,
}

/// Why a bounded download did not produce a body
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// GET `url` and collect its body, enforcing status and size limits
pub async fn download_bytes(
    client: &Client,
    url: &str,
    user_agent: &str,
    accept: &str,
    limits: &DownloadLimits,
) -> std::result::Result<Vec<u8>, DownloadError> {
    let response = client
        .get(url)
        .timeout(limits.timeout)
        .header("User-Agent", user_agent)
        .header("Accept", accept)
        .send()
        .await?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(DownloadError::Status(status.as_u16()));
    }

    let expected_size = response.content_length().unwrap_or(0);
    if expected_size > limits.max_size as u64 {
        return Err(DownloadError::TooLarge {
            limit: limits.max_size,
        });
    }

    let mut buffer = if expected_size > 0 {
        Vec::with_capacity(expected_size as usize)
    } else {
        Vec::new()
    };

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if buffer.len() + chunk.len() > limits.max_size {
            return Err(DownloadError::TooLarge {
                limit: limits.max_size,
            });
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer)
}

/// Fetch one asset and store it at its mapped path under `site_dir`
pub async fn download_asset(
    client: &Client,
    asset: &DiscoveredAsset,
    site_dir: &Path,
    user_agent: &str,
    limits: &DownloadLimits,
) -> Result<AssetReplacement> {
    let bytes = download_bytes(client, asset.url.as_str(), user_agent, "*/*", limits)
        .await
        .with_context(|| format!("Failed to download asset {}", asset.url))?;

    let local_path = asset_local_path(&asset.url, site_dir);
    write_atomic(&local_path, bytes)
        .await
        .with_context(|| format!("Failed to store asset at {}", local_path.display()))?;

    Ok(AssetReplacement {
        original: asset.url.to_string(),
        local_path: asset_relative_path(&asset.url),
        spellings: asset.spellings.clone(),
    })
}
