//! Test utilities and helper functions for the stash test suite

use std::path::Path;
use std::sync::Arc;

use kodegen_tools_stash::{
    CredentialStore, HttpApiClient, Library, MemoryCredentialStore, SnapshotEngine, StashConfig,
    build_http_client,
};
use mockito::{Mock, Server};
use tempfile::TempDir;

pub type TestLibrary = Library<HttpApiClient, MemoryCredentialStore>;

/// Creates a temporary directory for test data
#[allow(dead_code)]
pub fn create_test_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

/// Config rooted at `data_dir` talking to `<server>/api/`
#[allow(dead_code)]
pub fn test_config(data_dir: &Path, server: &Server) -> StashConfig {
    StashConfig::builder()
        .data_dir(data_dir)
        .api_base_url(format!("{}/api/", server.url()))
        .request_timeout_secs(5)
        .build()
        .expect("valid test config")
}

/// Creates a test HTML document with specified title and body
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
</head>
<body>
    {}
</body>
</html>"#,
        html_escape::encode_text(title),
        body
    )
}

#[allow(dead_code)]
pub fn test_engine(config: &StashConfig) -> SnapshotEngine {
    let client = build_http_client(config).expect("http client");
    SnapshotEngine::from_config(client, config)
}

/// Credential store holding the given tokens
#[allow(dead_code)]
pub fn credentials(access: Option<&str>, refresh: Option<&str>) -> Arc<MemoryCredentialStore> {
    let store = MemoryCredentialStore::new();
    if let Some(access) = access {
        store.save("access_token", access).expect("save access token");
    }
    if let Some(refresh) = refresh {
        store.save("refresh_token", refresh).expect("save refresh token");
    }
    Arc::new(store)
}

#[allow(dead_code)]
pub async fn open_library(config: &StashConfig, credentials: Arc<MemoryCredentialStore>) -> TestLibrary {
    Library::with_credentials(config, credentials)
        .await
        .expect("open library")
}

/// Serve `body` as HTML at `path`
#[allow(dead_code)]
pub async fn mock_page(server: &mut Server, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(body)
        .create_async()
        .await
}

/// Serve raw bytes with a content type at `path`
#[allow(dead_code)]
pub async fn mock_asset(server: &mut Server, path: &str, content_type: &str, body: &[u8]) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", content_type)
        .with_body(body)
        .create_async()
        .await
}

/// One remote article as the server encodes it
#[allow(dead_code)]
pub fn article_json(id: i64, url: &str, archived: bool, favorited: bool, date_added: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "url": url,
        "archived": i32::from(archived),
        "favorited": i32::from(favorited),
        "date_added": date_added,
        "updated_at": date_added,
    })
}

/// `GET /api/articles` answering `items` for bearer `token`
#[allow(dead_code)]
pub async fn mock_article_list(server: &mut Server, token: &str, items: Vec<serde_json::Value>) -> Mock {
    server
        .mock("GET", "/api/articles")
        .match_header("authorization", format!("Bearer {token}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "items": items }).to_string())
        .create_async()
        .await
}

/// Every snapshot directory under `root` (excludes the catalog document)
#[allow(dead_code)]
pub fn snapshot_dirs(root: &Path) -> Vec<String> {
    let mut dirs: Vec<String> = std::fs::read_dir(root)
        .expect("read data dir")
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    dirs.sort();
    dirs
}
