//! Maps asset URLs to file paths inside a snapshot directory.
//!
//! `assets/<host><path>`, with `index.txt` standing in for directory URLs and
//! an 8-char query hash spliced into the file name so URLs that differ only
//! by query never land on the same file. Path segments are percent-decoded
//! into file names on disk; the relative reference written into the page is
//! percent-encoded again so a renderer resolves it back to the same file.
//! Pure function of its inputs.

use std::path::{Path, PathBuf};

use sanitize_filename::Options;
use url::Url;

use crate::utils::{ASSETS_DIR_NAME, hash_hex, sanitize_host};

const DIRECTORY_INDEX_NAME: &str = "index.txt";

/// Relative, `/`-separated, percent-encoded reference to `url`'s local copy
#[must_use]
pub fn asset_relative_path(url: &Url) -> String {
    asset_components(url)
        .iter()
        .map(|component| urlencoding::encode(component))
        .collect::<Vec<_>>()
        .join("/")
}

/// Absolute location of `url` under the snapshot directory `root`
#[must_use]
pub fn asset_local_path(url: &Url, root: &Path) -> PathBuf {
    asset_components(url)
        .iter()
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Decoded file-system components: `assets`, host, then the path
fn asset_components(url: &Url) -> Vec<String> {
    let mut segments: Vec<String> = url
        .path_segments()
        .map(|segments| segments.filter_map(file_name_component).collect())
        .unwrap_or_default();

    if url.path().ends_with('/') || segments.is_empty() {
        segments.push(DIRECTORY_INDEX_NAME.to_string());
    }

    if let Some(query) = url.query().filter(|q| !q.is_empty())
        && let Some(file_name) = segments.last_mut()
    {
        let hash = hash_hex(query);
        *file_name = splice_hash(file_name, &hash[..8]);
    }

    let mut components = vec![ASSETS_DIR_NAME.to_string()];
    if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
        let mut host = sanitize_host(host);
        if let Some(port) = url.port() {
            host.push('_');
            host.push_str(&port.to_string());
        }
        components.push(host);
    }
    components.extend(segments);
    components
}

/// One URL path segment as a file name: percent-decoded, separators and
/// control characters replaced; `None` for empty segments
fn file_name_component(segment: &str) -> Option<String> {
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode_binary(segment.as_bytes());
    let name = sanitize_filename::sanitize_with_options(
        String::from_utf8_lossy(&decoded),
        Options {
            replacement: "_",
            ..Options::default()
        },
    );
    (!name.is_empty()).then_some(name)
}

/// `foo.js` + `abcd1234` → `foo_abcd1234.js`; `foo` → `foo_abcd1234`
fn splice_hash(file_name: &str, hash: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{hash}.{ext}"),
        _ => format!("{file_name}_{hash}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(url: &str) -> String {
        asset_relative_path(&Url::parse(url).expect("valid url"))
    }

    #[test]
    fn default_mapping_keeps_host_and_path() {
        assert_eq!(
            rel("https://cdn.example.com/js/app.js"),
            "assets/cdn.example.com/js/app.js"
        );
        assert_eq!(
            rel("http://127.0.0.1:8080/a.png"),
            "assets/127.0.0.1_8080/a.png"
        );
    }

    #[test]
    fn directory_urls_get_synthetic_file_name() {
        assert_eq!(rel("https://example.com/fonts/"), "assets/example.com/fonts/index.txt");
        assert_eq!(rel("https://example.com/"), "assets/example.com/index.txt");
    }

    #[test]
    fn query_hash_goes_before_extension() {
        let path = rel("https://example.com/js/foo.js?v=2");
        let hash = &hash_hex("v=2")[..8];
        assert_eq!(path, format!("assets/example.com/js/foo_{hash}.js"));

        let dir = rel("https://example.com/?q=1");
        let hash = &hash_hex("q=1")[..8];
        assert_eq!(dir, format!("assets/example.com/index_{hash}.txt"));
    }

    #[test]
    fn urls_differing_only_by_query_do_not_collide() {
        let plain = rel("https://example.com/a.css");
        let v1 = rel("https://example.com/a.css?v=1");
        let v2 = rel("https://example.com/a.css?v=2");
        assert_ne!(plain, v1);
        assert_ne!(v1, v2);
        assert_ne!(plain, v2);
    }

    #[test]
    fn mapping_is_deterministic() {
        let url = Url::parse("https://example.com/x/y.woff2?family=a%20b").expect("valid url");
        let root = Path::new("/data/snap");
        assert_eq!(asset_local_path(&url, root), asset_local_path(&url, root));
        assert_eq!(asset_relative_path(&url), asset_relative_path(&url));
        assert!(asset_local_path(&url, root).starts_with(root.join("assets")));
    }

    #[test]
    fn escaped_segments_are_decoded_on_disk_and_encoded_in_references() {
        let url = Url::parse("https://example.com/img/my%20logo.png").expect("valid url");
        let root = Path::new("/data/snap");
        assert_eq!(asset_relative_path(&url), "assets/example.com/img/my%20logo.png");
        assert_eq!(
            asset_local_path(&url, root),
            root.join("assets").join("example.com").join("img").join("my logo.png")
        );

        let url = Url::parse("https://example.com/caf%C3%A9.css").expect("valid url");
        assert_eq!(asset_relative_path(&url), "assets/example.com/caf%C3%A9.css");
        assert!(asset_local_path(&url, root).ends_with("café.css"));
    }

    #[test]
    fn decoded_separators_and_nul_stay_inside_one_file_name() {
        assert_eq!(rel("https://example.com/a%2Fb.js"), "assets/example.com/a_b.js");
        assert_eq!(rel("https://example.com/x%00y.js"), "assets/example.com/x_y.js");

        let url = Url::parse("https://example.com/%2E%2E/%2e%2e/passwd.css").expect("valid url");
        let root = Path::new("/data/snap");
        assert!(asset_local_path(&url, root).starts_with(root.join("assets").join("example.com")));
    }

    #[test]
    fn dot_segments_cannot_escape_root() {
        let path = rel("https://example.com/a/../../../etc/passwd.css");
        assert_eq!(path, "assets/example.com/etc/passwd.css");
    }
}
