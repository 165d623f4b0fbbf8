//! URL helpers shared by the capture pipeline and the catalog.

use url::Url;

/// Check if a URL uses a scheme we can capture (`http` or `https`)
#[must_use]
pub fn is_http_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`
///
/// Used to turn a host into a directory-name component.
#[must_use]
pub fn sanitize_host(host: &str) -> String {
    host.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Host of a URL, or `None` when it has no (non-empty) host
#[must_use]
pub fn host_of(url: &Url) -> Option<&str> {
    url.host_str().filter(|h| !h.is_empty())
}

/// Display title used before a page has been captured: host, then `Untitled`
#[must_use]
pub fn fallback_title(url: &Url) -> String {
    host_of(url).unwrap_or("Untitled").to_string()
}

/// 16 hex chars of the xxh3-64 hash of `input`
#[must_use]
pub fn hash_hex(input: &str) -> String {
    format!("{:016x}", xxhash_rust::xxh3::xxh3_64(input.as_bytes()))
}
