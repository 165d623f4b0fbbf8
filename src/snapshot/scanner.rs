//! First-order asset discovery
//!
//! A heuristic, single-pass scan over raw HTML text. Two independent pattern
//! searches pick up `src=`/`href=` attribute values and CSS `url(...)`
//! arguments (inline `<style>` blocks and `style` attributes alike). No DOM is
//! built, `@import` is not followed, and references that only exist in
//! JavaScript are not found.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::types::DiscoveredAsset;
use crate::utils::{ASSET_EXTENSIONS, is_http_url};

static ATTR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:src|href)\s*=\s*["']([^"']+)["']"#).expect("attribute pattern is valid")
});

static CSS_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*['"]?([^'")]+)['"]?\s*\)"#).expect("css url pattern is valid")
});

/// Schemes rejected on the raw value, before resolution
const REJECTED_PREFIXES: &[&str] = &["data:", "mailto:", "tel:"];

/// Find every capturable asset referenced directly by `html`
///
/// Results are deduplicated by absolute URL and sorted by it, so the same
/// page always yields the same list.
#[must_use]
pub fn scan_asset_references(html: &str, base: &Url) -> Vec<DiscoveredAsset> {
    let mut found: BTreeMap<String, (Url, BTreeSet<String>)> = BTreeMap::new();

    for pattern in [&*ATTR_PATTERN, &*CSS_URL_PATTERN] {
        for caps in pattern.captures_iter(html) {
            let Some(m) = caps.get(1) else { continue };
            let raw = m.as_str().trim();
            let Some(url) = resolve_reference(raw, base) else {
                continue;
            };
            if !has_asset_extension(&url) {
                continue;
            }
            found
                .entry(url.to_string())
                .or_insert_with(|| (url, BTreeSet::new()))
                .1
                .insert(raw.to_string());
        }
    }

    found
        .into_values()
        .map(|(url, spellings)| DiscoveredAsset {
            url,
            spellings: spellings.into_iter().collect(),
        })
        .collect()
}

/// Resolve a raw reference against the page URL, keeping only `http(s)`
fn resolve_reference(raw: &str, base: &Url) -> Option<Url> {
    if raw.is_empty() {
        return None;
    }
    if REJECTED_PREFIXES
        .iter()
        .any(|prefix| starts_with_ignore_case(raw, prefix))
    {
        return None;
    }

    // Attribute values carry HTML escaping (`&amp;` in query strings)
    let decoded = html_escape::decode_html_entities(raw);
    let mut url = base.join(decoded.trim()).ok()?;
    if !is_http_url(&url) {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Extension of the last path segment is in the allow-list
fn has_asset_extension(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ASSET_EXTENSIONS.contains(&ext.as_str())
        })
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
