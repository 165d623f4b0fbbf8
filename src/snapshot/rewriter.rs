//! Rewrites asset references in captured HTML to local relative paths.
//!
//! Absolute URL strings are replaced first, longest first, so a URL that is a
//! prefix of another never gets substituted inside the longer one. A match is
//! also skipped when the character after it would continue the URL (a longer,
//! unfetched URL sharing the prefix). Relative spellings are then replaced
//! only inside quote or parenthesis delimiters (whitespace allowed inside
//! an unquoted CSS `url( ... )`).

use regex::{NoExpand, Regex};

use super::types::AssetReplacement;

/// Quote pairs that delimit a reference in markup or CSS
const QUOTES: &[(char, char)] = &[('"', '"'), ('\'', '\'')];

/// Apply all replacements to `html`
#[must_use]
pub fn rewrite_references(html: &str, replacements: &[AssetReplacement]) -> String {
    let mut ordered: Vec<&AssetReplacement> = replacements.iter().collect();
    ordered.sort_by(|a, b| {
        b.original
            .len()
            .cmp(&a.original.len())
            .then_with(|| a.original.cmp(&b.original))
    });

    let mut out = html.to_string();
    for replacement in &ordered {
        if out.contains(&replacement.original) {
            out = replace_bounded(&out, &replacement.original, &replacement.local_path);
        }
    }

    let mut relative: Vec<(&str, String)> = ordered
        .iter()
        .flat_map(|r| {
            r.spellings
                .iter()
                .filter(|s| **s != r.original && !s.is_empty())
                .map(|s| (s.as_str(), format!("{}{}", r.local_path, fragment_of(s))))
        })
        .collect();
    relative.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    for (spelling, target) in relative {
        for (open, close) in QUOTES {
            let needle = format!("{open}{spelling}{close}");
            if out.contains(&needle) {
                out = out.replace(&needle, &format!("{open}{target}{close}"));
            }
        }
        if out.contains(spelling) {
            out = replace_in_parens(&out, spelling, &target);
        }
    }

    out
}

/// Replace `( spelling )` with `(target)`, tolerating whitespace inside the parens
fn replace_in_parens(haystack: &str, spelling: &str, target: &str) -> String {
    let pattern = format!(r"\(\s*{}\s*\)", regex::escape(spelling));
    match Regex::new(&pattern) {
        Ok(re) => re
            .replace_all(haystack, NoExpand(&format!("({target})")))
            .into_owned(),
        Err(e) => {
            log::debug!("Skipping parenthesized rewrite of {spelling:?}: {e}");
            haystack.to_string()
        }
    }
}

/// Replace `needle` unless the match is immediately followed by a URL character
fn replace_bounded(haystack: &str, needle: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (idx, _) in haystack.match_indices(needle) {
        let end = idx + needle.len();
        if haystack[end..].chars().next().is_some_and(continues_url) {
            continue;
        }
        out.push_str(&haystack[last..idx]);
        out.push_str(replacement);
        last = end;
    }
    out.push_str(&haystack[last..]);
    out
}

fn continues_url(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.' | '_' | '~' | '%' | '/' | '?' | '&' | '=' | '+' | '@' | ':' | '!' | '$' | '*'
        )
}

/// `#...` suffix of a raw reference, kept on the rewritten path
fn fragment_of(spelling: &str) -> &str {
    spelling.find('#').map_or("", |idx| &spelling[idx..])
}
