//! Banner value parsing.
//!
//! The banner property is written as `[[path]]`, but older notes carry plain
//! strings, remote URLs, or the nested-list shape some front-matter widgets
//! produce (`banner: [[path]]` unquoted parses as a list of lists).

use std::sync::LazyLock;

use regex::Regex;

use super::FrontmatterValue;

/// Matches `[[inner]]` and `![[inner]]`, capturing `inner`.
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?:!\[\[|\[\[)(.*?)(?:\]\])").unwrap()
});

/// Extracts the path carried by a banner value.
///
/// - strings: the inner path of a bracketed link, otherwise the whole string
/// - lists: the first string of the first nested list, or the first string item
///
/// The result is trimmed and may be empty. Other shapes return `None`.
#[must_use]
pub fn extract_link_path(value: &FrontmatterValue) -> Option<String> {
    match value {
        FrontmatterValue::String(s) => Some(strip_link(s)),
        FrontmatterValue::List(items) => match items.first()? {
            FrontmatterValue::List(inner) => inner.first()?.as_str().map(|s| s.trim().to_string()),
            FrontmatterValue::String(s) => Some(strip_link(s)),
            _ => None,
        },
        FrontmatterValue::Null
        | FrontmatterValue::Bool(_)
        | FrontmatterValue::Number(_)
        | FrontmatterValue::Map(_) => None,
    }
}

/// Returns the inner path of the first bracketed link in `s`, or `s` itself, trimmed.
fn strip_link(s: &str) -> String {
    WIKILINK
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|inner| !inner.is_empty())
        .unwrap_or_else(|| s.trim())
        .to_string()
}

/// Returns `true` for the literal sentinels that switch the banner off.
#[must_use]
pub fn is_suppression(path: &str) -> bool { path == "false" || path == "none" }

/// Returns `true` for absolute http(s) URLs.
#[must_use]
pub fn is_remote(path: &str) -> bool { path.starts_with("http://") || path.starts_with("https://") }

/// Canonical written form of a banner path.
#[must_use]
pub fn to_canonical_link(path: &str) -> String { format!("[[{path}]]") }
