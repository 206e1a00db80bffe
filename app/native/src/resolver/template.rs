//! Header template substitution.
//!
//! Replaces `{{name}}` placeholders with note metadata. Values may themselves
//! contain placeholders, so substitution runs in passes, at most
//! [`MAX_ITERATIONS`] of them, and the text never grows past
//! [`MAX_TEMPLATE_LEN`] bytes.
//!
//! Lookup for a name:
//! - `filename` and `title` give the note's base name
//! - any other name reads the front-matter property (scalars stringified,
//!   lists joined with `", "`)
//! - otherwise the `headerTitleFallback` property, then the base name

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::BannerSettings;
use crate::constants::template::{MAX_ITERATIONS, MAX_TEMPLATE_LEN};
use crate::frontmatter::{Frontmatter, FrontmatterValue};
use crate::host::NotePath;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\{\{(.*?)\}\}").unwrap()
});

/// Result of expanding a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub text: String,
    /// Expansion stopped early: the pass limit was hit with placeholders left,
    /// or the text reached the length limit.
    pub truncated: bool,
}

/// Expands every placeholder in `template`.
#[must_use]
pub fn substitute(
    template: &str,
    note: &NotePath,
    frontmatter: &Frontmatter,
    settings: &BannerSettings,
) -> Substitution {
    let mut text = clip(template.to_string());
    let mut passes = 0;
    let mut over_budget = text.len() < template.len();

    while !over_budget && passes < MAX_ITERATIONS && PLACEHOLDER.is_match(&text) {
        let (expanded, full) = expand_pass(&text, note, frontmatter, settings);
        text = expanded;
        over_budget = full;
        passes += 1;
    }

    if over_budget {
        tracing::warn!(
            note = %note,
            passes,
            limit = MAX_TEMPLATE_LEN,
            "header template expanded past the length limit, using partial text"
        );
    } else if PLACEHOLDER.is_match(&text) {
        tracing::warn!(
            note = %note,
            passes,
            template,
            "header template hit the substitution limit, using partial text"
        );
    }

    let truncated = over_budget || PLACEHOLDER.is_match(&text);
    Substitution { text, truncated }
}

/// Replaces every placeholder in `text` once.
///
/// Stops as soon as the output passes [`MAX_TEMPLATE_LEN`] and returns it
/// clipped, with the flag set.
fn expand_pass(
    text: &str,
    note: &NotePath,
    frontmatter: &Frontmatter,
    settings: &BannerSettings,
) -> (String, bool) {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&lookup(name.as_str(), note, frontmatter, settings));
        if out.len() > MAX_TEMPLATE_LEN {
            return (clip(out), true);
        }
        last = whole.end();
    }

    out.push_str(&text[last..]);
    let full = out.len() > MAX_TEMPLATE_LEN;
    (clip(out), full)
}

/// Cuts `text` down to [`MAX_TEMPLATE_LEN`] bytes on a character boundary.
fn clip(mut text: String) -> String {
    if text.len() > MAX_TEMPLATE_LEN {
        let mut end = MAX_TEMPLATE_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

fn lookup<'a>(
    name: &str,
    note: &'a NotePath,
    frontmatter: &'a Frontmatter,
    settings: &BannerSettings,
) -> Cow<'a, str> {
    let name = name.trim();
    if matches!(name, "filename" | "title") {
        return Cow::Borrowed(note.basename());
    }

    frontmatter
        .get(name)
        .and_then(render)
        .or_else(|| frontmatter.get(settings.header_title_fallback.trim()).and_then(render))
        .unwrap_or(Cow::Borrowed(note.basename()))
}

/// Renders a property value as text; `None` for values with no text form.
fn render(value: &FrontmatterValue) -> Option<Cow<'_, str>> {
    match value {
        FrontmatterValue::String(s) => Some(Cow::Borrowed(s)),
        FrontmatterValue::Number(_) | FrontmatterValue::Bool(_) => value.scalar_text().map(Cow::Owned),
        FrontmatterValue::List(items) => {
            let parts: Vec<String> = items.iter().filter_map(FrontmatterValue::scalar_text).collect();
            (!parts.is_empty()).then(|| Cow::Owned(parts.join(", ")))
        }
        FrontmatterValue::Null | FrontmatterValue::Map(_) => None,
    }
}
