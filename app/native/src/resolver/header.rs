//! Header overlay resolution.

use std::str::FromStr;

use serde::Serialize;

use super::template::substitute;
use crate::config::{BannerSettings, HeaderDecor, HorizontalAlign, VerticalAlign};
use crate::frontmatter::{Frontmatter, FrontmatterValue, is_suppression};
use crate::host::NotePath;

/// Header text and icon drawn over the banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderDescriptor {
    pub text: Option<String>,
    pub icon: Option<String>,
    pub h_align: HorizontalAlign,
    pub v_align: VerticalAlign,
    pub decor: HeaderDecor,
    pub title_size: String,
    pub icon_size: String,
}

/// Resolves the header overlay for a note.
///
/// Text and icon: a present override hides the field when it is `false`,
/// `none` or empty; an absent override uses the global default only when its
/// show toggle is on. The other fields take a valid override, else the global
/// setting.
#[must_use]
pub fn resolve_header(
    note: &NotePath,
    frontmatter: &Frontmatter,
    settings: &BannerSettings,
) -> HeaderDescriptor {
    let text = toggled_field(
        frontmatter.get(&settings.property("header")),
        settings.show_default_header_text,
        &settings.default_header_text,
    )
    .map(|template| substitute(&template, note, frontmatter, settings).text);

    let icon = toggled_field(
        frontmatter.get(&settings.property("icon")),
        settings.show_default_header_icon,
        &settings.default_header_icon,
    );

    HeaderDescriptor {
        text,
        icon,
        h_align: parsed_override(frontmatter, &settings.property("header_h_align"))
            .unwrap_or(settings.header_horizontal_align),
        v_align: parsed_override(frontmatter, &settings.property("header_v_align"))
            .unwrap_or(settings.header_vertical_align),
        decor: parsed_override(frontmatter, &settings.property("header_decor"))
            .unwrap_or(settings.header_decor),
        title_size: text_override(frontmatter, &settings.property("header_title_size"))
            .unwrap_or_else(|| settings.header_title_size.clone()),
        icon_size: text_override(frontmatter, &settings.property("header_icon_size"))
            .unwrap_or_else(|| settings.header_icon_size.clone()),
    }
}

fn toggled_field(value: Option<&FrontmatterValue>, show_default: bool, default: &str) -> Option<String> {
    let text = match value {
        Some(value) if value.is_falsy() => None,
        Some(value) => value.scalar_text().filter(|s| !is_suppression(s)),
        None => show_default.then(|| default.to_string()),
    };
    text.filter(|s| !s.trim().is_empty())
}

/// Non-empty scalar override, as text.
pub(super) fn text_override(frontmatter: &Frontmatter, key: &str) -> Option<String> {
    frontmatter.get(key).and_then(FrontmatterValue::scalar_text).filter(|s| !s.trim().is_empty())
}

/// Override parsed into an enumeration; invalid values are ignored.
pub(super) fn parsed_override<T: FromStr>(frontmatter: &Frontmatter, key: &str) -> Option<T> {
    let raw = frontmatter.get_str(key)?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        tracing::debug!(key, value = raw, "ignoring invalid override");
    }
    parsed
}
