//! Display properties: height, vertical offset, style and content margin.

use std::fmt;

use serde::{Serialize, Serializer};

use super::header::{parsed_override, text_override};
use crate::config::{BannerSettings, BannerStyle};
use crate::frontmatter::{Frontmatter, FrontmatterValue, format_number};
use crate::render::SurfaceKind;

/// Vertical focus of the banner image, as a percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct VerticalOffset(f64);

impl VerticalOffset {
    /// The image centered vertically.
    pub const CENTER: Self = Self(50.0);

    /// Creates an offset, clamping into range. `NaN` becomes the center.
    #[must_use]
    pub fn new(percent: f64) -> Self {
        if percent.is_nan() { Self::CENTER } else { Self(percent.clamp(0.0, 100.0)) }
    }

    /// Percentage value.
    #[must_use]
    pub const fn percent(self) -> f64 { self.0 }

    /// Parses `"<n>%"` or `"<n>"`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let number = s.strip_suffix('%').unwrap_or(s).trim();
        number.parse::<f64>().ok().filter(|n| n.is_finite()).map(Self::new)
    }

    /// Reads an offset from a front-matter value (number or string).
    #[must_use]
    pub fn from_value(value: &FrontmatterValue) -> Option<Self> {
        match value {
            FrontmatterValue::String(s) => Self::parse(s),
            _ => value.as_f64().map(Self::new),
        }
    }
}

impl Default for VerticalOffset {
    fn default() -> Self { Self::CENTER }
}

/// Written form, `"<n>%"`.
impl fmt::Display for VerticalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", format_number(self.0))
    }
}

impl Serialize for VerticalOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Non-header presentation of a banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProps {
    pub height: String,
    pub initial_y: VerticalOffset,
    pub style: BannerStyle,
    pub content_margin: f64,
    /// Front-matter key that drags are saved to.
    pub position_property: String,
}

/// Resolves the display properties of a banner on a given surface.
///
/// Height: embeds and popovers use `<base>_height` then the embed height;
/// mobile uses `<base>_mobile_height` then the mobile default; desktop uses
/// `<base>_height` then the default height.
#[must_use]
pub fn resolve_display_props(
    frontmatter: &Frontmatter,
    settings: &BannerSettings,
    kind: SurfaceKind,
    is_mobile: bool,
) -> DisplayProps {
    let (height_key, default_height) = if kind.is_embedded() {
        ("height", &settings.embed_banner_height)
    } else if is_mobile {
        ("mobile_height", &settings.default_banner_mobile_height)
    } else {
        ("height", &settings.default_banner_height)
    };

    let height_property = settings.property(height_key);
    let height = frontmatter
        .get(&height_property)
        .and_then(FrontmatterValue::as_f64)
        .map(|n| format!("{}px", format_number(n)))
        .or_else(|| text_override(frontmatter, &height_property))
        .unwrap_or_else(|| default_height.clone());

    let position_property = settings.property("y");
    let initial_y = frontmatter
        .get(&position_property)
        .and_then(VerticalOffset::from_value)
        .unwrap_or(VerticalOffset::CENTER);

    let style =
        parsed_override(frontmatter, &settings.property("style")).unwrap_or(settings.banner_style);

    let content_margin = match frontmatter.get(&settings.property("content_margin")) {
        Some(FrontmatterValue::String(s)) => parse_margin(s).unwrap_or(settings.content_margin),
        Some(value) => value.as_f64().unwrap_or(settings.content_margin),
        None => settings.content_margin,
    };

    DisplayProps { height, initial_y, style, content_margin, position_property }
}

fn parse_margin(s: &str) -> Option<f64> {
    let s = s.trim();
    s.strip_suffix("px").unwrap_or(s).trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Frontmatter { Frontmatter::from_yaml(serde_yaml::from_str(src).unwrap()) }

    #[test]
    fn test_offset_parse_forms() {
        assert_eq!(VerticalOffset::parse("30%"), Some(VerticalOffset::new(30.0)));
        assert_eq!(VerticalOffset::parse(" 12.5 "), Some(VerticalOffset::new(12.5)));
        assert_eq!(VerticalOffset::parse("150%"), Some(VerticalOffset::new(100.0)));
        assert_eq!(VerticalOffset::parse("-4"), Some(VerticalOffset::new(0.0)));
        assert_eq!(VerticalOffset::parse("top"), None);
        assert_eq!(VerticalOffset::parse("NaN"), None);
    }

    #[test]
    fn test_offset_written_form_reads_back() {
        for percent in [0.0, 33.333_333_333_333_336, 50.0, 72.25, 100.0] {
            let offset = VerticalOffset::new(percent);
            let written = offset.to_string();
            assert!(written.ends_with('%'));
            assert_eq!(VerticalOffset::parse(&written), Some(offset));
        }
        assert_eq!(VerticalOffset::new(40.0).to_string(), "40%");
    }

    #[test]
    fn test_offset_from_value() {
        assert_eq!(
            VerticalOffset::from_value(&FrontmatterValue::from(20_i64)),
            Some(VerticalOffset::new(20.0))
        );
        assert_eq!(VerticalOffset::from_value(&FrontmatterValue::Bool(true)), None);
        assert_eq!(VerticalOffset::new(f64::NAN), VerticalOffset::CENTER);
    }

    #[test]
    fn test_defaults() {
        let props = resolve_display_props(&Frontmatter::new(), &BannerSettings::default(), SurfaceKind::Pane, false);
        assert_eq!(props.height, "200px");
        assert_eq!(props.initial_y, VerticalOffset::CENTER);
        assert_eq!(props.style, BannerStyle::Solid);
        assert!(props.content_margin.abs() < f64::EPSILON);
        assert_eq!(props.position_property, "banner_y");
    }

    #[test]
    fn test_height_by_surface() {
        let fm = yaml("banner_height: 320px\nbanner_mobile_height: 90px\n");
        let settings = BannerSettings::default();
        assert_eq!(resolve_display_props(&fm, &settings, SurfaceKind::Pane, false).height, "320px");
        assert_eq!(resolve_display_props(&fm, &settings, SurfaceKind::Pane, true).height, "90px");
        assert_eq!(resolve_display_props(&fm, &settings, SurfaceKind::Embed, true).height, "320px");

        let empty = Frontmatter::new();
        assert_eq!(resolve_display_props(&empty, &settings, SurfaceKind::Pane, true).height, "150px");
        assert_eq!(resolve_display_props(&empty, &settings, SurfaceKind::Popover, false).height, "120px");
    }

    #[test]
    fn test_numeric_height_gets_pixels() {
        let fm = yaml("banner_height: 250\n");
        let props = resolve_display_props(&fm, &BannerSettings::default(), SurfaceKind::Pane, false);
        assert_eq!(props.height, "250px");
    }

    #[test]
    fn test_overrides() {
        let fm = yaml("banner_y: '25%'\nbanner_style: swoosh-inverted\nbanner_content_margin: 16px\n");
        let props = resolve_display_props(&fm, &BannerSettings::default(), SurfaceKind::Pane, false);
        assert_eq!(props.initial_y, VerticalOffset::new(25.0));
        assert_eq!(props.style, BannerStyle::SwooshInverted);
        assert!((props.content_margin - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_overrides_use_settings() {
        let mut settings = BannerSettings::default();
        settings.banner_style = BannerStyle::Blur;
        settings.content_margin = 8.0;
        let fm = yaml("banner_y: middle\nbanner_style: neon\nbanner_content_margin: lots\n");
        let props = resolve_display_props(&fm, &settings, SurfaceKind::Pane, false);
        assert_eq!(props.initial_y, VerticalOffset::CENTER);
        assert_eq!(props.style, BannerStyle::Blur);
        assert!((props.content_margin - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_offset_serializes_as_written_form() {
        let json = serde_json::to_string(&VerticalOffset::new(12.0)).unwrap();
        assert_eq!(json, "\"12%\"");
    }
}
