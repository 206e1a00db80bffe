//! Banner source resolution.
//!
//! Precedence, highest first:
//! 1. the note's own banner property (`false`/`none` switch the banner off)
//! 2. the first tag rule matching one of the note's tags
//! 3. the global default banner, when banners are enabled
//!
//! An explicit value that is empty after trimming counts as no override and
//! falls through to the tag rules.

use serde::Serialize;

use crate::config::BannerSettings;
use crate::frontmatter::{Frontmatter, FrontmatterValue, extract_link_path, is_remote, is_suppression};
use crate::host::{MetadataSource, NotePath};

/// Where the banner image lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Absolute http(s) URL, loaded as-is.
    Remote,
    /// File inside the vault.
    Vault,
}

/// Which precedence level produced the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BannerOrigin {
    /// The note's own banner property.
    Frontmatter,
    /// The tag rule at `index`.
    TagRule { index: usize },
    /// The global default banner.
    Default,
}

/// A resolved banner source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBanner {
    pub kind: SourceKind,
    /// The path as written, or the resolved vault path for explicit links.
    pub path: String,
    /// The vault file the path resolved to, if any.
    pub file: Option<NotePath>,
    pub origin: BannerOrigin,
}

/// Outcome of banner resolution for a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum BannerResolution {
    /// Nothing to show.
    NoBanner,
    /// A banner source was selected.
    Resolved(ResolvedBanner),
}

impl BannerResolution {
    /// Returns the resolved banner, if any.
    #[must_use]
    pub const fn resolved(&self) -> Option<&ResolvedBanner> {
        match self {
            Self::NoBanner => None,
            Self::Resolved(banner) => Some(banner),
        }
    }
}

/// Reading of the note's own banner property.
enum Override {
    /// `false`/`none`: no banner at all.
    Suppress,
    /// A usable path.
    Path(String),
    /// Absent, empty or of an unusable shape.
    Absent,
}

fn explicit_override(value: &FrontmatterValue) -> Override {
    if matches!(value, FrontmatterValue::Bool(false)) {
        return Override::Suppress;
    }
    match extract_link_path(value) {
        Some(path) if is_suppression(&path) => Override::Suppress,
        Some(path) if !path.is_empty() => Override::Path(path),
        _ => Override::Absent,
    }
}

/// Resolves which banner, if any, a note shows.
///
/// Pure given the metadata snapshot; `links` is only used for link lookup.
#[must_use]
pub fn resolve_banner<M: MetadataSource + ?Sized>(
    note: &NotePath,
    frontmatter: &Frontmatter,
    settings: &BannerSettings,
    links: &M,
) -> BannerResolution {
    if let Some(value) = frontmatter.get(&settings.frontmatter_property) {
        match explicit_override(value) {
            Override::Suppress => return BannerResolution::NoBanner,
            Override::Path(path) => {
                if is_remote(&path) {
                    return remote(path, BannerOrigin::Frontmatter);
                }
                let file = links.resolve_link(&path, note);
                let path = file.as_ref().map_or(path, ToString::to_string);
                return BannerResolution::Resolved(ResolvedBanner {
                    kind: SourceKind::Vault,
                    path,
                    file,
                    origin: BannerOrigin::Frontmatter,
                });
            }
            Override::Absent => {}
        }
    }

    let tags = frontmatter.tags();
    if !tags.is_empty() {
        let matched = settings
            .tag_banners
            .iter()
            .enumerate()
            .find(|(_, rule)| tags.iter().any(|tag| rule.matches(tag)));
        if let Some((index, rule)) = matched {
            return configured(&rule.path, BannerOrigin::TagRule { index }, note, links);
        }
    }

    if settings.enable_banners && !settings.default_banner_path.trim().is_empty() {
        return configured(&settings.default_banner_path, BannerOrigin::Default, note, links);
    }

    BannerResolution::NoBanner
}

fn remote(path: String, origin: BannerOrigin) -> BannerResolution {
    BannerResolution::Resolved(ResolvedBanner { kind: SourceKind::Remote, path, file: None, origin })
}

/// A path from the settings; kept as written so errors name what was configured.
fn configured<M: MetadataSource + ?Sized>(
    path: &str,
    origin: BannerOrigin,
    note: &NotePath,
    links: &M,
) -> BannerResolution {
    let path = path.trim().to_string();
    if is_remote(&path) {
        return remote(path, origin);
    }
    let file = links.resolve_link(&path, note);
    BannerResolution::Resolved(ResolvedBanner { kind: SourceKind::Vault, path, file, origin })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagRule;
    use crate::test_support::MemoryHost;

    fn host() -> MemoryHost {
        let host = MemoryHost::new();
        host.add_file("img/sky.png");
        host.add_file("img/project.png");
        host.add_file("img/default.png");
        host
    }

    fn yaml(src: &str) -> Frontmatter { Frontmatter::from_yaml(serde_yaml::from_str(src).unwrap()) }

    fn settings_with_rules(rules: &[(&str, &str)]) -> BannerSettings {
        let mut settings = BannerSettings::default();
        for (tag, path) in rules {
            settings.add_tag_rule(TagRule::new(*tag, *path));
        }
        settings
    }

    fn resolved_path(resolution: &BannerResolution) -> Option<&str> {
        resolution.resolved().map(|r| r.path.as_str())
    }

    #[test]
    fn test_explicit_link_wins() {
        let host = host();
        let note = NotePath::new("n.md");
        let fm = yaml("banner: '[[sky.png]]'\ntags: [project]\n");
        let settings = settings_with_rules(&[("project", "img/project.png")]);

        let resolution = resolve_banner(&note, &fm, &settings, &host);
        let banner = resolution.resolved().unwrap();
        assert_eq!(banner.path, "img/sky.png");
        assert_eq!(banner.file, Some(NotePath::new("img/sky.png")));
        assert_eq!(banner.origin, BannerOrigin::Frontmatter);
        assert_eq!(banner.kind, SourceKind::Vault);
    }

    #[test]
    fn test_suppression_is_absolute() {
        let host = host();
        let note = NotePath::new("n.md");
        let mut settings = settings_with_rules(&[("project", "img/project.png")]);
        settings.default_banner_path = "img/default.png".to_string();

        for src in [
            "banner: 'false'\ntags: [project]\n",
            "banner: none\ntags: [project]\n",
            "banner: false\ntags: [project]\n",
            "banner: '[[none]]'\n",
            "banner: [['none']]\n",
        ] {
            let resolution = resolve_banner(&note, &yaml(src), &settings, &host);
            assert_eq!(resolution, BannerResolution::NoBanner, "{src}");
        }
    }

    #[test]
    fn test_suppression_is_case_sensitive() {
        let host = host();
        let resolution =
            resolve_banner(&NotePath::new("n.md"), &yaml("banner: 'None'\n"), &BannerSettings::default(), &host);
        assert_eq!(resolved_path(&resolution), Some("None"));
    }

    #[test]
    fn test_empty_value_falls_through() {
        let host = host();
        let note = NotePath::new("n.md");
        let settings = settings_with_rules(&[("project", "img/project.png")]);

        for src in ["banner: ''\ntags: [project]\n", "banner: '   '\ntags: [project]\n", "banner:\ntags: [project]\n"] {
            let resolution = resolve_banner(&note, &yaml(src), &settings, &host);
            assert_eq!(resolved_path(&resolution), Some("img/project.png"), "{src}");
        }
    }

    #[test]
    fn test_remote_url_bypasses_vault() {
        let host = host();
        let fm = yaml("banner: https://example.com/a.jpg\n");
        let resolution = resolve_banner(&NotePath::new("n.md"), &fm, &BannerSettings::default(), &host);
        let banner = resolution.resolved().unwrap();
        assert_eq!(banner.kind, SourceKind::Remote);
        assert_eq!(banner.path, "https://example.com/a.jpg");
        assert_eq!(banner.file, None);
    }

    #[test]
    fn test_nested_list_shape() {
        let host = host();
        let fm = yaml("banner: [[img/sky.png]]\n");
        let resolution = resolve_banner(&NotePath::new("n.md"), &fm, &BannerSettings::default(), &host);
        assert_eq!(resolved_path(&resolution), Some("img/sky.png"));
    }

    #[test]
    fn test_unresolved_path_keeps_raw_value() {
        let host = host();
        let fm = yaml("banner: missing/pic.png\n");
        let resolution = resolve_banner(&NotePath::new("n.md"), &fm, &BannerSettings::default(), &host);
        let banner = resolution.resolved().unwrap();
        assert_eq!(banner.path, "missing/pic.png");
        assert_eq!(banner.file, None);
    }

    #[test]
    fn test_first_matching_rule_wins_and_reorder_changes_it() {
        let host = host();
        let note = NotePath::new("n.md");
        let fm = yaml("tags: [work, project/alpha]\n");
        let mut settings = settings_with_rules(&[
            ("unrelated", "img/sky.png"),
            ("work", "img/default.png"),
            ("alpha", "img/project.png"),
        ]);

        let before = resolve_banner(&note, &fm, &settings, &host);
        assert_eq!(resolved_path(&before), Some("img/default.png"));
        assert_eq!(before.resolved().unwrap().origin, BannerOrigin::TagRule { index: 1 });

        assert!(settings.move_tag_rule(2, 0));
        let after = resolve_banner(&note, &fm, &settings, &host);
        assert_eq!(resolved_path(&after), Some("img/project.png"));
        assert_eq!(after.resolved().unwrap().origin, BannerOrigin::TagRule { index: 0 });
    }

    #[test]
    fn test_hierarchical_tag_matching() {
        let host = host();
        let note = NotePath::new("n.md");
        let fm = yaml("tags: ['#project/alpha']\n");

        for (rule, expected) in [("project", true), ("alpha", true), ("beta", false)] {
            let settings = settings_with_rules(&[(rule, "img/project.png")]);
            let resolution = resolve_banner(&note, &fm, &settings, &host);
            assert_eq!(resolution.resolved().is_some(), expected, "rule {rule}");
        }
    }

    #[test]
    fn test_empty_rule_tag_is_skipped() {
        let host = host();
        let fm = yaml("tags: [anything]\n");
        let settings = settings_with_rules(&[("", "img/sky.png")]);
        let resolution = resolve_banner(&NotePath::new("n.md"), &fm, &settings, &host);
        assert_eq!(resolution, BannerResolution::NoBanner);
    }

    #[test]
    fn test_default_banner_requires_enable_flag() {
        let host = host();
        let note = NotePath::new("n.md");
        let fm = Frontmatter::new();
        let mut settings = BannerSettings::default();
        settings.default_banner_path = "img/default.png".to_string();

        let resolution = resolve_banner(&note, &fm, &settings, &host);
        let banner = resolution.resolved().unwrap();
        assert_eq!(banner.origin, BannerOrigin::Default);
        assert_eq!(banner.file, Some(NotePath::new("img/default.png")));

        settings.enable_banners = false;
        assert_eq!(resolve_banner(&note, &fm, &settings, &host), BannerResolution::NoBanner);
    }

    #[test]
    fn test_empty_metadata_without_default_is_no_banner() {
        let host = host();
        let resolution =
            resolve_banner(&NotePath::new("n.md"), &Frontmatter::new(), &BannerSettings::default(), &host);
        assert_eq!(resolution, BannerResolution::NoBanner);
    }

    #[test]
    fn test_unusable_shapes_fall_through() {
        let host = host();
        let mut settings = BannerSettings::default();
        settings.default_banner_path = "img/default.png".to_string();
        for src in ["banner: 42\n", "banner: true\n", "banner: {a: b}\n", "banner: [[1]]\n"] {
            let resolution = resolve_banner(&NotePath::new("n.md"), &yaml(src), &settings, &host);
            assert_eq!(resolved_path(&resolution), Some("img/default.png"), "{src}");
        }
    }

    #[test]
    fn test_custom_property_name() {
        let host = host();
        let mut settings = BannerSettings::default();
        settings.frontmatter_property = "cover".to_string();
        let fm = yaml("banner: img/default.png\ncover: img/sky.png\n");
        let resolution = resolve_banner(&NotePath::new("n.md"), &fm, &settings, &host);
        assert_eq!(resolved_path(&resolution), Some("img/sky.png"));
    }
}
