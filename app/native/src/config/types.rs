//! Settings types for Banners.
//!
//! This module provides the settings record, its enumerations and loading
//! functionality. The settings file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//!
//! Every field carries `#[serde(default)]`, so older or partial files load by
//! merging with the defaults. A field with the wrong shape falls back to its
//! default instead of rejecting the whole file, and an invalid tag rule drops
//! only that rule.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::frontmatter::format_number;

/// Visual treatment of the banner image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum BannerStyle {
    /// Plain image. This is the default.
    #[default]
    Solid,
    /// Image fading into the page background.
    Gradient,
    /// Blurred lower edge.
    Blur,
    /// Curved lower edge.
    Swoosh,
    /// Curved lower edge, mirrored.
    SwooshInverted,
}

impl BannerStyle {
    /// Returns the persisted name of the style.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
            Self::Blur => "blur",
            Self::Swoosh => "swoosh",
            Self::SwooshInverted => "swoosh-inverted",
        }
    }
}

impl FromStr for BannerStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solid" => Ok(Self::Solid),
            "gradient" => Ok(Self::Gradient),
            "blur" => Ok(Self::Blur),
            "swoosh" => Ok(Self::Swoosh),
            "swoosh-inverted" => Ok(Self::SwooshInverted),
            _ => Err(format!("unknown banner style '{s}'")),
        }
    }
}

/// Horizontal placement of the header overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HorizontalAlign {
    /// Returns the persisted name of the alignment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl FromStr for HorizontalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(format!("unknown horizontal alignment '{s}'")),
        }
    }
}

/// Vertical placement of the header overlay.
///
/// `Edge` straddles the lower border of the banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    #[default]
    Bottom,
    Edge,
}

impl VerticalAlign {
    /// Returns the persisted name of the alignment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
            Self::Edge => "edge",
        }
    }
}

impl FromStr for VerticalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            "edge" => Ok(Self::Edge),
            _ => Err(format!("unknown vertical alignment '{s}'")),
        }
    }
}

/// Decoration drawn behind the header text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HeaderDecor {
    None,
    #[default]
    Shadow,
    Border,
}

impl HeaderDecor {
    /// Returns the persisted name of the decoration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Shadow => "shadow",
            Self::Border => "border",
        }
    }
}

impl FromStr for HeaderDecor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "shadow" => Ok(Self::Shadow),
            "border" => Ok(Self::Border),
            _ => Err(format!("unknown header decoration '{s}'")),
        }
    }
}

/// A tag → banner image rule.
///
/// Rules are evaluated in list order; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TagRule {
    /// Tag to match (case-insensitive, also matches `/`-separated segments).
    pub tag: String,

    /// Vault path of the banner image used for matching notes.
    pub path: String,
}

impl TagRule {
    /// Creates a new rule.
    #[must_use]
    pub fn new(tag: impl Into<String>, path: impl Into<String>) -> Self {
        Self { tag: tag.into(), path: path.into() }
    }

    /// Checks whether a note tag satisfies this rule.
    ///
    /// The whole tag and each `/`-separated segment are compared case-insensitively.
    /// A rule with an empty tag never matches.
    #[must_use]
    pub fn matches(&self, note_tag: &str) -> bool {
        let rule_tag = self.tag.trim();
        if rule_tag.is_empty() {
            return false;
        }

        std::iter::once(note_tag)
            .chain(note_tag.split('/'))
            .any(|part| part.to_lowercase() == rule_tag.to_lowercase())
    }
}

/// Deserializes a value, falling back to its default when the shape is wrong.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "invalid settings value, using default");
        T::default()
    }))
}

/// Deserializes tag rules one by one, dropping the ones that don't parse.
fn lenient_rules<'de, D>(deserializer: D) -> Result<Vec<TagRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        tracing::warn!("tagBanners is not a list, ignoring it");
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            serde_json::from_value(item)
                .inspect_err(|err| tracing::warn!(index, error = %err, "invalid tag rule dropped"))
                .ok()
        })
        .collect())
}

/// Accepts a CSS length string, or a bare number taken as pixels.
fn css_length<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(|n| format!("{}px", format_number(n)))
            .ok_or_else(|| serde::de::Error::custom("length out of range")),
        other => Err(serde::de::Error::custom(format!("expected a CSS length, found {other}"))),
    }
}

/// Root settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BannerSettings {
    /// Whether the global default banner is shown on notes without their own.
    /// Default: true
    pub enable_banners: bool,

    /// Vault path of the global default banner image.
    pub default_banner_path: String,

    /// Front-matter key holding the banner. Every per-note override key is
    /// derived from it (`banner_y`, `banner_header`, ...).
    /// Default: "banner"
    pub frontmatter_property: String,

    /// Banner height on desktop (CSS length, bare numbers are pixels).
    /// Default: "200px"
    #[serde(deserialize_with = "css_length")]
    #[schemars(with = "String")]
    pub default_banner_height: String,

    /// Banner height on mobile (CSS length).
    /// Default: "150px"
    #[serde(deserialize_with = "css_length")]
    #[schemars(with = "String")]
    pub default_banner_mobile_height: String,

    /// Banner height inside embeds and popovers (CSS length).
    /// Default: "120px"
    #[serde(deserialize_with = "css_length")]
    #[schemars(with = "String")]
    pub embed_banner_height: String,

    /// Visual style of the banner.
    #[serde(deserialize_with = "lenient")]
    #[schemars(with = "BannerStyle")]
    pub banner_style: BannerStyle,

    /// Extra space between the banner and the note content, in pixels.
    #[serde(deserialize_with = "lenient")]
    #[schemars(with = "f64")]
    pub content_margin: f64,

    /// Show the default header text on notes without a header override.
    /// Default: true
    pub show_default_header_text: bool,

    /// Show the default header icon on notes without an icon override.
    /// Default: true
    pub show_default_header_icon: bool,

    /// Default header icon (emoji or text).
    pub default_header_icon: String,

    /// Default header text template. Supports `{{property}}` placeholders.
    /// Default: "{{title}}"
    pub default_header_text: String,

    /// Horizontal alignment of the header.
    #[serde(deserialize_with = "lenient")]
    #[schemars(with = "HorizontalAlign")]
    pub header_horizontal_align: HorizontalAlign,

    /// Vertical alignment of the header.
    #[serde(deserialize_with = "lenient")]
    #[schemars(with = "VerticalAlign")]
    pub header_vertical_align: VerticalAlign,

    /// Decoration behind the header text.
    #[serde(deserialize_with = "lenient")]
    #[schemars(with = "HeaderDecor")]
    pub header_decor: HeaderDecor,

    /// Header title font size (CSS length).
    /// Default: "1.2em"
    #[serde(deserialize_with = "css_length")]
    #[schemars(with = "String")]
    pub header_title_size: String,

    /// Header icon font size (CSS length).
    /// Default: "1.5em"
    #[serde(deserialize_with = "css_length")]
    #[schemars(with = "String")]
    pub header_icon_size: String,

    /// Show banners inside transcluded embeds.
    /// Default: true
    pub show_in_embeds: bool,

    /// Show banners inside hover popovers.
    /// Default: true
    pub show_in_popovers: bool,

    /// Ordered tag → image rules.
    #[serde(deserialize_with = "lenient_rules")]
    #[schemars(with = "Vec<TagRule>")]
    pub tag_banners: Vec<TagRule>,

    /// Folder searched when picking banner images. Empty means the whole vault.
    pub banner_folder: String,

    /// Front-matter property used when a header placeholder has no value.
    /// Default: "title"
    pub header_title_fallback: String,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            enable_banners: true,
            default_banner_path: String::new(),
            frontmatter_property: "banner".to_string(),
            default_banner_height: "200px".to_string(),
            default_banner_mobile_height: "150px".to_string(),
            embed_banner_height: "120px".to_string(),
            banner_style: BannerStyle::Solid,
            content_margin: 0.0,
            show_default_header_text: true,
            show_default_header_icon: true,
            default_header_icon: String::new(),
            default_header_text: "{{title}}".to_string(),
            header_horizontal_align: HorizontalAlign::Left,
            header_vertical_align: VerticalAlign::Bottom,
            header_decor: HeaderDecor::Shadow,
            header_title_size: "1.2em".to_string(),
            header_icon_size: "1.5em".to_string(),
            show_in_embeds: true,
            show_in_popovers: true,
            tag_banners: Vec::new(),
            banner_folder: String::new(),
            header_title_fallback: "title".to_string(),
        }
    }
}

impl BannerSettings {
    /// Builds settings from a parsed JSON document.
    ///
    /// Fields that fail to deserialize keep their default and are logged;
    /// the rest of the document still applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let fields = match value {
            serde_json::Value::Object(fields) => fields,
            other => return serde_json::from_value(other),
        };
        if let Ok(settings) = serde_json::from_value(serde_json::Value::Object(fields.clone())) {
            return Ok(settings);
        }

        let mut accepted = serde_json::Value::Object(serde_json::Map::new());
        for (key, field) in fields {
            let mut candidate = accepted.clone();
            if let serde_json::Value::Object(map) = &mut candidate {
                map.insert(key.clone(), field);
            }
            match serde_json::from_value::<Self>(candidate.clone()) {
                Ok(_) => accepted = candidate,
                Err(err) => tracing::warn!(field = %key, error = %err, "invalid setting, using default"),
            }
        }
        serde_json::from_value(accepted)
    }

    /// Returns the derived front-matter key `<property>_<suffix>`.
    #[must_use]
    pub fn property(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.frontmatter_property)
    }

    /// Appends a tag rule.
    pub fn add_tag_rule(&mut self, rule: TagRule) { self.tag_banners.push(rule); }

    /// Removes the rule at `index`.
    pub fn remove_tag_rule(&mut self, index: usize) -> Option<TagRule> {
        (index < self.tag_banners.len()).then(|| self.tag_banners.remove(index))
    }

    /// Moves the rule at `from` so it ends up at position `to`.
    ///
    /// Returns `false` if either index is out of range.
    pub fn move_tag_rule(&mut self, from: usize, to: usize) -> bool {
        let len = self.tag_banners.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let rule = self.tag_banners.remove(from);
            self.tag_banners.insert(to, rule);
        }
        true
    }

    /// Returns the trimmed banner folder, or `None` for the whole vault.
    #[must_use]
    pub fn banner_folder(&self) -> Option<&str> {
        let folder = self.banner_folder.trim().trim_end_matches('/');
        (!folder.is_empty()).then_some(folder)
    }
}

/// Errors that can occur when loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No settings file was found in any of the expected locations.
    #[error("No settings file found in any of the expected locations")]
    NotFound,
    /// The settings file exists but could not be read or written.
    #[error("Failed to access settings file: {0}")]
    IoError(#[from] std::io::Error),
    /// The settings file contains invalid JSON.
    #[error("Failed to parse settings file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Settings file names in priority order.
const SETTINGS_FILE_NAMES: &[&str] = &["settings.jsonc", "settings.json"];

/// Vault-local settings file names.
const VAULT_SETTINGS_FILE_NAMES: &[&str] = &[".banners.jsonc", ".banners.json"];

/// Returns the possible settings file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `<vault>/.banners.jsonc` when a vault is given
/// 2. `$XDG_CONFIG_HOME/banners/settings.jsonc`
/// 3. `~/.config/banners/settings.jsonc`
/// 4. the platform configuration directory (`dirs::config_dir()`)
#[must_use]
pub fn settings_paths(vault: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(vault) = vault {
        for filename in VAULT_SETTINGS_FILE_NAMES {
            paths.push(vault.join(filename));
        }
    }

    let mut push_dir = |dir: PathBuf| {
        for filename in SETTINGS_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(PathBuf::from(xdg_config).join("banners"));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join("banners"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join("banners"));
    }

    paths
}

/// Loads settings from the first available settings file.
///
/// # Errors
///
/// Returns `SettingsError::NotFound` if no settings file exists in any of the expected locations.
/// Returns `SettingsError::IoError` if a settings file exists but could not be read.
/// Returns `SettingsError::ParseError` if the settings file contains invalid JSON.
pub fn load_settings(vault: Option<&Path>) -> Result<(BannerSettings, PathBuf), SettingsError> {
    for path in settings_paths(vault) {
        if path.exists() {
            let settings = load_settings_from_path(&path)?;
            return Ok((settings, path));
        }
    }

    Err(SettingsError::NotFound)
}

/// Loads settings from a specific file.
///
/// # Errors
///
/// Returns `SettingsError::NotFound` if the file does not exist, `IoError` if it
/// cannot be read, and `ParseError` if it is not valid JSONC.
pub fn load_settings_from_path(path: &Path) -> Result<BannerSettings, SettingsError> {
    if !path.exists() {
        return Err(SettingsError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    Ok(BannerSettings::from_json_value(value)?)
}

/// Writes settings as pretty JSON, replacing the file atomically.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_settings(path: &Path, settings: &BannerSettings) -> Result<(), SettingsError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(settings)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, json.as_bytes())?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
