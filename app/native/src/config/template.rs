//! Settings template generation.
//!
//! Generates a commented settings template with all available options.

use std::fs;
use std::path::Path;

/// Generates a settings template with every option at its default value.
///
/// This creates a JSONC file documenting each option inline.
#[must_use]
pub fn generate_settings_template() -> String {
    r##"// Banners Settings File
// ======================
// This file uses JSONC format (JSON with comments).
// Every option below is set to its default value. Remove the ones you don't
// want to override; missing options fall back to their defaults.
{
  // ============================================================================
  // Banner source
  // ============================================================================
  // Show the default banner on notes that don't declare their own
  "enableBanners": true,

  // Vault path of the default banner image ("" = no default banner)
  "defaultBannerPath": "",

  // Front-matter key holding the banner. Per-note overrides are derived from
  // it: banner_y, banner_height, banner_style, banner_header, banner_icon, ...
  "frontmatterProperty": "banner",

  // Folder searched when listing banner images ("" = whole vault)
  "bannerFolder": "",

  // Tag rules, checked in order; the first match wins.
  // A rule also matches any "/" segment of nested tags ("project" matches "project/alpha").
  "tagBanners": [
    // { "tag": "project", "path": "banners/project.png" }
  ],

  // ============================================================================
  // Appearance
  // ============================================================================
  // Heights (any CSS length)
  "defaultBannerHeight": "200px",
  "defaultBannerMobileHeight": "150px",
  "embedBannerHeight": "120px",

  // Style: "solid", "gradient", "blur", "swoosh" or "swoosh-inverted"
  "bannerStyle": "solid",

  // Extra space between the banner and the note content (pixels)
  "contentMargin": 0,

  // ============================================================================
  // Header
  // ============================================================================
  "showDefaultHeaderText": true,
  "showDefaultHeaderIcon": true,

  // Header text template; {{property}} reads front-matter, {{filename}} the note name
  "defaultHeaderText": "{{title}}",

  // Property used when a placeholder has no value
  "headerTitleFallback": "title",

  "defaultHeaderIcon": "",

  // "left", "center" or "right"
  "headerHorizontalAlign": "left",

  // "top", "center", "bottom" or "edge"
  "headerVerticalAlign": "bottom",

  // "none", "shadow" or "border"
  "headerDecor": "shadow",

  "headerTitleSize": "1.2em",
  "headerIconSize": "1.5em",

  // ============================================================================
  // Contexts
  // ============================================================================
  "showInEmbeds": true,
  "showInPopovers": true
}
"##
    .to_string()
}

/// Creates a settings file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_settings_file(path: &Path) -> Result<(), std::io::Error> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_settings_template())
}
