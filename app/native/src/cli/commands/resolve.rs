//! `resolve` command: shows everything the banner component would receive.

use std::path::PathBuf;

use serde::Serialize;

use super::Context;
use crate::cli::output;
use crate::config::BannerSettings;
use crate::error::BannersError;
use crate::host::{HostError, MetadataSource, NotePath, Vault};
use crate::render::{BannerProps, SurfaceKind};
use crate::resolver::{
    BannerResolution, DisplayProps, HeaderDescriptor, ImageOutcome, resolve_banner,
    resolve_display_props, resolve_header, resolve_image_url,
};

/// Resolution of one note on one surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReport {
    pub note: NotePath,
    pub surface: SurfaceKind,
    pub resolution: BannerResolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageOutcome>,
    pub header: HeaderDescriptor,
    pub display: DisplayProps,
    /// Props the component would be mounted with, when a banner resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<BannerProps>,
}

/// Resolves a note the same way the lifecycle controller does before mounting.
#[must_use]
pub fn build_report<M: MetadataSource + ?Sized>(
    host: &M,
    note: &NotePath,
    settings: &BannerSettings,
    surface: SurfaceKind,
    is_mobile: bool,
) -> ResolveReport {
    let frontmatter = host.frontmatter(note);
    let resolution = resolve_banner(note, &frontmatter, settings, host);
    let image = resolution.resolved().map(|banner| resolve_image_url(banner, host));
    let header = resolve_header(note, &frontmatter, settings);
    let display = resolve_display_props(&frontmatter, settings, surface, is_mobile);
    let props = image.clone().map(|image| BannerProps::new(image, header.clone(), &display, surface));

    ResolveReport { note: note.clone(), surface, resolution, image, header, display, props }
}

/// Execute the `resolve` command.
///
/// # Errors
///
/// Returns an error if the note is outside the vault or does not exist.
pub fn execute(
    ctx: &Context,
    note: &str,
    surface: SurfaceKind,
    is_mobile: bool,
    compact: bool,
) -> Result<(), BannersError> {
    let note = note_path(&ctx.vault, note)?;
    let report = build_report(&ctx.vault, &note, &ctx.settings.snapshot(), surface, is_mobile);

    if compact {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        output::print_highlighted_json(&serde_json::to_value(&report)?);
    }
    Ok(())
}

/// Turns a command-line note argument into a vault-relative path.
fn note_path(vault: &Vault, arg: &str) -> Result<NotePath, BannersError> {
    let path = super::expand_path(arg);

    let relative = if path.is_absolute() {
        let path = path.canonicalize().unwrap_or(path);
        path.strip_prefix(vault.root()).map(PathBuf::from).map_err(|_| {
            BannersError::InvalidArguments(format!(
                "{} is outside the vault {}",
                path.display(),
                vault.root().display()
            ))
        })?
    } else {
        path
    };

    let note = NotePath::new(relative.to_string_lossy().trim_start_matches("./"));
    if !vault.file_exists(note.as_str()) {
        return Err(HostError::NoteNotFound(note.to_string()).into());
    }
    Ok(note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::BannerOrigin;
    use crate::test_support::MemoryHost;

    #[test]
    fn test_report_for_explicit_banner() {
        let host = MemoryHost::new();
        host.add_file("img/a.png");
        host.add_note("a.md", "banner: '[[img/a.png]]'\nbanner_y: 30%\n");

        let report = build_report(
            &host,
            &NotePath::new("a.md"),
            &BannerSettings::default(),
            SurfaceKind::Pane,
            false,
        );

        let banner = report.resolution.resolved().unwrap();
        assert_eq!(banner.origin, BannerOrigin::Frontmatter);
        assert_eq!(report.image.as_ref().and_then(ImageOutcome::url), Some("app://vault/img/a.png"));
        let props = report.props.unwrap();
        assert!(props.draggable);
        assert_eq!(props.initial_y.percent(), 30.0);
    }

    #[test]
    fn test_report_without_banner_has_no_props() {
        let host = MemoryHost::new();
        host.add_note("a.md", "title: Plain\n");

        let report = build_report(
            &host,
            &NotePath::new("a.md"),
            &BannerSettings::default(),
            SurfaceKind::Popover,
            false,
        );

        assert_eq!(report.resolution, BannerResolution::NoBanner);
        assert!(report.image.is_none());
        assert!(report.props.is_none());
        assert_eq!(report.display.height, "120px");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["surface"], "popover");
        assert!(json.get("props").is_none());
    }

    #[test]
    fn test_note_path_accepts_relative_and_absolute() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Notes")).unwrap();
        std::fs::write(dir.path().join("Notes/a.md"), "# A\n").unwrap();
        let vault = Vault::open(dir.path()).unwrap();

        assert_eq!(note_path(&vault, "Notes/a.md").unwrap(), NotePath::new("Notes/a.md"));
        assert_eq!(note_path(&vault, "./Notes/a.md").unwrap(), NotePath::new("Notes/a.md"));

        let absolute = vault.root().join("Notes/a.md");
        assert_eq!(
            note_path(&vault, &absolute.to_string_lossy()).unwrap(),
            NotePath::new("Notes/a.md")
        );
    }

    #[test]
    fn test_note_path_rejects_missing_and_outside_notes() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::open(dir.path()).unwrap();

        assert!(matches!(note_path(&vault, "missing.md"), Err(BannersError::VaultError(_))));
        assert!(matches!(
            note_path(&vault, "/definitely/not/in/vault.md"),
            Err(BannersError::InvalidArguments(_))
        ));
    }
}
