//! Bulk conversion of banner values to the canonical `[[path]]` form.
//!
//! Older notes carry plain paths or the nested-list shape produced by
//! unquoted links. Conversion rewrites those in place and leaves remote URLs,
//! suppression sentinels and already-canonical values alone.

use serde::Serialize;

use crate::config::BannerSettings;
use crate::constants::conversion::CHUNK_SIZE;
use crate::frontmatter::{FrontmatterValue, extract_link_path, is_suppression, to_canonical_link};
use crate::host::{FrontmatterWriter, HostError, NotePath, Vault};

/// What happened to one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EntryStatus {
    /// The banner value was rewritten.
    Converted { value: String },
    /// The note could not be read or written.
    Failed { error: String },
}

/// A note touched by the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionEntry {
    pub path: NotePath,
    #[serde(flatten)]
    pub status: EntryStatus,
}

/// Summary of a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Notes whose banner value was rewritten.
    pub updated: usize,
    /// Markdown notes examined.
    pub total: usize,
    /// Notes that could not be processed.
    pub failed: usize,
    pub entries: Vec<ConversionEntry>,
}

/// Returns the canonical form of a banner value, or `None` when it should be
/// left untouched.
#[must_use]
pub fn canonical_banner_value(value: &FrontmatterValue) -> Option<String> {
    let path = extract_link_path(value)?;
    if path.is_empty()
        || path.contains("[[")
        || path.contains("]]")
        || is_suppression(&path)
        || path.starts_with("http")
    {
        return None;
    }

    let canonical = to_canonical_link(&path);
    (value.as_str() != Some(canonical.as_str())).then_some(canonical)
}

/// Converts the banner value of every markdown note in the vault.
///
/// Failures are logged and counted; processing continues with the next note.
/// Yields to the runtime every [`CHUNK_SIZE`] notes.
pub async fn convert_vault(vault: &Vault, settings: &BannerSettings) -> ConversionReport {
    convert_vault_with_progress(vault, settings, |_, _| {}).await
}

/// Like [`convert_vault`], reporting `(processed, total)` after every note.
pub async fn convert_vault_with_progress<F>(
    vault: &Vault,
    settings: &BannerSettings,
    mut on_progress: F,
) -> ConversionReport
where
    F: FnMut(usize, usize),
{
    let property = settings.frontmatter_property.as_str();
    let notes = vault.markdown_notes();
    let mut report = ConversionReport { total: notes.len(), ..ConversionReport::default() };
    tracing::info!(total = report.total, property, "converting banner values");

    for (index, note) in notes.into_iter().enumerate() {
        match convert_note(vault, &note, property) {
            Ok(Some(value)) => {
                tracing::info!(path = %note, value, "banner converted");
                report.updated += 1;
                report.entries.push(ConversionEntry { path: note, status: EntryStatus::Converted { value } });
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(path = %note, error = %err, "failed to convert banner");
                report.failed += 1;
                report.entries.push(ConversionEntry {
                    path: note,
                    status: EntryStatus::Failed { error: err.to_string() },
                });
            }
        }

        on_progress(index + 1, report.total);
        if (index + 1) % CHUNK_SIZE == 0 {
            tokio::task::yield_now().await;
        }
    }

    tracing::info!(
        updated = report.updated,
        total = report.total,
        failed = report.failed,
        "banner conversion finished"
    );
    report
}

fn convert_note(vault: &Vault, note: &NotePath, property: &str) -> Result<Option<String>, HostError> {
    let frontmatter = vault.read_frontmatter(note)?;
    let Some(value) = frontmatter.get(property).and_then(canonical_banner_value) else {
        return Ok(None);
    };

    vault.process_frontmatter(note, &mut |fm| {
        fm.insert(property, value.clone());
    })?;
    Ok(Some(value))
}
