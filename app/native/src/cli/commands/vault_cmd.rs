//! Vault CLI commands: bulk conversion and banner image listing.

use std::collections::HashMap;

use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::Context;
use crate::cli::output;
use crate::config::BannerSettings;
use crate::convert::{ConversionReport, EntryStatus, convert_vault};
use crate::error::BannersError;
use crate::host::{MetadataSource, NotePath, Vault};
use crate::resolver::resolve_banner;

/// Execute the `convert` command.
///
/// # Errors
///
/// Returns an error if the async runtime cannot be created or the report
/// cannot be serialized.
pub fn execute_convert(ctx: &Context, json: bool) -> Result<(), BannersError> {
    let settings = ctx.settings.snapshot();
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let report = runtime.block_on(convert_vault(&ctx.vault, &settings));

    if json {
        output::print_highlighted_json(&serde_json::to_value(&report)?);
    } else {
        print_conversion_report(&report);
    }
    Ok(())
}

fn print_conversion_report(report: &ConversionReport) {
    for entry in &report.entries {
        match &entry.status {
            EntryStatus::Converted { value } => {
                println!("{} {} → {}", "✓".green(), entry.path, value.cyan());
            }
            EntryStatus::Failed { error } => {
                println!("{} {}: {}", "✗".red(), entry.path, error.dimmed());
            }
        }
    }

    if !report.entries.is_empty() {
        println!();
    }
    println!(
        "{}",
        format!("Converted {} of {} notes", report.updated, report.total).bold()
    );
    if report.failed > 0 {
        println!("{}", format!("{} notes could not be processed", report.failed).red());
    }
}

/// A banner image and how many notes show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUsage {
    pub path: NotePath,
    pub size: u64,
    pub notes: usize,
}

/// Lists banner images with the number of notes whose banner resolves to each.
#[must_use]
pub fn image_usage(vault: &Vault, settings: &BannerSettings) -> Vec<ImageUsage> {
    let mut counts: HashMap<NotePath, usize> = HashMap::new();
    for note in vault.markdown_notes() {
        let frontmatter = vault.frontmatter(&note);
        let resolution = resolve_banner(&note, &frontmatter, settings, vault);
        if let Some(file) = resolution.resolved().and_then(|banner| banner.file.clone()) {
            *counts.entry(file).or_default() += 1;
        }
    }

    vault
        .banner_images(settings.banner_folder())
        .into_iter()
        .map(|path| {
            let size = vault
                .absolute(path.as_str())
                .and_then(|p| std::fs::metadata(p).ok())
                .map_or(0, |m| m.len());
            let notes = counts.get(&path).copied().unwrap_or_default();
            ImageUsage { path, size, notes }
        })
        .collect()
}

/// Execute the `images` command.
///
/// # Errors
///
/// Returns an error if the listing cannot be serialized.
pub fn execute_images(ctx: &Context, json: bool) -> Result<(), BannersError> {
    #[derive(Tabled)]
    struct ImageRow {
        #[tabled(rename = "Path")]
        path: String,
        #[tabled(rename = "Size")]
        size: String,
        #[tabled(rename = "Notes")]
        notes: usize,
    }

    let settings = ctx.settings.snapshot();
    let images = image_usage(&ctx.vault, &settings);

    if json {
        output::print_highlighted_json(&serde_json::to_value(&images)?);
        return Ok(());
    }

    if images.is_empty() {
        println!("{}", "No banner images found.".dimmed());
        return Ok(());
    }

    let rows: Vec<ImageRow> = images
        .iter()
        .map(|image| ImageRow {
            path: output::truncate_path(image.path.as_str(), output::PATH_COLUMN_WIDTH),
            size: output::format_bytes(image.size),
            notes: image.notes,
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string();

    let count = images.len();
    println!("{}", format!("Banner images ({count})").bold());
    println!("{table}");
    Ok(())
}
