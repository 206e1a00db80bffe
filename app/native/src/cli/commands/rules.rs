//! Tag rule CLI commands.
//!
//! Rules are listed and addressed by 1-based position, in evaluation order.

use clap::Subcommand;
use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::Context;
use super::types::RuleIndex;
use crate::cli::output;
use crate::config::{BannerSettings, TagRule};
use crate::error::BannersError;
use crate::host::MetadataSource;

/// Tag rule management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum RulesCommands {
    /// List tag rules in evaluation order.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a tag rule.
    #[command(after_long_help = r#"Examples:
  banners rules add project banners/project.png
  banners rules add daily banners/daily.jpg --at 1   # Evaluate first"#)]
    Add {
        /// Tag to match. Also matches `/`-separated segments of nested tags.
        tag: String,

        /// Vault path of the banner image.
        path: String,

        /// Insert at this position instead of appending.
        #[arg(long, value_name = "POSITION")]
        at: Option<RuleIndex>,
    },

    /// Remove the rule at a position.
    Remove {
        /// 1-based position, as shown by `rules list`.
        position: RuleIndex,
    },

    /// Move a rule to a new position.
    Move {
        /// Current 1-based position.
        from: RuleIndex,

        /// New 1-based position.
        to: RuleIndex,
    },
}

/// Execute rule subcommands.
///
/// # Errors
///
/// Returns an error if a position is out of range or the settings cannot be saved.
pub fn execute(ctx: &Context, cmd: &RulesCommands) -> Result<(), BannersError> {
    if let RulesCommands::List { json } = cmd {
        return list_rules(ctx, *json);
    }

    let mut settings = ctx.settings.snapshot();
    let message = apply(&mut settings, cmd)?;
    ctx.settings.replace(settings);
    ctx.settings.save()?;

    println!("{message}");
    if let RulesCommands::Add { path, .. } = cmd
        && !ctx.vault.file_exists(path.trim())
    {
        println!("{} {} does not exist in the vault", "Warning:".yellow(), path.trim());
    }
    Ok(())
}

/// Applies a mutating rule command. Returns a confirmation line.
fn apply(settings: &mut BannerSettings, cmd: &RulesCommands) -> Result<String, BannersError> {
    let count = settings.tag_banners.len();
    let out_of_range =
        |index: RuleIndex| BannersError::InvalidArguments(format!("No rule at position {index} ({count} rules)"));

    match cmd {
        RulesCommands::List { .. } => Ok(String::new()),

        RulesCommands::Add { tag, path, at } => {
            let tag = tag.trim().trim_start_matches('#');
            if tag.is_empty() {
                return Err(BannersError::InvalidArguments("Tag must not be empty".to_string()));
            }
            if let Some(at) = at
                && at.as_zero_based() > count
            {
                return Err(out_of_range(*at));
            }

            settings.add_tag_rule(TagRule::new(tag, path.trim()));
            let position = at.map_or(count, |at| at.as_zero_based());
            settings.move_tag_rule(count, position);
            Ok(format!("Added rule #{} for tag '{tag}'", position + 1))
        }

        RulesCommands::Remove { position } => {
            let rule = settings
                .remove_tag_rule(position.as_zero_based())
                .ok_or_else(|| out_of_range(*position))?;
            Ok(format!("Removed rule #{position} for tag '{}'", rule.tag))
        }

        RulesCommands::Move { from, to } => {
            if !settings.move_tag_rule(from.as_zero_based(), to.as_zero_based()) {
                let bad = if from.as_zero_based() >= count { from } else { to };
                return Err(out_of_range(*bad));
            }
            Ok(format!("Moved rule #{from} to #{to}"))
        }
    }
}

fn list_rules(ctx: &Context, json: bool) -> Result<(), BannersError> {
    #[derive(Tabled)]
    struct RuleRow {
        #[tabled(rename = "#")]
        position: usize,
        #[tabled(rename = "Tag")]
        tag: String,
        #[tabled(rename = "Image")]
        path: String,
        #[tabled(rename = "Exists")]
        exists: String,
    }

    let settings = ctx.settings.snapshot();

    if json {
        output::print_highlighted_json(&serde_json::to_value(&settings.tag_banners)?);
        return Ok(());
    }

    if settings.tag_banners.is_empty() {
        println!("{}", "No tag rules configured.".dimmed());
        return Ok(());
    }

    let rows: Vec<RuleRow> = settings
        .tag_banners
        .iter()
        .enumerate()
        .map(|(index, rule)| RuleRow {
            position: index + 1,
            tag: rule.tag.clone(),
            path: output::truncate_path(&rule.path, output::PATH_COLUMN_WIDTH),
            exists: output::format_exists(ctx.vault.file_exists(rule.path.trim())),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::last()).with(Alignment::center()))
        .to_string();

    let count = settings.tag_banners.len();
    println!("{}", format!("Tag rules ({count})").bold());
    println!("{table}");
    Ok(())
}
