//! Settings CLI commands.
//!
//! Commands for managing the banner settings file.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use super::Context;
use crate::cli::output;
use crate::config::settings_paths;
use crate::config::template::{create_settings_file, generate_settings_template};
use crate::error::BannersError;

/// Settings management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum SettingsCommands {
    /// Initialize a new settings file with all options documented.
    ///
    /// Creates a settings file with every option at its default value and a
    /// comment describing it.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  banners settings init              # Create <vault>/.banners.jsonc
  banners settings init --force      # Overwrite existing settings
  banners settings init --path ~/.config/banners/settings.jsonc
  banners settings init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing settings file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the settings file.
        /// If not specified, uses the vault-local settings file.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the settings template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the effective settings as JSON.
    Show,

    /// Show the settings file search paths.
    ///
    /// Displays where Banners looks for settings, and which file is in use.
    Path,
}

/// Execute settings subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(ctx: &Context, cmd: &SettingsCommands) -> Result<(), BannersError> {
    match cmd {
        SettingsCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_settings_template());
                Ok(())
            } else {
                init_settings(ctx, *force, path.clone())
            }
        }
        SettingsCommands::Show => {
            output::print_highlighted_json(&serde_json::to_value(ctx.settings.snapshot())?);
            Ok(())
        }
        SettingsCommands::Path => {
            show_settings_path(ctx);
            Ok(())
        }
    }
}

/// Initialize a new settings file.
fn init_settings(ctx: &Context, force: bool, custom_path: Option<PathBuf>) -> Result<(), BannersError> {
    let settings_path = custom_path
        .or_else(|| ctx.settings.path().map(PathBuf::from))
        .unwrap_or_else(|| ctx.vault.root().join(".banners.jsonc"));

    if settings_path.exists() && !force {
        return Err(BannersError::SettingsError(format!(
            "Settings file already exists at: {}\nUse --force to overwrite.",
            settings_path.display()
        )));
    }

    create_settings_file(&settings_path).map_err(|e| {
        BannersError::SettingsError(format!(
            "Failed to create settings file {}: {e}",
            settings_path.display()
        ))
    })?;

    println!("Settings file created at: {}", settings_path.display());
    println!("\nEvery option is set to its default value.");
    println!("Remove the ones you don't want to override.");

    Ok(())
}

/// Show the settings file search paths.
fn show_settings_path(ctx: &Context) {
    println!("Settings file search paths (in priority order):\n");

    let active = ctx.settings.path().filter(|path| path.exists());
    let mut paths = settings_paths(Some(ctx.vault.root()));
    if let Some(active) = active
        && !paths.iter().any(|p| p == active)
    {
        paths.insert(0, active.to_path_buf());
    }

    for (i, path) in paths.iter().enumerate() {
        let marker = if Some(path.as_path()) == active {
            " (active)".green().to_string()
        } else if path.exists() {
            " (exists)".to_string()
        } else {
            String::new()
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if active.is_none() {
        println!("\nNo settings file found.");
        println!("Run 'banners settings init' to create one.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BannerSettings, SettingsStore, load_settings_from_path};
    use crate::host::Vault;

    fn context(dir: &std::path::Path) -> Context {
        let vault = Vault::open(dir).unwrap();
        let settings = SettingsStore::load(None, Some(vault.root()));
        Context { vault, settings }
    }

    #[test]
    fn test_init_writes_vault_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let target = ctx.settings.path().unwrap().to_path_buf();
        assert!(target.starts_with(ctx.vault.root()));

        init_settings(&ctx, false, None).unwrap();
        assert_eq!(load_settings_from_path(&target).unwrap(), BannerSettings::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let target = dir.path().join("custom.jsonc");
        std::fs::write(&target, "{}").unwrap();

        let err = init_settings(&ctx, false, Some(target.clone())).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        init_settings(&ctx, true, Some(target.clone())).unwrap();
        assert!(std::fs::read_to_string(&target).unwrap().contains("frontmatterProperty"));
    }
}
