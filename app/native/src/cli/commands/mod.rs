//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `resolve` - Print how a note's banner resolves
//! - `vault_cmd` - Bulk conversion and banner image listing
//! - `rules` - Tag rule management
//! - `settings_cmd` - Settings file management
//! - `types` - Shared types used across commands

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::SettingsStore;
use crate::error::BannersError;
use crate::host::Vault;
use crate::schema;

pub mod resolve;
pub mod rules;
pub mod settings_cmd;
pub mod types;
pub mod vault_cmd;

pub use rules::RulesCommands;
pub use settings_cmd::SettingsCommands;
use types::CliSurface;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Banners CLI - inspect and maintain front-matter banners in a vault.
#[derive(Parser, Debug)]
#[command(name = "banners")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault directory.
    #[arg(long, global = true, env = "BANNERS_VAULT", default_value = ".", value_name = "DIR")]
    pub vault: String,

    /// Path to a custom settings file.
    ///
    /// Overrides the default settings file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, global = true, env = "BANNERS_SETTINGS", value_name = "PATH")]
    pub settings: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    ///
    /// `RUST_LOG` directives are applied as well.
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Show how a note's banner resolves.
    ///
    /// Prints the resolution, image outcome, header and display properties
    /// the banner component would receive, as JSON.
    #[command(after_long_help = r#"Examples:
  banners resolve Projects/Alpha.md
  banners resolve Projects/Alpha.md --surface popover
  banners --vault ~/notes resolve Daily/2024-01-01.md --compact"#)]
    Resolve {
        /// Vault-relative (or absolute) path of the note.
        note: String,

        /// Surface to resolve for.
        #[arg(long, value_enum, default_value_t = CliSurface::Pane)]
        surface: CliSurface,

        /// Resolve with mobile heights.
        #[arg(long)]
        mobile: bool,

        /// Print compact JSON without highlighting.
        #[arg(long)]
        compact: bool,
    },

    /// Rewrite banner values to the canonical `[[path]]` form.
    ///
    /// Plain paths and nested-list values are rewritten. Remote URLs, `false`
    /// and `none` are left alone.
    Convert {
        /// Output the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List banner images in the vault.
    ///
    /// Restricted to the `bannerFolder` setting when it is set.
    Images {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Tag rule management commands.
    #[command(subcommand)]
    Rules(RulesCommands),

    /// Settings file management commands.
    ///
    /// Initialize, view, and locate the settings file.
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Output the settings JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// settings file. Can be redirected to a file for use with editors that
    /// support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    ///
    /// Usage:
    ///   eval "$(banners completions --shell zsh)"
    ///   banners completions --shell fish > ~/.config/fish/completions/banners.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

/// Vault and settings a command operates on.
pub struct Context {
    pub vault: Vault,
    pub settings: SettingsStore,
}

impl Cli {
    /// Returns the vault directory with `~` expanded.
    #[must_use]
    pub fn vault_path(&self) -> PathBuf { expand_path(&self.vault) }

    /// Returns the custom settings path if specified via `--settings`.
    #[must_use]
    pub fn settings_path(&self) -> Option<PathBuf> { self.settings.as_deref().map(expand_path) }

    /// Opens the vault and loads its settings.
    fn context(&self) -> Result<Context, BannersError> {
        let vault = Vault::open(self.vault_path())?;
        let settings = SettingsStore::load(self.settings_path().as_deref(), Some(vault.root()));
        Ok(Context { vault, settings })
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault cannot be opened or the command fails.
    pub fn execute(&self) -> Result<(), BannersError> {
        match &self.command {
            Commands::Resolve { note, surface, mobile, compact } => {
                resolve::execute(&self.context()?, note, (*surface).into(), *mobile, *compact)
            }
            Commands::Convert { json } => vault_cmd::execute_convert(&self.context()?, *json),
            Commands::Images { json } => vault_cmd::execute_images(&self.context()?, *json),
            Commands::Rules(cmd) => rules::execute(&self.context()?, cmd),
            Commands::Settings(cmd) => settings_cmd::execute(&self.context()?, cmd),

            Commands::Schema => {
                println!("{}", schema::generate_schema_json());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "banners", &mut io::stdout());
    }
}

/// Expands `~` in a user-supplied path.
fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return PathBuf::from(".");
    }
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[cfg(test)]
mod tests {
    use super::types::RuleIndex;
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parses_schema() {
        let cli = Cli::try_parse_from(["banners", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_parses_completions_zsh() {
        let cli = Cli::try_parse_from(["banners", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_resolve_defaults() {
        let cli = Cli::try_parse_from(["banners", "resolve", "Notes/a.md"]).unwrap();
        match cli.command {
            Commands::Resolve { note, surface, mobile, compact } => {
                assert_eq!(note, "Notes/a.md");
                assert_eq!(surface, CliSurface::Pane);
                assert!(!mobile);
                assert!(!compact);
            }
            _ => panic!("Expected Resolve command"),
        }
    }

    #[test]
    fn test_cli_parses_resolve_popover() {
        let cli =
            Cli::try_parse_from(["banners", "resolve", "a.md", "--surface", "popover", "--mobile"])
                .unwrap();
        match cli.command {
            Commands::Resolve { surface, mobile, .. } => {
                assert_eq!(surface, CliSurface::Popover);
                assert!(mobile);
            }
            _ => panic!("Expected Resolve command"),
        }
    }

    #[test]
    fn test_cli_parses_convert_json() {
        let cli = Cli::try_parse_from(["banners", "convert", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Convert { json: true }));
    }

    #[test]
    fn test_cli_parses_rules_move() {
        let cli = Cli::try_parse_from(["banners", "rules", "move", "3", "1"]).unwrap();
        match cli.command {
            Commands::Rules(RulesCommands::Move { from, to }) => {
                assert_eq!(from, RuleIndex::new(3));
                assert_eq!(to, RuleIndex::new(1));
            }
            _ => panic!("Expected Rules Move command"),
        }
    }

    #[test]
    fn test_cli_rejects_zero_rule_position() {
        assert!(Cli::try_parse_from(["banners", "rules", "remove", "0"]).is_err());
    }

    #[test]
    fn test_cli_parses_settings_init() {
        let cli = Cli::try_parse_from(["banners", "settings", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Settings(SettingsCommands::Init { force, path, stdout }) => {
                assert!(force);
                assert!(path.is_none());
                assert!(!stdout);
            }
            _ => panic!("Expected Settings Init command"),
        }
    }

    // ========================================================================
    // Global flag tests
    // ========================================================================

    #[test]
    fn test_cli_parses_vault_and_settings_flags() {
        let cli = Cli::try_parse_from([
            "banners",
            "--vault",
            "/notes",
            "schema",
            "--settings",
            "/tmp/banners.jsonc",
        ])
        .unwrap();
        assert_eq!(cli.vault_path(), PathBuf::from("/notes"));
        assert_eq!(cli.settings_path(), Some(PathBuf::from("/tmp/banners.jsonc")));
    }

    #[test]
    fn test_cli_counts_verbosity() {
        let cli = Cli::try_parse_from(["banners", "-vv", "schema"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_settings_path_returns_none_when_not_specified() {
        let cli = Cli::try_parse_from(["banners", "schema"]).unwrap();
        assert!(cli.settings_path().is_none());
    }

    #[test]
    fn test_expand_path_expands_tilde() {
        let expanded = expand_path("~/notes");
        assert!(!expanded.to_string_lossy().starts_with('~') || dirs::home_dir().is_none());
        assert_eq!(expand_path("  "), PathBuf::from("."));
        assert_eq!(expand_path("/abs/path"), PathBuf::from("/abs/path"));
    }

    #[test]
    fn test_app_version_is_not_empty() {
        assert!(!APP_VERSION.is_empty());
    }
}
