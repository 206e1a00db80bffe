//! CLI module for Banners.
//!
//! This module provides the command-line interface for inspecting and
//! maintaining banners in a vault on disk.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::error::BannersError;

/// Runs the CLI.
///
/// Parses command-line arguments, installs logging and executes the
/// appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), BannersError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.execute()
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, or by verbosity when unset.
fn init_logging(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .from_env_lossy()
        .add_directive(crate_directive(verbosity));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn crate_directive(verbosity: u8) -> tracing_subscriber::filter::Directive {
    let level = level_from_verbosity(verbosity);
    format!("{}={}", env!("CARGO_CRATE_NAME"), level.as_str().to_ascii_lowercase())
        .parse()
        .unwrap_or_else(|_| LevelFilter::from_level(level).into())
}

const fn level_from_verbosity(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}
