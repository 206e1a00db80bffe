//! Error types for Banners.
//!
//! This module provides the top-level error type returned by CLI commands.
//! Each concern keeps its own `thiserror` enum (`SettingsError`, `HostError`,
//! `MountError`); they convert into [`BannersError`] at the command boundary.

use serde::Serialize;
use thiserror::Error;

use crate::config::SettingsError;
use crate::host::HostError;
use crate::render::MountError;

/// Errors that can occur while running a command.
///
/// Serializes as `{"kind": "...", "message": "..."}` for machine-readable output.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum BannersError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Settings could not be loaded or saved.
    #[error("Settings error: {0}")]
    SettingsError(String),
    /// The vault could not be opened, read or written.
    #[error("Vault error: {0}")]
    VaultError(String),
    /// A banner component failed to mount.
    #[error("Render error: {0}")]
    RenderError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<SettingsError> for BannersError {
    fn from(err: SettingsError) -> Self { Self::SettingsError(err.to_string()) }
}

impl From<HostError> for BannersError {
    fn from(err: HostError) -> Self { Self::VaultError(err.to_string()) }
}

impl From<MountError> for BannersError {
    fn from(err: MountError) -> Self { Self::RenderError(err.to_string()) }
}

impl From<std::io::Error> for BannersError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for BannersError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<String> for BannersError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for BannersError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}
