//! Shared types for CLI commands.

use std::str::FromStr;

use crate::render::SurfaceKind;

/// A 1-based tag rule position, as shown by `rules list`.
///
/// Users count rules from 1; the settings list is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct RuleIndex(usize);

impl RuleIndex {
    /// Creates a new `RuleIndex` from a 1-based position.
    #[must_use]
    pub const fn new(index: usize) -> Self { Self(index) }

    /// Returns the 0-based index into the rule list.
    #[must_use]
    pub const fn as_zero_based(self) -> usize { self.0.saturating_sub(1) }
}

impl FromStr for RuleIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("Invalid rule position '{s}'. Expected a positive integer.")),
            Ok(index) => Ok(Self(index)),
        }
    }
}

impl std::fmt::Display for RuleIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Surface to resolve a note for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CliSurface {
    /// A workspace pane.
    #[default]
    Pane,
    /// A transcluded embed.
    Embed,
    /// A hover popover.
    Popover,
}

impl From<CliSurface> for SurfaceKind {
    fn from(surface: CliSurface) -> Self {
        match surface {
            CliSurface::Pane => Self::Pane,
            CliSurface::Embed => Self::Embed,
            CliSurface::Popover => Self::Popover,
        }
    }
}
