//! Banners - front-matter driven banners for markdown notes.
//!
//! The library resolves which image, header and layout a note's banner uses,
//! and manages banner instances across panes, embeds and popovers as the host
//! workspace changes. The host (note store, workspace, UI) is reached through
//! the traits in [`host`] and [`render`].
//!
//! The `banners` binary wraps the same resolution in a CLI that works on a
//! vault directory.

// Core modules
pub mod config;
pub mod constants;
pub mod error;
pub mod frontmatter;
pub mod resolver;
pub mod schema;

// Host integration
pub mod host;
pub mod lifecycle;
pub mod registry;
pub mod render;

// Vault tooling
pub mod cli;
pub mod convert;

#[cfg(test)]
mod test_support;
