//! Host capability surface.
//!
//! The note-taking host owns the document model, the metadata cache and the
//! workspace. The banner engine never keeps a copy of that graph: it talks to
//! the host through the traits in this module, keyed by small opaque
//! identifiers.
//!
//! - [`MetadataSource`] - front-matter reads, link lookup, resource URLs
//! - [`FrontmatterWriter`] - atomic front-matter mutation
//! - [`Workspace`] - pane enumeration and container lookup
//!
//! [`Vault`] implements the metadata traits over a directory of markdown files.

pub mod vault;

use std::fmt;

use serde::Serialize;
use thiserror::Error;
pub use vault::Vault;

use crate::frontmatter::Frontmatter;

/// Vault-relative path of a note or file (`folder/Note.md`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NotePath(String);

impl NotePath {
    /// Creates a path, normalizing separators and stripping a leading `/`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into().replace('\\', "/");
        Self(path.trim_start_matches('/').to_string())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }

    /// File name without folder or extension.
    #[must_use]
    pub fn basename(&self) -> &str {
        let name = self.0.rsplit('/').next().unwrap_or(&self.0);
        match name.rfind('.') {
            Some(dot) if dot > 0 => &name[..dot],
            _ => name,
        }
    }

    /// Containing folder (`""` for the vault root).
    #[must_use]
    pub fn folder(&self) -> &str { self.0.rfind('/').map_or("", |slash| &self.0[..slash]) }

    /// Lower-cased file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let name = self.0.rsplit('/').next()?;
        let dot = name.rfind('.')?;
        (dot > 0).then(|| name[dot + 1..].to_lowercase())
    }
}

impl fmt::Display for NotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for NotePath {
    fn from(value: &str) -> Self { Self::new(value) }
}

/// Identifies a live workspace pane. Stable for the pane's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PaneId(pub u64);

/// Identifies one embedded or popover rendering of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocId(pub String);

impl From<&str> for DocId {
    fn from(value: &str) -> Self { Self(value.to_string()) }
}

/// Opaque reference to a host content container element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContainerId(pub u64);

/// A request to decorate an embed or popover, as delivered by the host's
/// content post-processing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRequest {
    /// Document id of this rendering.
    pub doc_id: DocId,
    /// Note being rendered.
    pub source_path: NotePath,
    /// Content container of the rendering.
    pub container: ContainerId,
    /// Whether the rendering sits inside a hover popover.
    pub in_popover: bool,
}

/// Errors reported by host collaborators.
#[derive(Debug, Error)]
pub enum HostError {
    /// A note or file could not be found.
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The existing front matter could not be parsed.
    #[error("Invalid front matter in {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    /// The host refused the write (concurrent edit, read-only vault, ...).
    #[error("Write rejected for {path}: {reason}")]
    Rejected { path: String, reason: String },
}

/// Read side of the host metadata cache.
pub trait MetadataSource {
    /// Returns the note's front matter, or an empty mapping.
    ///
    /// Must never fail: malformed metadata reads as empty.
    fn frontmatter(&self, note: &NotePath) -> Frontmatter;

    /// Resolves a link target as written inside `source` to an existing file.
    fn resolve_link(&self, link: &str, source: &NotePath) -> Option<NotePath>;

    /// Returns `true` if `path` names an existing file.
    fn file_exists(&self, path: &str) -> bool;

    /// Converts a vault path into a URL the renderer can load.
    fn resource_url(&self, path: &str) -> String;
}

/// Write side of the host metadata cache.
pub trait FrontmatterWriter {
    /// Applies `mutate` to the note's front matter and persists the result atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be read, parsed or written.
    fn process_frontmatter(
        &self,
        note: &NotePath,
        mutate: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<(), HostError>;
}

/// Workspace enumeration and layout queries.
pub trait Workspace {
    /// Currently open panes showing markdown notes.
    fn markdown_panes(&self) -> Vec<PaneId>;

    /// Note shown in a pane, or `None` if the pane is not a markdown view.
    fn pane_note(&self, pane: PaneId) -> Option<NotePath>;

    /// The active pane, if any.
    fn active_pane(&self) -> Option<PaneId>;

    /// Content container of a pane for its current view mode.
    fn pane_container(&self, pane: PaneId) -> Option<ContainerId>;

    /// Whether the host runs on a mobile device.
    fn is_mobile(&self) -> bool { false }
}

/// The full host capability surface.
pub trait Host: MetadataSource + FrontmatterWriter + Workspace {}

impl<T: MetadataSource + FrontmatterWriter + Workspace> Host for T {}
