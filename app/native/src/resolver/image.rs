//! Image URL resolution.

use serde::Serialize;

use super::banner::{ResolvedBanner, SourceKind};
use crate::host::MetadataSource;

/// What the banner component displays: an image or an inline error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImageOutcome {
    Ok { url: String },
    Error { message: String },
}

impl ImageOutcome {
    /// Returns the URL of a successful outcome.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Ok { url } => Some(url),
            Self::Error { .. } => None,
        }
    }
}

/// Turns a resolved banner into a loadable URL.
///
/// Remote sources pass through. Vault sources use the resolved file, else a
/// direct lookup of the raw path. Anything else is an error naming the path.
#[must_use]
pub fn resolve_image_url<M: MetadataSource + ?Sized>(banner: &ResolvedBanner, host: &M) -> ImageOutcome {
    if banner.kind == SourceKind::Remote {
        return ImageOutcome::Ok { url: banner.path.clone() };
    }

    if let Some(file) = &banner.file {
        return ImageOutcome::Ok { url: host.resource_url(file.as_str()) };
    }

    if host.file_exists(&banner.path) {
        return ImageOutcome::Ok { url: host.resource_url(&banner.path) };
    }

    tracing::debug!(path = %banner.path, "banner image not found");
    ImageOutcome::Error { message: format!("Banner image not found: \"{}\"", banner.path) }
}
